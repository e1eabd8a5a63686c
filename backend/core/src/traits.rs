use async_trait::async_trait;

use crate::error::SendError;
use crate::message::OutboundMessage;

/// Outbound side of the messaging platform.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Sink name for logging (e.g. "line").
    fn name(&self) -> &str;

    /// Answer a specific inbound message using its reply handle.
    async fn reply(&self, reply_token: &str, message: &OutboundMessage) -> Result<(), SendError>;

    /// Send an unsolicited message to a user by external identifier.
    async fn push(&self, external_user_id: &str, message: &OutboundMessage)
        -> Result<(), SendError>;
}
