use serde::{Deserialize, Serialize};

/// An authenticated inbound text message handed over by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Handle used to answer this particular message.
    pub reply_token: String,
    /// External identifier of the sender.
    pub source_user_id: String,
    pub text: String,
}

impl InboundEvent {
    pub fn new(
        reply_token: impl Into<String>,
        source_user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            reply_token: reply_token.into(),
            source_user_id: source_user_id.into(),
            text: text.into(),
        }
    }
}

/// Whether the reply for an event reached the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ReplyStatus {
    Sent,
    Failed(String),
}

/// Result of handling one inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub reply_token: String,
    pub source_user_id: String,
    /// Text that was (or was attempted to be) sent back.
    pub reply: String,
    /// `false` when the command itself failed: invalid text or a rejected write.
    pub succeeded: bool,
    pub delivery: ReplyStatus,
}

impl EventOutcome {
    pub fn is_delivered(&self) -> bool {
        self.delivery == ReplyStatus::Sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_status_serializes_tagged() {
        let json = serde_json::to_value(ReplyStatus::Failed("timeout".into())).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["detail"], "timeout");
    }
}
