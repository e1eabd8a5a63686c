use async_trait::async_trait;
use moodline_core::{EventOutcome, InboundEvent};

pub mod line;
pub mod line_receive;
pub mod line_send;

pub use line::{LineAdapter, LineClient, LineConfig};

/// Receives the authenticated, parsed events of one webhook delivery.
///
/// Implementations must contain per-event failures: the returned outcomes
/// carry them instead of an error for the whole batch.
#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn handle_batch(&self, events: Vec<InboundEvent>) -> Vec<EventOutcome>;
}
