pub mod error;
pub mod event;
pub mod message;
pub mod traits;
pub mod types;

pub use error::{MoodError, SendError, StoreError};
pub use event::{EventOutcome, InboundEvent, ReplyStatus};
pub use message::OutboundMessage;
pub use traits::MessageSink;
pub use types::{DailySummary, Mood, User, MOOD_SCALE};
