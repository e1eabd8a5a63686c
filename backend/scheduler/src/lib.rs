pub mod broadcast;
pub mod scheduler;

pub use broadcast::{feeling_check_message, BroadcastDispatcher, BroadcastReport, FEELING_CHECK_OPTIONS};
pub use scheduler::BroadcastScheduler;
