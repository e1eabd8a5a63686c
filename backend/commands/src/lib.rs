pub mod detection;
pub mod dispatch;
pub mod handlers;
pub mod router;
pub mod types;

pub use detection::interpret;
pub use dispatch::{CommandContext, CommandDispatcher, CommandHandler, CommandResponse};
pub use handlers::{log_mood, register_user, LogMoodHandler, RegisterHandler, ScalePolicy};
pub use router::EventRouter;
pub use types::{Command, CommandKind};

use std::sync::Arc;

use moodline_store::{MoodStore, UserStore};

/// Build a dispatcher pre-wired with the register and mood-logging handlers.
pub fn build_default_dispatcher(
    users: Arc<dyn UserStore>,
    moods: Arc<dyn MoodStore>,
    scale_policy: ScalePolicy,
) -> CommandDispatcher {
    let mut dispatcher = CommandDispatcher::new();
    dispatcher.register(CommandKind::Register, Arc::new(RegisterHandler { users }));
    dispatcher.register(
        CommandKind::LogMood,
        Arc::new(LogMoodHandler { moods, scale_policy }),
    );
    dispatcher
}
