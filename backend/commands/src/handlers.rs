/// Built-in command handlers.
///
/// Each handler is a concrete struct implementing `CommandHandler`. The store
/// operations they wrap are also exposed as free functions so callers outside
/// the chat path (CLI, HTTP API) share the same write semantics.
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use moodline_core::{Mood, StoreError, User, MOOD_SCALE};
use moodline_store::{MoodStore, UserStore};

use crate::dispatch::{CommandContext, CommandHandler, CommandResponse};
use crate::types::Command;

pub const REGISTERED_REPLY: &str = "OK";
pub const MOOD_LOGGED_REPLY: &str = "Got it! It's marked in the books!";
pub const INVALID_REPLY: &str = "err: invalid msg";
pub const STORE_FAILURE_REPLY: &str = "err: could not save, please try again later";

/// What to do with a parsed mood that falls outside [`MOOD_SCALE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalePolicy {
    /// Store it as-is (logged at warn level).
    #[default]
    Accept,
    /// Reply with an error and store nothing.
    Reject,
}

// ---------------------------------------------------------------------------
// Store operations
// ---------------------------------------------------------------------------

/// Register a subscriber. Duplicate identities fail with [`StoreError::Duplicate`].
pub async fn register_user(users: &dyn UserStore, external_user_id: &str) -> Result<User, StoreError> {
    let user = User::new(external_user_id);
    users.create_user(user.clone()).await?;
    info!(user = %external_user_id, "Registered user");
    Ok(user)
}

/// Append one mood observation.
pub async fn log_mood(
    moods: &dyn MoodStore,
    external_user_id: &str,
    value: i64,
    timestamp: DateTime<Utc>,
) -> Result<Mood, StoreError> {
    let mood = Mood::new(external_user_id, value, timestamp);
    moods.create_mood(mood.clone()).await?;
    info!(user = %external_user_id, value, "Logged mood");
    Ok(mood)
}

/// Word a store failure for the end user. Backend detail stays in the logs.
fn store_failure_reply(err: &StoreError) -> CommandResponse {
    match err {
        StoreError::Duplicate { .. } => CommandResponse::error(format!("err: {err}")),
        StoreError::Backend(detail) => {
            error!(error = %detail, "Store write failed");
            CommandResponse::error(STORE_FAILURE_REPLY)
        }
    }
}

// ---------------------------------------------------------------------------
// register
// ---------------------------------------------------------------------------

pub struct RegisterHandler {
    pub users: Arc<dyn UserStore>,
}

#[async_trait]
impl CommandHandler for RegisterHandler {
    async fn handle(&self, ctx: &CommandContext, _command: &Command) -> CommandResponse {
        match register_user(self.users.as_ref(), &ctx.sender_id).await {
            Ok(_) => CommandResponse::ok(REGISTERED_REPLY),
            Err(err) => store_failure_reply(&err),
        }
    }
}

// ---------------------------------------------------------------------------
// <n>[:label]
// ---------------------------------------------------------------------------

pub struct LogMoodHandler {
    pub moods: Arc<dyn MoodStore>,
    pub scale_policy: ScalePolicy,
}

#[async_trait]
impl CommandHandler for LogMoodHandler {
    async fn handle(&self, ctx: &CommandContext, command: &Command) -> CommandResponse {
        let Command::LogMood(value) = *command else {
            return CommandResponse::error(INVALID_REPLY);
        };

        if !MOOD_SCALE.contains(&value) {
            match self.scale_policy {
                ScalePolicy::Accept => {
                    warn!(user = %ctx.sender_id, value, "Mood outside the 0-5 scale accepted");
                }
                ScalePolicy::Reject => {
                    return CommandResponse::error(format!(
                        "err: mood must be between {} and {}",
                        MOOD_SCALE.start(),
                        MOOD_SCALE.end()
                    ));
                }
            }
        }

        match log_mood(self.moods.as_ref(), &ctx.sender_id, value, Utc::now()).await {
            Ok(_) => CommandResponse::ok(MOOD_LOGGED_REPLY),
            Err(err) => store_failure_reply(&err),
        }
    }
}
