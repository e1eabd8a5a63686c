/// Chat command types.
use serde::{Deserialize, Serialize};

/// Classification of one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum Command {
    /// Subscribe the sender to broadcast prompts.
    Register,
    /// Record a mood observation. The value is not range-checked here.
    LogMood(i64),
    /// Anything that is neither of the above.
    Invalid,
}

/// Handler registry key: the commands that carry work to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Register,
    LogMood,
}

impl Command {
    /// `None` for [`Command::Invalid`], which never reaches a handler.
    pub fn kind(&self) -> Option<CommandKind> {
        match self {
            Command::Register => Some(CommandKind::Register),
            Command::LogMood(_) => Some(CommandKind::LogMood),
            Command::Invalid => None,
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandKind::Register => f.write_str("register"),
            CommandKind::LogMood => f.write_str("log_mood"),
        }
    }
}
