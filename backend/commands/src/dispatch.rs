/// Command dispatch: route classified commands to handler objects.
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::handlers::INVALID_REPLY;
use crate::types::{Command, CommandKind};

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// Context passed to every command handler.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub sender_id: String,
}

/// What a handler wants said back to the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub text: String,
    /// `false` when the command could not be carried out.
    pub succeeded: bool,
}

impl CommandResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into(), succeeded: true }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), succeeded: false }
    }
}

/// Handlers never fail outward: every error is already worded for the user.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &CommandContext, command: &Command) -> CommandResponse;
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct CommandDispatcher {
    handlers: HashMap<CommandKind, Arc<dyn CommandHandler>>,
}

impl CommandDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: CommandKind, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(kind, handler);
    }

    pub async fn dispatch(&self, ctx: &CommandContext, command: &Command) -> CommandResponse {
        let Some(kind) = command.kind() else {
            debug!(sender = %ctx.sender_id, "Message could not be interpreted");
            return CommandResponse::error(INVALID_REPLY);
        };

        match self.handlers.get(&kind) {
            Some(handler) => {
                debug!(sender = %ctx.sender_id, command = %kind, "Dispatching command");
                handler.handle(ctx, command).await
            }
            None => {
                warn!(command = %kind, "No handler registered");
                CommandResponse::error(format!("err: no handler for {kind}"))
            }
        }
    }
}
