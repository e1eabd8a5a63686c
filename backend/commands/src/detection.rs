/// Command detection: classify the raw text of an inbound chat message.
use crate::types::Command;

/// Literal token that subscribes the sender to broadcasts.
pub const REGISTER_TOKEN: &str = "register";

/// Classify a message. Total: every input maps to exactly one [`Command`].
///
/// `"register"` (exact, case-sensitive) registers. Otherwise the text before the
/// first `:` (or the whole text when there is none) must be a base-10 integer,
/// optionally signed, that fits in an `i64`. Whatever follows the `:` is ignored,
/// which lets quick-reply labels like `"3: good,alright"` log a 3.
pub fn interpret(text: &str) -> Command {
    if text == REGISTER_TOKEN {
        return Command::Register;
    }

    let prefix = text.split_once(':').map_or(text, |(head, _)| head);
    match prefix.parse::<i64>() {
        Ok(value) => Command::LogMood(value),
        Err(_) => Command::Invalid,
    }
}
