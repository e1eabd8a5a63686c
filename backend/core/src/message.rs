use serde::{Deserialize, Serialize};

/// A text message bound for a chat, optionally offering quick-reply buttons.
///
/// Each quick reply is sent back verbatim as the user's message when tapped,
/// so the labels double as the text the interpreter will see.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quick_replies: Vec<String>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    pub fn with_quick_replies<I, S>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.quick_replies = replies.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_skips_quick_replies_in_json() {
        let json = serde_json::to_value(OutboundMessage::text("hi")).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "hi" }));
    }

    #[test]
    fn builder_collects_replies() {
        let msg = OutboundMessage::text("pick").with_quick_replies(["a", "b"]);
        assert_eq!(msg.quick_replies, vec!["a".to_string(), "b".to_string()]);
    }
}
