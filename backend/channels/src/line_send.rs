//! LINE Senders
//!
//! Request bodies for the Reply and Push APIs, with optional quick-reply chips
//! along the bottom of the chat viewport.

use serde_json::{json, Value};

use moodline_core::OutboundMessage;

/// LINE rejects action labels longer than this.
pub const QUICK_REPLY_LABEL_MAX: usize = 20;
/// LINE accepts at most this many quick-reply items per message.
pub const QUICK_REPLY_ITEMS_MAX: usize = 13;

/// A single text message object, with quick replies when the message has any.
pub fn message_object(message: &OutboundMessage) -> Value {
    let mut object = json!({ "type": "text", "text": message.text });
    if !message.quick_replies.is_empty() {
        let items: Vec<Value> = message
            .quick_replies
            .iter()
            .take(QUICK_REPLY_ITEMS_MAX)
            .map(|option| {
                json!({
                    "type": "action",
                    "action": {
                        "type": "message",
                        "label": truncate_label(option),
                        "text": option,
                    }
                })
            })
            .collect();
        object["quickReply"] = json!({ "items": items });
    }
    object
}

pub fn reply_body(reply_token: &str, message: &OutboundMessage) -> Value {
    json!({
        "replyToken": reply_token,
        "messages": [message_object(message)],
    })
}

pub fn push_body(to: &str, message: &OutboundMessage) -> Value {
    json!({
        "to": to,
        "messages": [message_object(message)],
    })
}

fn truncate_label(option: &str) -> String {
    option.chars().take(QUICK_REPLY_LABEL_MAX).collect()
}
