//! LINE Webhook Receiver
//!
//! Signature validation and webhook deserialization. Only text messages with
//! both a reply token and a sender user id become [`InboundEvent`]s; follows,
//! postbacks, stickers and the like are dropped here.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

use moodline_core::InboundEvent;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Debug, Deserialize)]
pub struct LineWebhook {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<LineEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub message: Option<LineMessage>,
    pub source: Option<LineSource>,
    pub reply_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LineMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSource {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub user_id: Option<String>,
}

/// Validates the `x-line-signature` header: base64 of HMAC-SHA256(secret, body).
pub fn verify_signature(secret: &str, signature: &str, body: &[u8]) -> bool {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Computes the signature LINE would send for `body`.
pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Parses a webhook body into the text events the bot acts on, in delivery order.
pub fn parse_webhook(body: &[u8]) -> Result<Vec<InboundEvent>, serde_json::Error> {
    let webhook: LineWebhook = serde_json::from_slice(body)?;
    Ok(inbound_events(webhook))
}

pub fn inbound_events(webhook: LineWebhook) -> Vec<InboundEvent> {
    webhook
        .events
        .into_iter()
        .filter_map(|ev| {
            if ev.event_type != "message" {
                debug!(event_type = %ev.event_type, "[LINE] Ignoring non-message event");
                return None;
            }
            let message = ev.message?;
            if message.kind != "text" {
                debug!(kind = %message.kind, "[LINE] Ignoring non-text message");
                return None;
            }
            let user_id = ev.source.and_then(|s| s.user_id);
            let (Some(reply_token), Some(user_id)) = (ev.reply_token, user_id) else {
                debug!("[LINE] Text message without reply token or user id");
                return None;
            };
            Some(InboundEvent::new(reply_token, user_id, message.text.unwrap_or_default()))
        })
        .collect()
}
