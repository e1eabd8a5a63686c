/// LINE adapter: receives webhook events from the LINE Messaging API and
/// answers through the Reply and Push APIs.
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use reqwest::Client;
use tracing::{error, info, warn};

use moodline_core::{MessageSink, OutboundMessage, SendError};
use moodline_logging::redact_sensitive_data;

use crate::line_receive::{parse_webhook, verify_signature, SIGNATURE_HEADER};
use crate::line_send::{push_body, reply_body};
use crate::InboundHandler;

pub const DEFAULT_API_BASE: &str = "https://api.line.me";

#[derive(Debug, Clone)]
pub struct LineConfig {
    pub channel_secret: String,
    pub channel_access_token: String,
    pub webhook_path: String,
    /// Messaging API origin; overridden in tests and for proxies.
    pub api_base: String,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_secret: String::new(),
            channel_access_token: String::new(),
            webhook_path: "/callback".into(),
            api_base: DEFAULT_API_BASE.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound client
// ---------------------------------------------------------------------------

/// Reply/push client for one LINE channel.
#[derive(Clone)]
pub struct LineClient {
    channel_access_token: String,
    api_base: String,
    http: Client,
}

impl LineClient {
    pub fn new(config: &LineConfig) -> Self {
        Self {
            channel_access_token: config.channel_access_token.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<(), SendError> {
        let response = self
            .http
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.channel_access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SendError::Transport(redact_sensitive_data(&e.to_string())))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(SendError::Rejected { status: status.as_u16(), body: redact_sensitive_data(&body) })
    }
}

#[async_trait]
impl MessageSink for LineClient {
    fn name(&self) -> &str {
        "line"
    }

    async fn reply(&self, reply_token: &str, message: &OutboundMessage) -> Result<(), SendError> {
        self.post("/v2/bot/message/reply", reply_body(reply_token, message)).await
    }

    async fn push(&self, external_user_id: &str, message: &OutboundMessage) -> Result<(), SendError> {
        self.post("/v2/bot/message/push", push_body(external_user_id, message)).await
    }
}

// ---------------------------------------------------------------------------
// Webhook
// ---------------------------------------------------------------------------

pub struct LineAdapter {
    config: LineConfig,
    handler: Arc<dyn InboundHandler>,
}

#[derive(Clone)]
struct AppState {
    channel_secret: Arc<str>,
    handler: Arc<dyn InboundHandler>,
}

impl LineAdapter {
    pub fn new(config: LineConfig, handler: Arc<dyn InboundHandler>) -> Self {
        Self { config, handler }
    }

    /// Sub-router serving the webhook at the configured path.
    pub fn build_router(&self) -> Router {
        let state = AppState {
            channel_secret: Arc::from(self.config.channel_secret.as_str()),
            handler: self.handler.clone(),
        };
        info!("[LINE] Webhook ready at {}", self.config.webhook_path);
        Router::new()
            .route(&self.config.webhook_path, post(webhook_handler))
            .with_state(state)
    }
}

async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    process_webhook(&state, &headers, &body).await
}

async fn process_webhook(state: &AppState, headers: &HeaderMap, body: &[u8]) -> (StatusCode, &'static str) {
    // 1. Verify the signature over the raw body
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !verify_signature(&state.channel_secret, signature, body) {
        warn!("[LINE] Invalid signature, rejecting webhook");
        return (StatusCode::BAD_REQUEST, "invalid_signature");
    }

    // 2. Parse JSON
    let events = match parse_webhook(body) {
        Ok(events) => events,
        Err(err) => {
            error!("[LINE] Failed to parse webhook: {}", err);
            return (StatusCode::BAD_REQUEST, "bad_json");
        }
    };

    // 3. Hand the batch over; per-event failures are already contained
    if !events.is_empty() {
        let outcomes = state.handler.handle_batch(events).await;
        let failed = outcomes.iter().filter(|o| !o.succeeded || !o.is_delivered()).count();
        info!(events = outcomes.len(), failed, "[LINE] Webhook batch handled");
    }

    (StatusCode::OK, "ok")
}
