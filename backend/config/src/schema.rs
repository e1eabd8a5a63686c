//! Moodline runtime configuration schema.
//!
//! Every section and leaf is optional on disk; [`crate::defaults`] fills the
//! gaps and the accessors on [`MoodlineConfig`] fall back to the same values.

use serde::{Deserialize, Serialize};

use moodline_insights::BucketOrder;

use crate::defaults::{
    DEFAULT_API_BASE, DEFAULT_BIND, DEFAULT_DB_PATH, DEFAULT_LOG_LEVEL, DEFAULT_PORT,
    DEFAULT_WEBHOOK_PATH,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodlineConfig {
    /// HTTP listener
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// LINE Messaging API channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<LineConfig>,

    /// User and mood record storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,

    /// Scheduled feeling-check broadcast
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<BroadcastConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<MoodConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    /// Process-local; everything is lost on exit.
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<StorageBackend>,
    /// SQLite database file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastConfig {
    /// Six-field cron expression evaluated in UTC, e.g. `0 0 12 * * *`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<BucketOrder>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodConfig {
    /// Reply with an error instead of storing values outside 0..=5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_out_of_range: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for daily-rolling JSON log files; console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Console output as JSON lines instead of human-readable text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

// ---------------------------------------------------------------------------
// Resolved accessors
// ---------------------------------------------------------------------------

impl MoodlineConfig {
    pub fn bind(&self) -> &str {
        self.server.as_ref().and_then(|s| s.bind.as_deref()).unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.server.as_ref().and_then(|s| s.port).unwrap_or(DEFAULT_PORT)
    }

    pub fn webhook_path(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.webhook_path.as_deref())
            .unwrap_or(DEFAULT_WEBHOOK_PATH)
    }

    pub fn channel_secret(&self) -> &str {
        self.line.as_ref().and_then(|l| l.channel_secret.as_deref()).unwrap_or_default()
    }

    pub fn channel_token(&self) -> &str {
        self.line.as_ref().and_then(|l| l.channel_token.as_deref()).unwrap_or_default()
    }

    pub fn api_base(&self) -> &str {
        self.line.as_ref().and_then(|l| l.api_base.as_deref()).unwrap_or(DEFAULT_API_BASE)
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.as_ref().and_then(|s| s.backend).unwrap_or_default()
    }

    pub fn storage_path(&self) -> &str {
        self.storage.as_ref().and_then(|s| s.path.as_deref()).unwrap_or(DEFAULT_DB_PATH)
    }

    /// The cron expression, only when the broadcast is enabled.
    pub fn broadcast_schedule(&self) -> Option<&str> {
        let broadcast = self.broadcast.as_ref()?;
        if broadcast.enabled == Some(false) {
            return None;
        }
        broadcast.schedule.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn summary_order(&self) -> BucketOrder {
        self.summary.as_ref().and_then(|s| s.order).unwrap_or_default()
    }

    pub fn reject_out_of_range(&self) -> bool {
        self.mood.as_ref().and_then(|m| m.reject_out_of_range).unwrap_or(false)
    }

    pub fn log_level(&self) -> &str {
        self.logging.as_ref().and_then(|l| l.level.as_deref()).unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}
