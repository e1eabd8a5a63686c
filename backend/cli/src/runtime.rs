//! Wiring from a loaded config to a running `MoodService`.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use moodline_channels::{LineClient, LineConfig};
use moodline_commands::ScalePolicy;
use moodline_config::{MoodlineConfig, StorageBackend};
use moodline_core::MessageSink;
use moodline_gateway::{MoodService, ServiceOptions};
use moodline_logging::LogOptions;
use moodline_store::{InMemoryStore, MoodStore, SqliteStore, UserStore};

pub fn log_options(config: &MoodlineConfig) -> LogOptions {
    LogOptions {
        level: config.log_level().to_string(),
        dir: config.log_dir().map(Into::into),
        json_console: config.log_json(),
    }
}

pub fn line_config(config: &MoodlineConfig) -> LineConfig {
    LineConfig {
        channel_secret: config.channel_secret().to_string(),
        channel_access_token: config.channel_token().to_string(),
        webhook_path: config.webhook_path().to_string(),
        api_base: config.api_base().to_string(),
    }
}

pub fn service_options(config: &MoodlineConfig) -> ServiceOptions {
    ServiceOptions {
        scale_policy: if config.reject_out_of_range() { ScalePolicy::Reject } else { ScalePolicy::Accept },
        summary_order: config.summary_order(),
    }
}

/// Swap whatever storage is configured for a throwaway in-memory store.
pub fn use_memory_store(config: &mut MoodlineConfig) {
    let storage = config.storage.get_or_insert_with(Default::default);
    storage.backend = Some(StorageBackend::Memory);
}

pub fn open_stores(config: &MoodlineConfig) -> Result<(Arc<dyn UserStore>, Arc<dyn MoodStore>)> {
    match config.storage_backend() {
        StorageBackend::Sqlite => {
            let path = config.storage_path();
            let store = Arc::new(
                SqliteStore::open(path).with_context(|| format!("Failed to open SQLite store at {path}"))?,
            );
            info!(path, "Using SQLite store");
            Ok((store.clone(), store))
        }
        StorageBackend::Memory => {
            let store = Arc::new(InMemoryStore::new());
            info!("Using in-memory store");
            Ok((store.clone(), store))
        }
    }
}

pub fn build_service(config: &MoodlineConfig) -> Result<MoodService> {
    let (users, moods) = open_stores(config)?;
    let sink: Arc<dyn MessageSink> = Arc::new(LineClient::new(&line_config(config)));
    Ok(MoodService::new(users, moods, sink, service_options(config)))
}

#[cfg(test)]
mod tests {
    use moodline_config::schema::{MoodConfig, StorageConfig};

    use super::*;

    fn memory_config() -> MoodlineConfig {
        MoodlineConfig {
            storage: Some(StorageConfig { backend: Some(StorageBackend::Memory), path: None }),
            mood: Some(MoodConfig { reject_out_of_range: Some(true) }),
            ..Default::default()
        }
    }

    #[test]
    fn maps_mood_policy() {
        assert_eq!(service_options(&memory_config()).scale_policy, ScalePolicy::Reject);
        assert_eq!(service_options(&MoodlineConfig::default()).scale_policy, ScalePolicy::Accept);
    }

    #[test]
    fn ephemeral_overrides_sqlite() {
        let mut config = MoodlineConfig {
            storage: Some(StorageConfig { backend: Some(StorageBackend::Sqlite), path: Some("x.db".into()) }),
            ..Default::default()
        };
        use_memory_store(&mut config);
        assert_eq!(config.storage_backend(), StorageBackend::Memory);

        let mut empty = MoodlineConfig::default();
        use_memory_store(&mut empty);
        assert_eq!(empty.storage_backend(), StorageBackend::Memory);
    }

    #[test]
    fn line_config_uses_defaults() {
        let line = line_config(&MoodlineConfig::default());
        assert_eq!(line.webhook_path, "/callback");
        assert_eq!(line.api_base, "https://api.line.me");
    }

    #[tokio::test]
    async fn memory_backend_service_round_trip() {
        let service = build_service(&memory_config()).unwrap();
        service.register_user("U1").await.unwrap();
        assert!(service.register_user("U1").await.unwrap_err().is_duplicate());
        assert!(service.compute_daily_summaries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sqlite_backend_opens_file() {
        let dir = std::env::temp_dir().join(format!("moodline-cli-{}", std::process::id()));
        let config = MoodlineConfig {
            storage: Some(StorageConfig {
                backend: Some(StorageBackend::Sqlite),
                path: Some(dir.join("m.db").to_string_lossy().into_owned()),
            }),
            ..Default::default()
        };
        let service = build_service(&config).unwrap();
        service.register_user("U1").await.unwrap();
        assert!(dir.join("m.db").exists());

        drop(service);
        let _ = std::fs::remove_dir_all(dir);
    }
}
