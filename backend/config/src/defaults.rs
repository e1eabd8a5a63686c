//! Config defaults: applies default values to parsed config.

use crate::schema::{
    LineConfig, LoggingConfig, MoodConfig, MoodlineConfig, ServerConfig, StorageBackend,
    StorageConfig, SummaryConfig,
};

pub const DEFAULT_BIND: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_WEBHOOK_PATH: &str = "/callback";

pub const DEFAULT_API_BASE: &str = "https://api.line.me";

pub const DEFAULT_DB_PATH: &str = "data/moodline.db";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: MoodlineConfig) -> MoodlineConfig {
    let config = apply_server_defaults(config);
    let config = apply_line_defaults(config);
    let config = apply_storage_defaults(config);
    let config = apply_behaviour_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: MoodlineConfig) -> MoodlineConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    server.webhook_path.get_or_insert_with(|| DEFAULT_WEBHOOK_PATH.to_string());
    config
}

fn apply_line_defaults(mut config: MoodlineConfig) -> MoodlineConfig {
    let line = config.line.get_or_insert_with(LineConfig::default);
    line.api_base.get_or_insert_with(|| DEFAULT_API_BASE.to_string());
    config
}

/// SQLite at the default path unless told otherwise.
fn apply_storage_defaults(mut config: MoodlineConfig) -> MoodlineConfig {
    let storage = config.storage.get_or_insert_with(StorageConfig::default);
    let backend = *storage.backend.get_or_insert(StorageBackend::Sqlite);
    if backend == StorageBackend::Sqlite {
        storage.path.get_or_insert_with(|| DEFAULT_DB_PATH.to_string());
    }
    config
}

fn apply_behaviour_defaults(mut config: MoodlineConfig) -> MoodlineConfig {
    let summary = config.summary.get_or_insert_with(SummaryConfig::default);
    summary.order.get_or_insert_with(Default::default);

    let mood = config.mood.get_or_insert_with(MoodConfig::default);
    mood.reject_out_of_range.get_or_insert(false);

    // A schedule without an explicit flag is on.
    if let Some(broadcast) = &mut config.broadcast {
        if broadcast.schedule.is_some() && broadcast.enabled.is_none() {
            broadcast.enabled = Some(true);
        }
    }
    config
}

fn apply_logging_defaults(mut config: MoodlineConfig) -> MoodlineConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.json.get_or_insert(false);
    config
}

#[cfg(test)]
mod tests {
    use moodline_insights::BucketOrder;

    use super::*;
    use crate::schema::BroadcastConfig;

    #[test]
    fn fills_every_section() {
        let cfg = apply_all_defaults(MoodlineConfig::default());
        let server = cfg.server.as_ref().unwrap();
        assert_eq!(server.port, Some(DEFAULT_PORT));
        assert_eq!(server.webhook_path.as_deref(), Some("/callback"));
        assert_eq!(cfg.storage.as_ref().unwrap().path.as_deref(), Some(DEFAULT_DB_PATH));
        assert_eq!(cfg.summary.as_ref().unwrap().order, Some(BucketOrder::Chronological));
        assert_eq!(cfg.logging.as_ref().unwrap().level.as_deref(), Some("info"));
        assert!(cfg.broadcast.is_none());
    }

    #[test]
    fn does_not_override_user_values() {
        let cfg = MoodlineConfig {
            server: Some(ServerConfig { port: Some(3000), ..Default::default() }),
            storage: Some(StorageConfig { backend: Some(StorageBackend::Memory), path: None }),
            ..Default::default()
        };
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.port(), 3000);
        assert!(cfg.storage.as_ref().unwrap().path.is_none());
    }

    #[test]
    fn schedule_implies_enabled() {
        let cfg = MoodlineConfig {
            broadcast: Some(BroadcastConfig { schedule: Some("0 0 9 * * *".into()), enabled: None }),
            ..Default::default()
        };
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.broadcast.as_ref().unwrap().enabled, Some(true));
    }
}
