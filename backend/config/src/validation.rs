//! Config validation: field-path errors and warnings in one pass.

use std::str::FromStr;

use thiserror::Error;

use crate::schema::{MoodlineConfig, StorageBackend};

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &MoodlineConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_line(config, &mut report);
    validate_storage(config, &mut report);
    validate_broadcast(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_server(config: &MoodlineConfig, report: &mut ValidationReport) {
    let Some(server) = &config.server else { return };
    if let Some(port) = server.port {
        if port == 0 {
            report.error("server.port", "Port must be between 1 and 65535");
        } else if port < 1024 && port != 80 && port != 443 {
            report.warn(
                "server.port",
                format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
            );
        }
    }
    if let Some(path) = &server.webhook_path {
        if !path.starts_with('/') {
            report.error("server.webhookPath", format!("Webhook path '{path}' must start with '/'"));
        }
    }
}

/// Missing credentials only matter to `serve` and `check`, so they are warnings here.
fn validate_line(config: &MoodlineConfig, report: &mut ValidationReport) {
    if config.channel_secret().is_empty() {
        report.warn("line.channelSecret", "LINE channel secret is not set; every webhook will be rejected");
    }
    if config.channel_token().is_empty() {
        report.warn("line.channelToken", "LINE channel token is not set; replies and pushes will fail");
    }
    let api_base = config.api_base();
    if !(api_base.starts_with("https://") || api_base.starts_with("http://")) {
        report.error("line.apiBase", format!("'{api_base}' is not an http(s) URL"));
    }
}

fn validate_storage(config: &MoodlineConfig, report: &mut ValidationReport) {
    match config.storage_backend() {
        StorageBackend::Sqlite => {
            if config.storage_path().trim().is_empty() {
                report.error("storage.path", "SQLite storage needs a database path");
            }
        }
        StorageBackend::Memory => {
            report.warn("storage.backend", "In-memory storage loses every record on restart");
        }
    }
}

fn validate_broadcast(config: &MoodlineConfig, report: &mut ValidationReport) {
    let Some(broadcast) = &config.broadcast else { return };
    match broadcast.schedule.as_deref().map(str::trim) {
        Some(expr) if !expr.is_empty() => {
            if let Err(e) = cron::Schedule::from_str(expr) {
                report.error(
                    "broadcast.schedule",
                    format!("Invalid cron expression '{expr}': {e}. Use six fields: sec min hour dom mon dow"),
                );
            }
        }
        _ => {
            if broadcast.enabled == Some(true) {
                report.warn("broadcast.schedule", "Broadcast is enabled but has no schedule");
            }
        }
    }
}

fn validate_logging(config: &MoodlineConfig, report: &mut ValidationReport) {
    let level = config.log_level();
    if !matches!(
        level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    ) {
        report.warn(
            "logging.level",
            format!("Unknown log level '{level}'; it will be read as a tracing filter directive"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{BroadcastConfig, LineConfig, ServerConfig};

    fn configured() -> MoodlineConfig {
        apply_all_defaults(MoodlineConfig {
            line: Some(LineConfig {
                channel_secret: Some("secret".into()),
                channel_token: Some("token".into()),
                api_base: None,
            }),
            ..Default::default()
        })
    }

    #[test]
    fn configured_defaults_are_clean() {
        let report = validate(&configured());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    }

    #[test]
    fn missing_credentials_only_warn() {
        let report = validate(&apply_all_defaults(MoodlineConfig::default()));
        assert!(report.is_valid());
        let paths: Vec<&str> = report.warnings.iter().map(|w| w.path.as_str()).collect();
        assert!(paths.contains(&"line.channelSecret"));
        assert!(paths.contains(&"line.channelToken"));
    }

    #[test]
    fn invalid_cron_is_error() {
        let mut cfg = configured();
        cfg.broadcast = Some(BroadcastConfig { schedule: Some("every day at noon".into()), enabled: Some(true) });
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "broadcast.schedule");
    }

    #[test]
    fn six_field_cron_is_accepted() {
        let mut cfg = configured();
        cfg.broadcast = Some(BroadcastConfig { schedule: Some("0 30 20 * * *".into()), enabled: Some(true) });
        assert!(validate(&cfg).is_valid());
    }

    #[test]
    fn webhook_path_needs_leading_slash() {
        let mut cfg = configured();
        cfg.server = Some(ServerConfig { webhook_path: Some("callback".into()), ..Default::default() });
        let report = validate(&cfg);
        assert_eq!(report.errors[0].path, "server.webhookPath");
    }

    #[test]
    fn port_zero_is_error() {
        let mut cfg = configured();
        cfg.server = Some(ServerConfig { port: Some(0), ..Default::default() });
        assert!(!validate(&cfg).is_valid());
    }
}
