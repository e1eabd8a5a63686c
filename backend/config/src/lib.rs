//! `moodline-config`: runtime configuration management.
//!
//! Provides:
//! - Typed config schema (server, LINE channel, storage, broadcast, logging)
//! - YAML loading with `${ENV_VAR}` substitution
//! - Default value application and deployment env overrides
//! - Config redaction for safe logging
//! - Validation with field paths

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use schema::{MoodlineConfig, StorageBackend};
pub use io::{config_file_path, load_raw, CONFIG_FILE_NAME, CONFIG_PATH_ENV};
pub use env::{apply_env_overrides, resolve_env_vars, MissingEnvVarError};
pub use redact::redact;
pub use defaults::apply_all_defaults;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Load, substitute env vars, apply defaults and env overrides, then validate.
///
/// This is the main entry point for loading a config at runtime. Warnings are
/// logged; any validation error fails the load.
pub async fn load_and_prepare(path: &Path) -> Result<MoodlineConfig> {
    load_and_prepare_with(path, &env::process_env()).await
}

/// [`load_and_prepare`] against an explicit environment (useful for testing).
pub async fn load_and_prepare_with(path: &Path, env: &HashMap<String, String>) -> Result<MoodlineConfig> {
    let raw = load_raw(path).await?;

    let value = resolve_env_vars(&raw, env).context("Failed to resolve env vars in config")?;

    let config: MoodlineConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid config structure in {}", path.display()))?;

    let config = apply_all_defaults(config);
    let config = apply_env_overrides(config, env)?;

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if !report.is_valid() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        let summary: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!("{} config error(s):\n{}", summary.len(), summary.join("\n"));
    }

    if let Ok(snapshot) = serde_json::to_value(&config) {
        tracing::debug!(config = %redact(&snapshot), "Effective config");
    }
    Ok(config)
}
