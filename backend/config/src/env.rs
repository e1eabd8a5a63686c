//! Environment handling for config values.
//!
//! `${VAR_NAME}` in any string value is replaced at load time; only uppercase
//! `[A-Z_][A-Z0-9_]*` names are matched and `$${VAR}` escapes to a literal
//! `${VAR}`. After defaults are applied, the well-known deployment variables
//! override their config fields.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::schema::{LineConfig, MoodlineConfig, ServerConfig, StorageConfig};

/// One optional leading `$` marks an escaped reference.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\$\{([A-Z_][A-Z0-9_]*)\}").expect("static env var pattern"));

pub const ENV_CHANNEL_SECRET: &str = "LINE_CHANNEL_SECRET";
pub const ENV_CHANNEL_TOKEN: &str = "LINE_CHANNEL_TOKEN";
pub const ENV_PORT: &str = "PORT";
pub const ENV_DB_PATH: &str = "MOODLINE_DB";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references in a config value tree.
///
/// Only string leaves are processed. A referenced variable that is unset or
/// empty is an error naming the config path.
pub fn resolve_env_vars(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[1];
        if caps[0].starts_with("$$") {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply `LINE_CHANNEL_SECRET`, `LINE_CHANNEL_TOKEN`, `PORT` and `MOODLINE_DB`.
pub fn apply_env_overrides(mut config: MoodlineConfig, env: &HashMap<String, String>) -> Result<MoodlineConfig> {
    let get = |name: &str| env.get(name).map(String::as_str).filter(|v| !v.is_empty());

    if let Some(secret) = get(ENV_CHANNEL_SECRET) {
        debug!(var = ENV_CHANNEL_SECRET, "Overriding line.channelSecret from env");
        config.line.get_or_insert_with(LineConfig::default).channel_secret = Some(secret.to_string());
    }
    if let Some(token) = get(ENV_CHANNEL_TOKEN) {
        debug!(var = ENV_CHANNEL_TOKEN, "Overriding line.channelToken from env");
        config.line.get_or_insert_with(LineConfig::default).channel_token = Some(token.to_string());
    }
    if let Some(port) = get(ENV_PORT) {
        let port: u16 = port
            .trim()
            .parse()
            .with_context(|| format!("{ENV_PORT} must be a TCP port number, got '{port}'"))?;
        debug!(port, "Overriding server.port from env");
        config.server.get_or_insert_with(ServerConfig::default).port = Some(port);
    }
    if let Some(db) = get(ENV_DB_PATH) {
        debug!(path = db, "Overriding storage.path from env");
        config.storage.get_or_insert_with(StorageConfig::default).path = Some(db.to_string());
    }
    Ok(config)
}
