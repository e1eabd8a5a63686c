//! Config file location and raw YAML loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

/// Default config file, relative to the working directory.
pub const CONFIG_FILE_NAME: &str = "moodline.yaml";

/// Env var naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "MOODLINE_CONFIG";

/// Resolve the config file path.
/// Priority: explicit path > `MOODLINE_CONFIG` env > `./moodline.yaml`
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(CONFIG_FILE_NAME),
    }
}

/// Read the config file as a JSON value tree, before any substitution.
///
/// Returns an empty object if the file doesn't exist, and for an empty file.
pub async fn load_raw(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("moodline-config-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn explicit_path_wins() {
        let path = config_file_path(Some(Path::new("/etc/moodline.yaml")));
        assert_eq!(path, PathBuf::from("/etc/moodline.yaml"));
    }

    #[tokio::test]
    async fn missing_file_is_empty_object() {
        let value = load_raw(Path::new("/definitely/not/here/moodline.yaml")).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[tokio::test]
    async fn empty_file_is_empty_object() {
        let path = temp_file("empty", "");
        assert_eq!(load_raw(&path).await.unwrap(), serde_json::json!({}));
    }

    #[tokio::test]
    async fn reads_yaml_into_value() {
        let path = temp_file("yaml", "server:\n  port: 9090\n");
        let value = load_raw(&path).await.unwrap();
        assert_eq!(value["server"]["port"], 9090);
    }

    #[tokio::test]
    async fn invalid_yaml_names_the_file() {
        let path = temp_file("bad", "server: [unclosed\n");
        let err = load_raw(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("moodline.yaml"));
    }
}
