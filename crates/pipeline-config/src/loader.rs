//! Layered YAML configuration loading (§6): later files in the list win,
//! then known environment variables overlay the broker/bucket sections —
//! the same two-phase merge the original config loader performs.

use crate::error::ConfigError;
use serde_yaml::{Mapping, Value};
use std::env;
use std::path::Path;
use tracing::{info, warn};

/// Recursively merge `overlay` into `base`. Where both sides hold a
/// mapping at the same key, merge recursively; otherwise the overlay wins.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, overlay_value) in overlay_map {
                let merged_value = match merged.get(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Mapping(merged)
        }
        (_, overlay) => overlay.clone(),
    }
}

/// Load and merge a list of YAML files, in priority order (last wins),
/// then apply environment-variable overrides for broker/bucket settings.
/// Missing files are skipped with a warning, not an error — config layers
/// are allowed to be partial.
pub fn load_env(paths: &[impl AsRef<Path>]) -> Result<Value, ConfigError> {
    let mut merged = Value::Mapping(Mapping::new());

    if paths.is_empty() {
        warn!("no configuration files provided");
    }

    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "configuration file not found, skipping");
            continue;
        }

        let contents = std::fs::read_to_string(path)?;
        let parsed: Value =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::ParseError {
                path: path.display().to_string(),
                source,
            })?;

        match parsed {
            Value::Null => info!(path = %path.display(), "configuration file is empty, skipping"),
            Value::Mapping(_) => {
                info!(path = %path.display(), "merging configuration layer");
                merged = deep_merge(&merged, &parsed);
            }
            _ => return Err(ConfigError::NotAMapping(path.display().to_string())),
        }
    }

    apply_env_overlay(&mut merged);
    Ok(merged)
}

/// Overlay `RABBITMQ_*`/`MINIO_*` process environment variables onto the
/// `broker`/`bucket` sections, exactly as the deployment's container
/// environment expects to be able to override them.
fn apply_env_overlay(config: &mut Value) {
    let Value::Mapping(root) = config else { return };

    let broker = section_mut(root, "broker");
    overlay_string(broker, "host", env::var("RABBITMQ_HOST").ok());
    overlay_string(broker, "username", env::var("RABBITMQ_DEFAULT_USER").ok());
    overlay_string(broker, "password", env::var("RABBITMQ_DEFAULT_PASS").ok());

    let bucket = section_mut(root, "bucket");
    if let Ok(host) = env::var("MINIO_HOST") {
        overlay_string(bucket, "endpoint", Some(format!("{host}:9000")));
    }
    overlay_string(bucket, "username", env::var("MINIO_ROOT_USER").ok());
    overlay_string(bucket, "password", env::var("MINIO_ROOT_PASSWORD").ok());
}

fn section_mut<'a>(root: &'a mut Mapping, name: &str) -> &'a mut Mapping {
    let key = Value::String(name.to_string());
    if !matches!(root.get(&key), Some(Value::Mapping(_))) {
        root.insert(key.clone(), Value::Mapping(Mapping::new()));
    }
    match root.get_mut(&key) {
        Some(Value::Mapping(map)) => map,
        _ => unreachable!("just inserted a mapping"),
    }
}

fn overlay_string(section: &mut Mapping, key: &str, value: Option<String>) {
    if let Some(value) = value {
        info!(section = ?section.len(), key, "overriding config value from environment");
        section.insert(Value::String(key.to_string()), Value::String(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_yaml(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn later_files_override_earlier_ones() {
        let base = write_yaml("broker:\n  host: localhost\n  port: 5672\n");
        let overlay = write_yaml("broker:\n  host: rabbitmq\n");

        let merged = load_env(&[base.path(), overlay.path()]).unwrap();
        let broker = merged.get("broker").unwrap();
        assert_eq!(broker.get("host").unwrap().as_str(), Some("rabbitmq"));
        assert_eq!(broker.get("port").unwrap().as_i64(), Some(5672));
    }

    #[test]
    fn missing_file_is_skipped_not_an_error() {
        let merged = load_env(&["/nonexistent/path/root.yml"]).unwrap();
        assert!(merged.as_mapping().unwrap().is_empty() || merged.get("broker").is_some());
    }

    #[test]
    fn env_override_wins_over_file_value() {
        std::env::set_var("RABBITMQ_HOST", "env-rabbitmq");
        let base = write_yaml("broker:\n  host: localhost\n");

        let merged = load_env(&[base.path()]).unwrap();
        assert_eq!(
            merged.get("broker").unwrap().get("host").unwrap().as_str(),
            Some("env-rabbitmq")
        );
        std::env::remove_var("RABBITMQ_HOST");
    }

    #[test]
    fn deep_merge_preserves_sibling_keys() {
        let base: Value = serde_yaml::from_str("a:\n  x: 1\n  y: 2\n").unwrap();
        let overlay: Value = serde_yaml::from_str("a:\n  y: 3\n  z: 4\n").unwrap();
        let merged = deep_merge(&base, &overlay);
        let a = merged.get("a").unwrap();
        assert_eq!(a.get("x").unwrap().as_i64(), Some(1));
        assert_eq!(a.get("y").unwrap().as_i64(), Some(3));
        assert_eq!(a.get("z").unwrap().as_i64(), Some(4));
    }
}
