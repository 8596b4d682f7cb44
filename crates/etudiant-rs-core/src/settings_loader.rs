//! Settings loading from configuration files and the environment.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (deep-merged over the defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `ETUDIANT_DEBUG` | `debug` |
//! | `ETUDIANT_LOG_LEVEL` | `log_level` |
//! | `ETUDIANT_APPLICATION_NAME` | `application_name` |
//! | `ETUDIANT_API_BASE_URL` | `api_base_url` |
//! | `ETUDIANT_API_PREFIX` | `api_prefix` |
//! | `ETUDIANT_PAGE_SIZE` | `page_size` |
//! | `ETUDIANT_AUTH_TOKEN` | `auth_token` |
//! | `ETUDIANT_SERVER_HOST` | `server.host` |
//! | `ETUDIANT_SERVER_PORT` | `server.port` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use etudiant_rs_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("etudiant.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::AppError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any field not present in the TOML keeps its default value.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, AppError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| AppError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, AppError> {
    let content = read_file(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, AppError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, AppError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| AppError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, AppError> {
    let content = read_file(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, AppError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `ETUDIANT_*` environment variable overrides to a settings struct.
///
/// Unparseable numeric values are ignored.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides_from(settings, |key| std::env::var(key).ok());
}

fn apply_overrides_from(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("ETUDIANT_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Some(val) = lookup("ETUDIANT_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Some(val) = lookup("ETUDIANT_APPLICATION_NAME") {
        settings.application_name = val;
    }

    if let Some(val) = lookup("ETUDIANT_API_BASE_URL") {
        settings.api_base_url = val;
    }

    if let Some(val) = lookup("ETUDIANT_API_PREFIX") {
        settings.api_prefix = val;
    }

    if let Some(val) = lookup("ETUDIANT_PAGE_SIZE") {
        if let Ok(size) = val.parse::<usize>() {
            settings.page_size = size;
        }
    }

    if let Some(val) = lookup("ETUDIANT_AUTH_TOKEN") {
        settings.auth_token = if val.is_empty() { None } else { Some(val) };
    }

    if let Some(val) = lookup("ETUDIANT_SERVER_HOST") {
        settings.server.host = val;
    }

    if let Some(val) = lookup("ETUDIANT_SERVER_PORT") {
        if let Ok(port) = val.parse::<u16>() {
            settings.server.port = port;
        }
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_file(path: &Path, format: &str) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|e| {
        AppError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, AppError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        AppError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        AppError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            api_base_url = "https://etudiants.example.com"
            page_size = 50
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.api_base_url, "https://etudiants.example.com");
        assert_eq!(settings.page_size, 50);
        // Defaults preserved
        assert_eq!(settings.api_prefix, "/api");
    }

    #[test]
    fn test_from_toml_str_nested_server_keeps_other_defaults() {
        let toml = r"
            [server]
            port = 9000
        ";

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        assert!(from_toml_str("[[invalid toml content").is_err());
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "auth_token": "abc",
            "log_level": "debug"
        }"#;

        let settings = from_json_str(json).unwrap();
        assert_eq!(settings.auth_token.as_deref(), Some("abc"));
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.page_size, 20);
    }

    #[test]
    fn test_from_json_str_wrong_type() {
        let result = from_json_str(r#"{"page_size": "many"}"#);
        assert!(matches!(result, Err(AppError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let result = from_toml_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(AppError::ConfigurationError(_))));
    }

    // ── Environment overrides ───────────────────────────────────────

    #[test]
    fn test_overrides_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("ETUDIANT_DEBUG", "no"),
            ("ETUDIANT_API_BASE_URL", "http://backend:8080"),
            ("ETUDIANT_PAGE_SIZE", "5"),
            ("ETUDIANT_SERVER_PORT", "not-a-port"),
            ("ETUDIANT_AUTH_TOKEN", "token-1"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        apply_overrides_from(&mut settings, |k| env.get(k).map(|v| (*v).to_string()));

        assert!(!settings.debug);
        assert_eq!(settings.api_base_url, "http://backend:8080");
        assert_eq!(settings.page_size, 5);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.auth_token.as_deref(), Some("token-1"));
    }

    #[test]
    fn test_empty_token_clears() {
        let mut settings = Settings {
            auth_token: Some("old".into()),
            ..Settings::default()
        };
        apply_overrides_from(&mut settings, |k| {
            (k == "ETUDIANT_AUTH_TOKEN").then(String::new)
        });
        assert!(settings.auth_token.is_none());
    }

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"a": 1, "nested": {"b": 2, "c": 3}});
        let over = serde_json::json!({"nested": {"b": 20}});
        let merged = merge_json(base, over);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["nested"]["b"], 20);
        assert_eq!(merged["nested"]["c"], 3);
    }
}
