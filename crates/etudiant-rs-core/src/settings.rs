//! Settings for etudiant-rs.
//!
//! [`Settings`] holds everything the client, the reference backend and the
//! CLI need. There is no global instance: settings are loaded once by the
//! binary (see [`settings_loader`](crate::settings_loader)) and passed down.

use serde::{Deserialize, Serialize};

/// Bind address of the reference backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// The host to bind to.
    pub host: String,
    /// The port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    /// Returns `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The complete set of settings.
///
/// # Examples
///
/// ```
/// use etudiant_rs_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.page_size, 20);
/// assert_eq!(settings.api_url("pays"), "http://127.0.0.1:8080/api/pays");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// Application name, used in the backend's alert headers.
    pub application_name: String,

    // ── Client ───────────────────────────────────────────────────────

    /// Base URL of the REST backend, without trailing slash.
    pub api_base_url: String,
    /// Path prefix of every collection resource.
    pub api_prefix: String,
    /// Default number of items requested per page.
    pub page_size: usize,
    /// Bearer token handed to the session wrapper, if any.
    pub auth_token: Option<String>,

    // ── Reference backend ────────────────────────────────────────────

    /// Bind address for `runserver`.
    pub server: ServerSettings,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            application_name: "etudiantetranger".to_string(),
            api_base_url: "http://127.0.0.1:8080".to_string(),
            api_prefix: "/api".to_string(),
            page_size: 20,
            auth_token: None,
            server: ServerSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Returns the absolute URL of a collection resource.
    pub fn api_url(&self, resource: &str) -> String {
        format!(
            "{}{}/{}",
            self.api_base_url.trim_end_matches('/'),
            self.api_prefix.trim_end_matches('/'),
            resource
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.debug);
        assert_eq!(settings.application_name, "etudiantetranger");
        assert_eq!(settings.api_prefix, "/api");
        assert!(settings.auth_token.is_none());
        assert_eq!(settings.server.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_api_url_trims_slashes() {
        let settings = Settings {
            api_base_url: "http://example.com/".to_string(),
            api_prefix: "/api/".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.api_url("etudiants"), "http://example.com/api/etudiants");
    }

    #[test]
    fn test_serde_roundtrip_keeps_server() {
        let settings = Settings::default();
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["server"]["port"], 8080);
    }
}
