//! The `check` management command.
//!
//! Validates the loaded settings before anything talks to the backend.

use async_trait::async_trait;
use url::Url;

use etudiant_rs_core::{AppError, Settings};

use crate::command::ManagementCommand;

/// Runs configuration checks.
pub struct CheckCommand;

/// The result of a single check.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    pub level: CheckLevel,
    pub msg: String,
    pub hint: Option<String>,
    /// A stable identifier such as `client.E001`.
    pub id: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckLevel {
    Warning,
    Error,
}

impl std::fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

fn issue(level: CheckLevel, id: &'static str, msg: impl Into<String>, hint: &str) -> CheckMessage {
    CheckMessage {
        level,
        msg: msg.into(),
        hint: Some(hint.to_string()),
        id,
    }
}

/// Runs every check against `settings`.
pub fn run_checks(settings: &Settings) -> Vec<CheckMessage> {
    let mut messages = Vec::new();

    match Url::parse(&settings.api_base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            if url.path() != "/" {
                messages.push(issue(
                    CheckLevel::Warning,
                    "client.W001",
                    format!("api_base_url has a path ({})", url.path()),
                    "Put path segments in api_prefix instead",
                ));
            }
        }
        Ok(url) => messages.push(issue(
            CheckLevel::Error,
            "client.E002",
            format!("api_base_url uses unsupported scheme '{}'", url.scheme()),
            "Use an http:// or https:// URL",
        )),
        Err(err) => messages.push(issue(
            CheckLevel::Error,
            "client.E001",
            format!("api_base_url is not a valid URL: {err}"),
            "Set ETUDIANT_API_BASE_URL to e.g. http://127.0.0.1:8080",
        )),
    }

    if !settings.api_prefix.starts_with('/') {
        messages.push(issue(
            CheckLevel::Error,
            "client.E003",
            format!("api_prefix '{}' does not start with '/'", settings.api_prefix),
            "Use an absolute path such as /api",
        ));
    }

    if settings.page_size == 0 {
        messages.push(issue(
            CheckLevel::Error,
            "client.E004",
            "page_size is 0",
            "Use a positive page size",
        ));
    }

    if settings.application_name.is_empty()
        || !settings
            .application_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        messages.push(issue(
            CheckLevel::Error,
            "server.E001",
            format!("application_name '{}' cannot be used in a header name", settings.application_name),
            "Use ASCII letters, digits, '-' or '_'",
        ));
    }

    if !settings.debug && settings.auth_token.is_none() {
        messages.push(issue(
            CheckLevel::Warning,
            "client.W002",
            "No auth_token with debug disabled",
            "Set ETUDIANT_AUTH_TOKEN if the backend requires authentication",
        ));
    }

    messages
}

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Check the configuration for problems"
    }

    async fn handle(&self, _matches: &clap::ArgMatches, settings: &Settings) -> Result<(), AppError> {
        let messages = run_checks(settings);

        if messages.is_empty() {
            tracing::info!("System check identified no issues");
            return Ok(());
        }

        for msg in &messages {
            let hint_text = msg
                .hint
                .as_ref()
                .map_or(String::new(), |h| format!("\n\tHINT: {h}"));
            tracing::warn!("{} ({}): {}{}", msg.level, msg.id, msg.msg, hint_text);
        }

        let errors = messages.iter().filter(|m| m.level == CheckLevel::Error).count();
        tracing::info!(
            "System check identified {} issue(s) ({} error(s))",
            messages.len(),
            errors
        );

        if errors > 0 {
            return Err(AppError::ConfigurationError(format!(
                "System check found {errors} error(s)"
            )));
        }

        Ok(())
    }
}
