//! Logging integration.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-call spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter comes from `settings.log_level`. In debug mode a pretty,
/// human-readable format is used; otherwise structured JSON.
/// Installing twice is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one REST call.
///
/// # Examples
///
/// ```
/// use etudiant_rs_core::logging::request_span;
///
/// let span = request_span("GET", "/api/pays");
/// let _guard = span.enter();
/// tracing::debug!("fetching countries");
/// ```
pub fn request_span(method: &str, path: &str) -> tracing::Span {
    tracing::debug_span!("rest_call", method = method, path = path)
}
