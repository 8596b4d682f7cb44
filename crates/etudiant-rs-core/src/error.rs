//! Core error types for etudiant-rs.
//!
//! [`AppError`] covers the three failure families a caller of the REST
//! collections can observe (transport, validation, not-found) plus the
//! configuration, serialization and IO errors raised by the ambient stack.
//! Errors coming back from the backend are mapped into this taxonomy with
//! [`AppError::from_status`].

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A validation failure reported by the backend or raised locally.
///
/// `error_key` is the short machine-readable reason the REST resources send
/// alongside a 400 (`idexists`, `idnull`, `idinvalid`, `idnotfound`).
///
/// # Examples
///
/// ```
/// use etudiant_rs_core::error::ValidationError;
///
/// let err = ValidationError::new("A new etudiant cannot already have an ID", "idexists")
///     .with_entity("etudiant");
/// assert_eq!(err.error_key, "idexists");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The primary error message.
    pub message: String,
    /// Short code identifying the failure.
    pub error_key: String,
    /// The entity name the failure concerns, if known.
    pub entity: Option<String>,
    /// Per-field validation errors, keyed by field name.
    pub field_errors: HashMap<String, Vec<String>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and key.
    pub fn new(message: impl Into<String>, error_key: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_key: error_key.into(),
            entity: None,
            field_errors: HashMap::new(),
        }
    }

    /// Sets the entity name.
    #[must_use]
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Adds an error message for a single field.
    #[must_use]
    pub fn with_field_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            write!(f, "{}", self.message)?;
        } else if !self.field_errors.is_empty() {
            let mut first = true;
            for (field, errors) in &self.field_errors {
                for error in errors {
                    if !first {
                        write!(f, "; ")?;
                    }
                    write!(f, "{field}: {error}")?;
                    first = false;
                }
            }
        }
        if !self.error_key.is_empty() {
            write!(f, " ({})", self.error_key)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for etudiant-rs.
#[derive(Error, Debug)]
pub enum AppError {
    // ── Backend responses ────────────────────────────────────────────

    /// HTTP 400 without a structured validation body.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 401, raised when the session wrapper rejects the call.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// HTTP 404, usually a stale identifier.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 409.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other non-success status.
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    /// The backend rejected the record.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    // ── Client side ──────────────────────────────────────────────────

    /// The request never produced a response (connection refused, DNS, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A body could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A URL or route did not match anything known.
    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `BadRequest`, `Validation`, `InvalidRoute` -> 400
    /// - `Unauthorized` -> 401
    /// - `NotFound` -> 404
    /// - `Conflict` -> 409
    /// - `Transport` -> 502
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Validation(_) | Self::InvalidRoute(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Transport(_) => 502,
            Self::InternalServerError(_)
            | Self::Serialization(_)
            | Self::ConfigurationError(_)
            | Self::Io(_) => 500,
        }
    }

    /// Maps a non-success backend response into the error taxonomy.
    ///
    /// A 400 whose body carries an `errorKey` (or `error_key`) becomes
    /// [`AppError::Validation`]; other statuses map onto the matching variant.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            400 => parse_validation_body(body).map_or_else(
                || Self::BadRequest(body.to_string()),
                Self::Validation,
            ),
            401 | 403 => Self::Unauthorized(body.to_string()),
            404 => Self::NotFound(body.to_string()),
            409 => Self::Conflict(body.to_string()),
            _ => Self::InternalServerError(format!("HTTP {status}: {body}")),
        }
    }

    /// Returns `true` for failures that never reached the backend.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` when the backend rejected the payload.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::BadRequest(_))
    }

    /// Returns `true` for stale identifiers.
    ///
    /// The REST resources answer an update of a missing record with a 400
    /// keyed `idnotfound`, so that case counts as not-found too.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Validation(v) => v.error_key == "idnotfound",
            _ => false,
        }
    }
}

fn parse_validation_body(body: &str) -> Option<ValidationError> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let key = value
        .get("errorKey")
        .or_else(|| value.get("error_key"))?
        .as_str()?;
    let message = value
        .get("title")
        .or_else(|| value.get("message"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    let mut err = ValidationError::new(message, key);
    if let Some(entity) = value.get("entityName").and_then(serde_json::Value::as_str) {
        err = err.with_entity(entity);
    }
    Some(err)
}

/// A convenience type alias for `Result<T, AppError>`.
pub type AppResult<T> = Result<T, AppError>;
