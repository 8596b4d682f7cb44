//! # etudiant-rs-core
//!
//! Core types shared by every etudiant-rs crate.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and result alias
//! - [`settings`] - Client, backend and logging settings
//! - [`settings_loader`] - TOML/JSON/environment loading
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

pub use error::{AppError, AppResult, ValidationError};
pub use settings::{ServerSettings, Settings};
