//! # etudiant-rs
//!
//! Administrative client for foreign-student records: students, the
//! countries they come from, their fields of study and their levels.
//!
//! This is the meta-crate that re-exports the sub-crates. Depend on
//! `etudiant-rs` to get everything, or on individual crates for finer
//! control.
//!
//! ```rust,no_run
//! use etudiant_rs::client::{CollectionApi, CollectionService, QueryCriteria};
//! use etudiant_rs::model::Country;
//!
//! # async fn example() -> etudiant_rs::core::AppResult<()> {
//! let countries = CollectionService::<Country>::over_http("http://127.0.0.1:8080");
//! let page = countries.query(&QueryCriteria::new().page(0).size(20)).await?;
//! println!("{} of {:?} countries", page.items.len(), page.total_count);
//! # Ok(())
//! # }
//! ```

/// Error taxonomy, settings and logging.
pub use etudiant_rs_core as core;

/// Records, entity kinds and identifier-keyed collections.
pub use etudiant_rs_model as model;

/// Typed CRUD services over a pluggable transport.
pub use etudiant_rs_client as client;

/// Edit forms and update controllers.
#[cfg(feature = "forms")]
pub use etudiant_rs_forms as forms;

/// Screen routes, record resolution and navigation history.
#[cfg(feature = "routing")]
pub use etudiant_rs_routing as routing;

/// The reference REST backend.
#[cfg(feature = "server")]
pub use etudiant_rs_server as server;

/// Management commands.
#[cfg(feature = "cli")]
pub use etudiant_rs_cli as cli;

/// In-process transports, live server and fixtures for tests.
#[cfg(feature = "testing")]
pub use etudiant_rs_test as test;

pub use etudiant_rs_core::{AppError, AppResult, Settings};
pub use etudiant_rs_model::{Country, Entity, EntityKind, FieldOfStudy, Id, Level, Student};

// Third-party crates used in the public API.
pub use async_trait;
pub use chrono;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
