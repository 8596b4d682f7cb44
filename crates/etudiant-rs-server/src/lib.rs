//! # etudiant-rs-server
//!
//! A reference REST backend for the admin client: every kind's collection
//! resource over an in-memory store, with the paging headers, alert headers
//! and rejection bodies the client expects.
//!
//! ## Modules
//!
//! - [`store`] - [`RecordStore`] and [`InMemoryStore`]
//! - [`alerts`] - Alert and paging response headers
//! - [`site`] - [`ApiSite`], the axum router over a store
//! - [`serve`] - Binding and serving until shutdown

pub mod alerts;
pub mod serve;
pub mod site;
pub mod store;

pub use serve::{bind, run, serve_until};
pub use site::ApiSite;
pub use store::{InMemoryStore, ListParams, ListResult, RecordStore};
