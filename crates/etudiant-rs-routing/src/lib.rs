//! # etudiant-rs-routing
//!
//! Maps screen paths such as `/etudiant/12/edit` to a [`Route`], resolves
//! the record a screen works on, and keeps the back stack that form
//! controllers return through once a save succeeds.
//!
//! ## Modules
//!
//! - [`route`] - [`Route`] and [`Screen`] parsing and rendering
//! - [`resolver`] - [`RecordResolver`], blank or fetched records per screen
//! - [`navigation`] - the [`Navigator`] trait and the [`History`] back stack

pub mod navigation;
pub mod resolver;
pub mod route;

pub use navigation::{History, Navigator};
pub use resolver::RecordResolver;
pub use route::{Route, Screen};
