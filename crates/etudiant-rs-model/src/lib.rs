//! # etudiant-rs-model
//!
//! Record model for the admin client: the four entity kinds, their wire
//! representation, and the identifier-keyed collections used to feed
//! selection widgets.
//!
//! ## Modules
//!
//! - [`kind`] - [`EntityKind`] and its route/resource names
//! - [`entity`] - [`Student`], [`Country`], [`FieldOfStudy`], [`Level`] and the [`Entity`] trait
//! - [`collection`] - [`IdentifiedSet`] and [`add_to_collection_if_missing`]

pub mod collection;
pub mod entity;
pub mod kind;

pub use collection::{add_to_collection_if_missing, IdentifiedSet};
pub use entity::{Country, Entity, FieldOfStudy, Id, Level, Student};
pub use kind::EntityKind;
