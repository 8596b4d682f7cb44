//! # etudiant-rs-forms
//!
//! Edit forms and the controllers that drive them.
//!
//! A form is a projection of one record type: [`EditForm::patch_from`] copies
//! a record onto the form and [`EditForm::to_record`] builds the record back.
//! [`UpdateController`] owns a form, saves it through a collection service
//! and publishes its [`FormState`]. [`StudentUpdateController`] adds the
//! reference options for a student's level, field of study and country.
//!
//! ## Modules
//!
//! - [`form`] - The [`EditForm`] trait and the lookup-kind forms
//! - [`student_form`] - [`StudentForm`]
//! - [`controller`] - [`UpdateController`] and [`FormState`]
//! - [`student_controller`] - [`StudentUpdateController`] and [`track_by_id`]

pub mod controller;
pub mod form;
pub mod student_controller;
pub mod student_form;

pub use controller::{FormState, UpdateController};
pub use form::{CountryForm, EditForm, FieldOfStudyForm, FormData, LevelForm};
pub use student_controller::{track_by_id, StudentUpdateController};
pub use student_form::StudentForm;
