//! The [`EditForm`] trait and the forms of the three lookup kinds.
//!
//! A form holds the editable values of one record. Values typed by a user
//! arrive as strings through [`EditForm::bind`], keyed by the record's wire
//! names (`nom`, `matricule`, `nomPays`, ...). Only keys present in the data
//! are touched; an empty string clears the field. Binding is all-or-nothing:
//! when any value fails to parse, no field changes and the returned
//! [`ValidationError`] lists every failure by field.

use std::collections::HashMap;
use std::fmt::Debug;

use chrono::NaiveDate;

use etudiant_rs_core::ValidationError;
use etudiant_rs_model::{Country, Entity, FieldOfStudy, Id, Level};

/// Raw field values keyed by wire name.
pub type FormData = HashMap<String, String>;

/// A form projection of one record type.
pub trait EditForm: Debug + Clone + Default + PartialEq + Send + Sync + 'static {
    /// The record type the form edits.
    type Record: Entity;

    /// Copies every field of `record` onto the form.
    fn patch_from(&mut self, record: &Self::Record);

    /// Builds a record from the current values.
    fn to_record(&self) -> Self::Record;

    /// Applies user-typed values.
    fn bind(&mut self, data: &FormData) -> Result<(), ValidationError>;

    /// A form showing `record`.
    fn from_record(record: &Self::Record) -> Self {
        let mut form = Self::default();
        form.patch_from(record);
        form
    }

    /// The identifier of the record being edited, if it was saved before.
    fn record_id(&self) -> Option<Id> {
        self.to_record().id()
    }
}

/// Collects per-field failures while binding.
#[derive(Debug, Default)]
pub(crate) struct BindErrors {
    errors: HashMap<String, Vec<String>>,
}

impl BindErrors {
    pub(crate) fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub(crate) fn finish(self, entity: &str) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let mut error = ValidationError::new("", "validation").with_entity(entity);
        for (field, messages) in self.errors {
            for message in messages {
                error = error.with_field_error(field.clone(), message);
            }
        }
        Err(error)
    }
}

/// `None` when the key is absent, `Some(None)` when it is blank. Other
/// values are kept as typed.
pub(crate) fn text_value(data: &FormData, key: &str) -> Option<Option<String>> {
    data.get(key)
        .map(|raw| (!raw.trim().is_empty()).then(|| raw.clone()))
}

pub(crate) fn integer_value(
    data: &FormData,
    key: &str,
    errors: &mut BindErrors,
) -> Option<Option<i64>> {
    match text_value(data, key)? {
        None => Some(None),
        Some(raw) => match raw.trim().parse() {
            Ok(n) => Some(Some(n)),
            Err(_) => {
                errors.add(key, "Enter a whole number.");
                None
            }
        },
    }
}

pub(crate) fn date_value(
    data: &FormData,
    key: &str,
    errors: &mut BindErrors,
) -> Option<Option<NaiveDate>> {
    match text_value(data, key)? {
        None => Some(None),
        Some(raw) => match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => Some(Some(date)),
            Err(_) => {
                errors.add(key, "Enter a valid date (YYYY-MM-DD).");
                None
            }
        },
    }
}

macro_rules! lookup_form {
    ($(#[$meta:meta])* $form:ident, $record:ident, $wire:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $form {
            pub id: Option<Id>,
            pub name: Option<String>,
        }

        impl EditForm for $form {
            type Record = $record;

            fn patch_from(&mut self, record: &$record) {
                self.id = record.id;
                self.name.clone_from(&record.name);
            }

            fn to_record(&self) -> $record {
                $record {
                    id: self.id,
                    name: self.name.clone(),
                }
            }

            fn bind(&mut self, data: &FormData) -> Result<(), ValidationError> {
                if let Some(name) = text_value(data, $wire) {
                    self.name = name;
                }
                Ok(())
            }
        }
    };
}

lookup_form!(
    /// Edits a [`Country`]; binds `nomPays`.
    CountryForm,
    Country,
    "nomPays"
);

lookup_form!(
    /// Edits a [`FieldOfStudy`]; binds `nomFiliere`.
    FieldOfStudyForm,
    FieldOfStudy,
    "nomFiliere"
);

lookup_form!(
    /// Edits a [`Level`]; binds `nomNiveau`.
    LevelForm,
    Level,
    "nomNiveau"
);

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_lookup_form_projection() {
        let country = Country::with_id(4).name("Senegal");
        let form = CountryForm::from_record(&country);
        assert_eq!(form.id, Some(4));
        assert_eq!(form.to_record(), country);
        assert_eq!(form.record_id(), Some(4));
    }

    #[test]
    fn test_lookup_form_bind() {
        let mut form = LevelForm::default();
        form.bind(&data(&[("nomNiveau", "  Licence 3 ")])).unwrap();
        assert_eq!(form.name.as_deref(), Some("  Licence 3 "));
        assert_eq!(form.to_record().name.as_deref(), Some("  Licence 3 "));

        form.bind(&data(&[("unrelated", "x")])).unwrap();
        assert_eq!(form.name.as_deref(), Some("  Licence 3 "));

        form.bind(&data(&[("nomNiveau", "   ")])).unwrap();
        assert!(form.name.is_none());

        form.bind(&data(&[("nomNiveau", "")])).unwrap();
        assert!(form.name.is_none());
        assert!(form.to_record().id.is_none());
    }

    #[test]
    fn test_bind_errors_collect_by_field() {
        let mut errors = BindErrors::default();
        errors.add("matricule", "bad");
        errors.add("matricule", "worse");
        let err = errors.finish("etudiant").unwrap_err();
        assert_eq!(err.field_errors["matricule"].len(), 2);
        assert_eq!(err.entity.as_deref(), Some("etudiant"));
        assert!(BindErrors::default().finish("etudiant").is_ok());
    }

    #[test]
    fn test_value_parsers() {
        let mut errors = BindErrors::default();
        let d = data(&[("n", "12"), ("bad", "1x"), ("blank", " "), ("date", "2023-04-15")]);
        assert_eq!(integer_value(&d, "n", &mut errors), Some(Some(12)));
        assert_eq!(integer_value(&d, "blank", &mut errors), Some(None));
        assert_eq!(integer_value(&d, "missing", &mut errors), None);
        assert_eq!(integer_value(&d, "bad", &mut errors), None);
        assert_eq!(
            date_value(&d, "date", &mut errors),
            Some(NaiveDate::from_ymd_opt(2023, 4, 15))
        );
        assert!(errors.finish("x").is_err());
    }
}
