//! Record types and the [`Entity`] trait they share.
//!
//! Field names on the wire follow the REST resources (`nom`, `prenom`,
//! `nomPays`, ...). Unset fields are omitted when serializing, so a record
//! without an identifier produces a body without `id`, and a partial update
//! only carries the fields that were set.

use std::fmt::Debug;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::kind::EntityKind;

/// Identifier assigned by the backing store.
pub type Id = i64;

/// Behaviour shared by every record type.
pub trait Entity:
    Debug + Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The kind this record type belongs to.
    const KIND: EntityKind;

    /// The identifier, absent for records that were never saved.
    fn id(&self) -> Option<Id>;

    /// Replaces the identifier.
    fn set_id(&mut self, id: Option<Id>);

    /// Returns `true` once the backend has assigned an identifier.
    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }

    /// Identity comparison: both identifiers set and equal.
    fn same_identity(&self, other: &Self) -> bool {
        matches!((self.id(), other.id()), (Some(a), Some(b)) if a == b)
    }
}

macro_rules! lookup_entity {
    ($(#[$meta:meta])* $name:ident, $kind:expr, $wire:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            /// Identifier assigned by the backend.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub id: Option<Id>,
            /// Display name.
            #[serde(rename = $wire, default, skip_serializing_if = "Option::is_none")]
            pub name: Option<String>,
        }

        impl $name {
            /// An empty shell, pending its first save.
            pub fn new() -> Self {
                Self::default()
            }

            /// A reference to an existing record, carrying only its identifier.
            pub fn with_id(id: Id) -> Self {
                Self { id: Some(id), name: None }
            }

            /// Sets the display name.
            #[must_use]
            pub fn name(mut self, name: impl Into<String>) -> Self {
                self.name = Some(name.into());
                self
            }
        }

        impl Entity for $name {
            const KIND: EntityKind = $kind;

            fn id(&self) -> Option<Id> {
                self.id
            }

            fn set_id(&mut self, id: Option<Id>) {
                self.id = id;
            }
        }
    };
}

lookup_entity!(
    /// A country of origin (`pays`).
    Country,
    EntityKind::Country,
    "nomPays"
);

lookup_entity!(
    /// A field of study (`filiere`).
    FieldOfStudy,
    EntityKind::FieldOfStudy,
    "nomFiliere"
);

lookup_entity!(
    /// A study level (`niveau`).
    Level,
    EntityKind::Level,
    "nomNiveau"
);

/// A registered student (`etudiant`).
///
/// The three references are weak: they point at records owned by their own
/// collections and compare by identifier.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use etudiant_rs_model::{Country, Entity, Student};
///
/// let student = Student::new()
///     .last_name("open-source ADP RAM")
///     .first_name("Generic")
///     .registration_number(83638)
///     .enrollment_date(NaiveDate::from_ymd_opt(2023, 4, 15).unwrap())
///     .country(Country::with_id(3));
/// assert!(!student.is_persisted());
/// assert_eq!(student.country_id(), Some(3));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(rename = "nom", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "prenom", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "matricule", default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<i64>,
    #[serde(rename = "date", default, skip_serializing_if = "Option::is_none")]
    pub enrollment_date: Option<NaiveDate>,
    #[serde(rename = "nomNiveau", default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(rename = "nomFiliere", default, skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<FieldOfStudy>,
    #[serde(rename = "nomPays", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Country>,
}

impl Student {
    /// An empty shell, pending its first save.
    pub fn new() -> Self {
        Self::default()
    }

    /// A reference to an existing student, carrying only its identifier.
    pub fn with_id(id: Id) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = Some(value.into());
        self
    }

    #[must_use]
    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = Some(value.into());
        self
    }

    #[must_use]
    pub const fn registration_number(mut self, value: i64) -> Self {
        self.registration_number = Some(value);
        self
    }

    #[must_use]
    pub const fn enrollment_date(mut self, value: NaiveDate) -> Self {
        self.enrollment_date = Some(value);
        self
    }

    #[must_use]
    pub fn level(mut self, value: Level) -> Self {
        self.level = Some(value);
        self
    }

    #[must_use]
    pub fn field_of_study(mut self, value: FieldOfStudy) -> Self {
        self.field_of_study = Some(value);
        self
    }

    #[must_use]
    pub fn country(mut self, value: Country) -> Self {
        self.country = Some(value);
        self
    }

    pub fn level_id(&self) -> Option<Id> {
        self.level.as_ref().and_then(|l| l.id)
    }

    pub fn field_of_study_id(&self) -> Option<Id> {
        self.field_of_study.as_ref().and_then(|f| f.id)
    }

    pub fn country_id(&self) -> Option<Id> {
        self.country.as_ref().and_then(|c| c.id)
    }
}

impl Entity for Student {
    const KIND: EntityKind = EntityKind::Student;

    fn id(&self) -> Option<Id> {
        self.id
    }

    fn set_id(&mut self, id: Option<Id>) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_blank_student_serializes_to_empty_object() {
        let body = serde_json::to_value(Student::new()).unwrap();
        assert_eq!(body, json!({}));
    }

    #[test]
    fn test_student_wire_names() {
        let student = Student::new()
            .last_name("open-source ADP RAM")
            .first_name("Generic")
            .registration_number(83638)
            .enrollment_date(NaiveDate::from_ymd_opt(2023, 4, 15).unwrap());
        let body = serde_json::to_value(&student).unwrap();
        assert_eq!(
            body,
            json!({
                "nom": "open-source ADP RAM",
                "prenom": "Generic",
                "matricule": 83638,
                "date": "2023-04-15"
            })
        );
    }

    #[test]
    fn test_student_decodes_nested_references_and_nulls() {
        let body = json!({
            "id": 456,
            "nom": null,
            "nomNiveau": {"id": 39467, "nomNiveau": "Master"},
            "nomFiliere": null,
            "nomPays": {"id": 55474}
        });
        let student: Student = serde_json::from_value(body).unwrap();
        assert_eq!(student.id, Some(456));
        assert!(student.last_name.is_none());
        assert_eq!(student.level_id(), Some(39467));
        assert_eq!(student.level.as_ref().unwrap().name.as_deref(), Some("Master"));
        assert!(student.field_of_study.is_none());
        assert_eq!(student.country_id(), Some(55474));
    }

    #[test]
    fn test_lookup_entity_wire_names() {
        let country = Country::with_id(1).name("Madagascar");
        assert_eq!(
            serde_json::to_value(&country).unwrap(),
            json!({"id": 1, "nomPays": "Madagascar"})
        );
        let field: FieldOfStudy = serde_json::from_value(json!({"id": 2, "nomFiliere": "Informatique"})).unwrap();
        assert_eq!(field.name.as_deref(), Some("Informatique"));
        let level: Level = serde_json::from_value(json!({"id": 3})).unwrap();
        assert!(level.name.is_none());
    }

    #[test]
    fn test_identity() {
        let a = Country::with_id(7).name("A");
        let b = Country::with_id(7).name("B");
        assert!(a.same_identity(&b));
        assert!(!Country::new().same_identity(&Country::new()));
        assert!(a.is_persisted());
        assert_eq!(Country::KIND, EntityKind::Country);
    }

    #[test]
    fn test_set_id() {
        let mut student = Student::new();
        student.set_id(Some(9));
        assert_eq!(Entity::id(&student), Some(9));
    }
}
