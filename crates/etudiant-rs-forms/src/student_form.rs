//! The student edit form.

use chrono::NaiveDate;

use etudiant_rs_core::ValidationError;
use etudiant_rs_model::{Country, EntityKind, FieldOfStudy, Id, Level, Student};

use crate::form::{date_value, integer_value, text_value, BindErrors, EditForm, FormData};

/// Editable values of a [`Student`].
///
/// The three references are chosen from the controller's option lists rather
/// than typed, so [`EditForm::bind`] only covers `nom`, `prenom`,
/// `matricule` and `date`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub id: Option<Id>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub registration_number: Option<i64>,
    pub enrollment_date: Option<NaiveDate>,
    pub level: Option<Level>,
    pub field_of_study: Option<FieldOfStudy>,
    pub country: Option<Country>,
}

impl EditForm for StudentForm {
    type Record = Student;

    fn patch_from(&mut self, record: &Student) {
        self.id = record.id;
        self.last_name.clone_from(&record.last_name);
        self.first_name.clone_from(&record.first_name);
        self.registration_number = record.registration_number;
        self.enrollment_date = record.enrollment_date;
        self.level.clone_from(&record.level);
        self.field_of_study.clone_from(&record.field_of_study);
        self.country.clone_from(&record.country);
    }

    fn to_record(&self) -> Student {
        Student {
            id: self.id,
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
            registration_number: self.registration_number,
            enrollment_date: self.enrollment_date,
            level: self.level.clone(),
            field_of_study: self.field_of_study.clone(),
            country: self.country.clone(),
        }
    }

    fn bind(&mut self, data: &FormData) -> Result<(), ValidationError> {
        let mut errors = BindErrors::default();
        let last_name = text_value(data, "nom");
        let first_name = text_value(data, "prenom");
        let registration_number = integer_value(data, "matricule", &mut errors);
        let enrollment_date = date_value(data, "date", &mut errors);
        errors.finish(EntityKind::Student.entity_name())?;

        if let Some(v) = last_name {
            self.last_name = v;
        }
        if let Some(v) = first_name {
            self.first_name = v;
        }
        if let Some(v) = registration_number {
            self.registration_number = v;
        }
        if let Some(v) = enrollment_date {
            self.enrollment_date = v;
        }
        Ok(())
    }
}

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
    fn test_patch_then_build_keeps_every_field() {
        let student = Student::with_id(123)
            .last_name("Rasoa")
            .first_name("Hery")
            .registration_number(55)
            .enrollment_date(NaiveDate::from_ymd_opt(2022, 9, 1).unwrap())
            .level(Level::with_id(1))
            .field_of_study(FieldOfStudy::with_id(2))
            .country(Country::with_id(3));

        let form = StudentForm::from_record(&student);

        assert_eq!(form.to_record(), student);
        assert_eq!(form.record_id(), Some(123));
    }

    #[test]
    fn test_patch_replaces_previous_values() {
        let mut form = StudentForm::from_record(&Student::with_id(1).last_name("Old"));
        form.patch_from(&Student::new());
        assert_eq!(form, StudentForm::default());
    }

    #[test]
    fn test_bind_typed_values() {
        let mut form = StudentForm::default();
        form.bind(&data(&[
            ("nom", "open-source ADP RAM"),
            ("prenom", "Generic"),
            ("matricule", "83638"),
            ("date", "2023-04-15"),
        ]))
        .unwrap();

        let record = form.to_record();
        assert_eq!(record.last_name.as_deref(), Some("open-source ADP RAM"));
        assert_eq!(record.first_name.as_deref(), Some("Generic"));
        assert_eq!(record.registration_number, Some(83638));
        assert_eq!(record.enrollment_date, NaiveDate::from_ymd_opt(2023, 4, 15));
        assert!(record.id.is_none());
    }

    #[test]
    fn test_bind_failure_changes_nothing() {
        let mut form = StudentForm::from_record(&Student::new().last_name("Kept"));
        let err = form
            .bind(&data(&[
                ("nom", "Changed"),
                ("matricule", "12ab"),
                ("date", "15/04/2023"),
            ]))
            .unwrap_err();

        assert!(err.field_errors.contains_key("matricule"));
        assert!(err.field_errors.contains_key("date"));
        assert_eq!(form.last_name.as_deref(), Some("Kept"));
    }
}
