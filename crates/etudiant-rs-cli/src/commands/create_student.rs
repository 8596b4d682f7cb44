//! The `create-student` management command.
//!
//! Drives the same [`StudentUpdateController`] as the edit screen: the
//! reference options are loaded, the typed values are bound through the
//! student form, the references are picked and the form is saved.

use std::sync::Arc;

use async_trait::async_trait;

use etudiant_rs_client::CollectionApi;
use etudiant_rs_core::{AppError, AppResult, Settings};
use etudiant_rs_forms::{FormData, StudentUpdateController};
use etudiant_rs_model::{Country, EntityKind, FieldOfStudy, Id, Level, Student};
use etudiant_rs_routing::{History, Route};

use super::{print_json, service};
use crate::command::ManagementCommand;

/// Creates a student from command-line values.
pub struct CreateStudentCommand;

/// Values for a new student.
///
/// `values` holds the raw form fields (`nom`, `prenom`, `matricule`,
/// `date`); references are given by identifier.
#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub values: FormData,
    pub level: Option<Id>,
    pub field_of_study: Option<Id>,
    pub country: Option<Id>,
}

impl NewStudent {
    fn from_matches(matches: &clap::ArgMatches) -> Self {
        let values = ["nom", "prenom", "matricule", "date"]
            .into_iter()
            .filter_map(|key| {
                matches
                    .get_one::<String>(key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect();
        Self {
            values,
            level: matches.get_one::<Id>("niveau").copied(),
            field_of_study: matches.get_one::<Id>("filiere").copied(),
            country: matches.get_one::<Id>("pays").copied(),
        }
    }
}

/// Creates `input` on the backend configured by `settings`.
pub async fn create_student(input: &NewStudent, settings: &Settings) -> AppResult<Student> {
    let levels: Arc<dyn CollectionApi<Level>> = Arc::new(service::<Level>(settings));
    let fields: Arc<dyn CollectionApi<FieldOfStudy>> = Arc::new(service::<FieldOfStudy>(settings));
    let countries: Arc<dyn CollectionApi<Country>> = Arc::new(service::<Country>(settings));
    let history = Arc::new(History::starting_at(Route::list(EntityKind::Student)));
    history.navigate(Route::create(EntityKind::Student));

    let mut controller = StudentUpdateController::new(
        Arc::new(service::<Student>(settings)),
        Arc::clone(&levels),
        Arc::clone(&fields),
        Arc::clone(&countries),
        history.clone(),
    );

    if let Err(err) = controller.activate(&Student::new()).await {
        tracing::warn!(error = %err, "reference options incomplete; falling back to lookups");
    }
    controller.bind(&input.values).map_err(AppError::Validation)?;

    // An identifier outside the first page of options is looked up directly.
    if let Some(id) = input.level {
        if controller.select_level(Some(id)).is_err() {
            controller.form_mut().level = Some(levels.find(id).await?);
        }
    }
    if let Some(id) = input.field_of_study {
        if controller.select_field_of_study(Some(id)).is_err() {
            controller.form_mut().field_of_study = Some(fields.find(id).await?);
        }
    }
    if let Some(id) = input.country {
        if controller.select_country(Some(id)).is_err() {
            controller.form_mut().country = Some(countries.find(id).await?);
        }
    }

    let student = controller.save().await?;
    tracing::debug!(route = ?history.current().map(|r| r.to_string()), "returned after save");
    Ok(student)
}

#[async_trait]
impl ManagementCommand for CreateStudentCommand {
    fn name(&self) -> &'static str {
        "create-student"
    }

    fn help(&self) -> &'static str {
        "Creates a student"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(clap::Arg::new("nom").long("nom").help("Last name"))
            .arg(clap::Arg::new("prenom").long("prenom").help("First name"))
            .arg(clap::Arg::new("matricule").long("matricule").help("Registration number"))
            .arg(clap::Arg::new("date").long("date").help("Enrollment date, YYYY-MM-DD"))
            .arg(
                clap::Arg::new("niveau")
                    .long("niveau")
                    .value_parser(clap::value_parser!(Id))
                    .help("Level identifier"),
            )
            .arg(
                clap::Arg::new("filiere")
                    .long("filiere")
                    .value_parser(clap::value_parser!(Id))
                    .help("Field of study identifier"),
            )
            .arg(
                clap::Arg::new("pays")
                    .long("pays")
                    .value_parser(clap::value_parser!(Id))
                    .help("Country identifier"),
            )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> Result<(), AppError> {
        let student = create_student(&NewStudent::from_matches(matches), settings).await?;
        tracing::info!(id = ?student.id, "created student");
        let value = serde_json::to_value(&student).map_err(|e| AppError::Serialization(e.to_string()))?;
        print_json(&value)
    }
}
