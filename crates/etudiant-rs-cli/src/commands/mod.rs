//! Built-in management commands.
//!
//! `runserver` and `check` work on the local configuration; the record
//! commands talk to the REST backend at `settings.api_base_url`.

pub mod check;
pub mod create_student;
pub mod delete;
pub mod list;
pub mod runserver;
pub mod show;

pub use check::CheckCommand;
pub use create_student::CreateStudentCommand;
pub use delete::DeleteCommand;
pub use list::ListCommand;
pub use runserver::RunserverCommand;
pub use show::ShowCommand;

use std::sync::Arc;

use etudiant_rs_client::{CollectionService, HttpTransport};
use etudiant_rs_core::{AppError, AppResult, Settings};
use etudiant_rs_model::{Entity, EntityKind, Id};

use crate::command::CommandRegistry;

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(RunserverCommand));
    registry.register(Box::new(CheckCommand));
    registry.register(Box::new(ListCommand));
    registry.register(Box::new(ShowCommand));
    registry.register(Box::new(DeleteCommand));
    registry.register(Box::new(CreateStudentCommand));
}

/// Calls `$call::<E>($args..)` for the record type of `$kind`.
macro_rules! for_kind {
    ($kind:expr, $call:ident ( $($arg:expr),* $(,)? )) => {
        match $kind {
            ::etudiant_rs_model::EntityKind::Student => $call::<::etudiant_rs_model::Student>($($arg),*).await,
            ::etudiant_rs_model::EntityKind::Country => $call::<::etudiant_rs_model::Country>($($arg),*).await,
            ::etudiant_rs_model::EntityKind::FieldOfStudy => $call::<::etudiant_rs_model::FieldOfStudy>($($arg),*).await,
            ::etudiant_rs_model::EntityKind::Level => $call::<::etudiant_rs_model::Level>($($arg),*).await,
        }
    };
}
pub(crate) use for_kind;

/// A collection service over HTTP, configured from `settings`.
pub fn service<E: Entity>(settings: &Settings) -> CollectionService<E> {
    CollectionService::from_settings(Arc::new(HttpTransport::new(&settings.api_base_url)), settings)
}

pub(crate) fn kind_arg() -> clap::Arg {
    clap::Arg::new("kind")
        .required(true)
        .value_parser(clap::value_parser!(EntityKind))
        .help("etudiant, pays, filiere or niveau")
}

pub(crate) fn id_arg() -> clap::Arg {
    clap::Arg::new("id")
        .required(true)
        .value_parser(clap::value_parser!(Id))
        .help("Record identifier")
}

pub(crate) fn selected_kind(matches: &clap::ArgMatches) -> AppResult<EntityKind> {
    matches
        .get_one::<EntityKind>("kind")
        .copied()
        .ok_or_else(|| AppError::BadRequest("missing entity kind".to_string()))
}

pub(crate) fn selected_id(matches: &clap::ArgMatches) -> AppResult<Id> {
    matches
        .get_one::<Id>("id")
        .copied()
        .ok_or_else(|| AppError::BadRequest("missing identifier".to_string()))
}

pub(crate) fn print_json(value: &serde_json::Value) -> AppResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| AppError::Serialization(e.to_string()))?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_commands() {
        let mut registry = CommandRegistry::new();
        register_builtin_commands(&mut registry);
        assert_eq!(
            registry.list_commands(),
            vec!["check", "create-student", "delete", "list", "runserver", "show"]
        );
    }

    #[test]
    fn test_kind_and_id_arguments() {
        let cmd = clap::Command::new("show").arg(kind_arg()).arg(id_arg());
        let matches = cmd.clone().try_get_matches_from(["show", "niveaus", "7"]).unwrap();
        assert_eq!(selected_kind(&matches).unwrap(), EntityKind::Level);
        assert_eq!(selected_id(&matches).unwrap(), 7);

        assert!(cmd.clone().try_get_matches_from(["show", "students", "x"]).is_err());
        assert!(cmd.try_get_matches_from(["show", "planets", "1"]).is_err());
    }

    #[test]
    fn test_service_uses_settings_prefix() {
        let settings = Settings {
            api_prefix: "/v2/".to_string(),
            ..Settings::default()
        };
        let countries = service::<etudiant_rs_model::Country>(&settings);
        assert_eq!(countries.resource_url(), "/v2/pays");
    }
}
