//! The `delete` management command.

use async_trait::async_trait;

use etudiant_rs_client::CollectionApi;
use etudiant_rs_core::{AppError, AppResult, Settings};
use etudiant_rs_model::{Entity, EntityKind, Id};

use super::{for_kind, id_arg, kind_arg, selected_id, selected_kind, service};
use crate::command::ManagementCommand;

/// Deletes one record.
///
/// Deleting an identifier that does not exist (or no longer exists) fails
/// with the backend's not-found error.
pub struct DeleteCommand;

pub async fn delete_record(kind: EntityKind, id: Id, settings: &Settings) -> AppResult<()> {
    async fn delete<E: Entity>(id: Id, settings: &Settings) -> AppResult<()> {
        service::<E>(settings).delete(id).await
    }
    for_kind!(kind, delete(id, settings))
}

#[async_trait]
impl ManagementCommand for DeleteCommand {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn help(&self) -> &'static str {
        "Deletes one record"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(kind_arg()).arg(id_arg())
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> Result<(), AppError> {
        let kind = selected_kind(matches)?;
        let id = selected_id(matches)?;
        delete_record(kind, id, settings).await?;
        println!("Deleted {kind} {id}");
        Ok(())
    }
}
