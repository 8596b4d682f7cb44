//! The `show` management command.

use async_trait::async_trait;
use serde_json::Value;

use etudiant_rs_client::CollectionApi;
use etudiant_rs_core::{AppError, AppResult, Settings};
use etudiant_rs_model::{Entity, EntityKind, Id};

use super::{for_kind, id_arg, kind_arg, print_json, selected_id, selected_kind, service};
use crate::command::ManagementCommand;

/// Prints one record as JSON.
pub struct ShowCommand;

/// Fetches record `id` of `kind`.
pub async fn show_record(kind: EntityKind, id: Id, settings: &Settings) -> AppResult<Value> {
    async fn find<E: Entity>(id: Id, settings: &Settings) -> AppResult<Value> {
        let record = service::<E>(settings).find(id).await?;
        serde_json::to_value(&record).map_err(|e| AppError::Serialization(e.to_string()))
    }
    for_kind!(kind, find(id, settings))
}

#[async_trait]
impl ManagementCommand for ShowCommand {
    fn name(&self) -> &'static str {
        "show"
    }

    fn help(&self) -> &'static str {
        "Shows one record"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(kind_arg()).arg(id_arg())
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> Result<(), AppError> {
        let record = show_record(selected_kind(matches)?, selected_id(matches)?, settings).await?;
        print_json(&record)
    }
}
