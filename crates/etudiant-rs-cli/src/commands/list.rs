//! The `list` management command.

use async_trait::async_trait;
use serde_json::{json, Value};

use etudiant_rs_client::{CollectionApi, QueryCriteria};
use etudiant_rs_core::{AppError, AppResult, Settings};
use etudiant_rs_model::{Entity, EntityKind};

use super::{for_kind, kind_arg, print_json, selected_kind, service};
use crate::command::ManagementCommand;

/// Prints one page of a collection as JSON.
pub struct ListCommand;

/// Fetches one page of `kind` as `{"items": [...], "total": n}`.
///
/// `total` is `null` when the backend sends no `X-Total-Count`.
pub async fn list_records(kind: EntityKind, criteria: &QueryCriteria, settings: &Settings) -> AppResult<Value> {
    async fn page_of<E: Entity>(criteria: &QueryCriteria, settings: &Settings) -> AppResult<Value> {
        let page = service::<E>(settings).query(criteria).await?;
        let items = serde_json::to_value(&page.items).map_err(|e| AppError::Serialization(e.to_string()))?;
        Ok(json!({ "items": items, "total": page.total_count }))
    }
    for_kind!(kind, page_of(criteria, settings))
}

pub(crate) fn criteria_from(matches: &clap::ArgMatches, settings: &Settings) -> QueryCriteria {
    let mut criteria = QueryCriteria::new()
        .page(matches.get_one::<usize>("page").copied().unwrap_or(0))
        .size(matches.get_one::<usize>("size").copied().unwrap_or(settings.page_size));
    if let Some(clauses) = matches.get_many::<String>("sort") {
        for clause in clauses {
            criteria = criteria.sort(clause.as_str());
        }
    }
    criteria
}

#[async_trait]
impl ManagementCommand for ListCommand {
    fn name(&self) -> &'static str {
        "list"
    }

    fn help(&self) -> &'static str {
        "Lists one page of records"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(kind_arg())
            .arg(
                clap::Arg::new("page")
                    .long("page")
                    .value_parser(clap::value_parser!(usize))
                    .help("Zero-based page number (default: 0)"),
            )
            .arg(
                clap::Arg::new("size")
                    .long("size")
                    .value_parser(clap::value_parser!(usize))
                    .help("Page size (default: settings.page_size)"),
            )
            .arg(
                clap::Arg::new("sort")
                    .long("sort")
                    .action(clap::ArgAction::Append)
                    .help("Sort clause such as id,desc; repeatable"),
            )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> Result<(), AppError> {
        let kind = selected_kind(matches)?;
        let criteria = criteria_from(matches, settings);
        let listing = list_records(kind, &criteria, settings).await?;
        tracing::info!(kind = %kind, page = ?criteria.page, total = %listing["total"], "listed records");
        print_json(&listing)
    }
}
