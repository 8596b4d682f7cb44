//! `etudiant-admin`: management commands for etudiant-rs.
//!
//! Settings come from `--settings <file>` (TOML, or JSON by extension), else
//! from the file named by `ETUDIANT_SETTINGS`, else from defaults. In every
//! case `ETUDIANT_*` variables override the loaded values.

use std::path::Path;

use anyhow::Context;

use etudiant_rs::cli::commands::register_builtin_commands;
use etudiant_rs::cli::CommandRegistry;
use etudiant_rs::core::logging::setup_logging;
use etudiant_rs::core::settings_loader;
use etudiant_rs::Settings;

fn load_settings(path: Option<&str>) -> anyhow::Result<Settings> {
    let path = path
        .map(str::to_string)
        .or_else(|| std::env::var("ETUDIANT_SETTINGS").ok());
    let Some(path) = path else {
        return Ok(settings_loader::from_env());
    };
    let is_json = Path::new(&path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let settings = if is_json {
        settings_loader::from_json_file_with_env(&path)
    } else {
        settings_loader::from_toml_file_with_env(&path)
    };
    settings.with_context(|| format!("loading settings from {path}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);

    let matches = registry
        .build_cli()
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            clap::Arg::new("settings")
                .long("settings")
                .global(true)
                .help("Settings file (.toml or .json)"),
        )
        .get_matches();

    let settings = load_settings(matches.get_one::<String>("settings").map(String::as_str))?;
    setup_logging(&settings);
    tracing::debug!(api = %settings.api_base_url, "settings loaded");

    registry.execute(&matches, &settings).await?;
    Ok(())
}
