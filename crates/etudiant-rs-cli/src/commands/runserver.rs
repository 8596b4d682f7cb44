//! The `runserver` management command.
//!
//! Serves the reference REST backend until Ctrl-C.

use async_trait::async_trait;

use etudiant_rs_core::{AppError, Settings};

use crate::command::ManagementCommand;

/// Starts the reference backend.
///
/// `--host` and `--port` override `settings.server`.
pub struct RunserverCommand;

/// Applies the command-line overrides to a copy of `settings`.
pub fn effective_settings(matches: &clap::ArgMatches, settings: &Settings) -> Settings {
    let mut settings = settings.clone();
    if let Some(host) = matches.get_one::<String>("host") {
        settings.server.host.clone_from(host);
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        settings.server.port = *port;
    }
    settings
}

#[async_trait]
impl ManagementCommand for RunserverCommand {
    fn name(&self) -> &'static str {
        "runserver"
    }

    fn help(&self) -> &'static str {
        "Serves the reference REST backend"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("host")
                .long("host")
                .help("Host to bind to (default: settings.server.host)"),
        )
        .arg(
            clap::Arg::new("port")
                .long("port")
                .value_parser(clap::value_parser!(u16))
                .help("Port to bind to (default: settings.server.port)"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> Result<(), AppError> {
        let settings = effective_settings(matches, settings);
        tracing::info!(
            "Starting reference backend at http://{}/ (debug={})",
            settings.server.bind_addr(),
            settings.debug
        );
        etudiant_rs_server::run(&settings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> clap::ArgMatches {
        RunserverCommand
            .add_arguments(clap::Command::new("runserver"))
            .try_get_matches_from(args)
            .unwrap()
    }

    #[test]
    fn test_defaults_come_from_settings() {
        let settings = effective_settings(&parse(&["runserver"]), &Settings::default());
        assert_eq!(settings.server.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_overrides() {
        let matches = parse(&["runserver", "--host", "0.0.0.0", "--port", "9000"]);
        let settings = effective_settings(&matches, &Settings::default());
        assert_eq!(settings.server.bind_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_rejects_bad_port() {
        let result = RunserverCommand
            .add_arguments(clap::Command::new("runserver"))
            .try_get_matches_from(["runserver", "--port", "http"]);
        assert!(result.is_err());
    }
}
