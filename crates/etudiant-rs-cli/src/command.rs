//! Management command framework.
//!
//! A [`ManagementCommand`] names itself, declares its clap arguments and
//! handles a parsed invocation. [`CommandRegistry`] collects commands, builds
//! the `etudiant-admin` parser and dispatches to the chosen subcommand.
//!
//! ## Defining a Custom Command
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use etudiant_rs_cli::command::ManagementCommand;
//! use etudiant_rs_core::{AppError, Settings};
//!
//! struct PingCommand;
//!
//! #[async_trait]
//! impl ManagementCommand for PingCommand {
//!     fn name(&self) -> &'static str { "ping" }
//!     fn help(&self) -> &'static str { "Print the backend URL" }
//!
//!     async fn handle(
//!         &self,
//!         _matches: &clap::ArgMatches,
//!         settings: &Settings,
//!     ) -> Result<(), AppError> {
//!         println!("{}", settings.api_base_url);
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::ffi::OsString;

use async_trait::async_trait;
use etudiant_rs_core::{AppError, Settings};

/// Name of the top-level binary.
pub const PROGRAM_NAME: &str = "etudiant-admin";

/// A command invoked as `etudiant-admin <name> ...`.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// The subcommand name.
    fn name(&self) -> &'static str;

    /// One-line help shown in `--help`.
    fn help(&self) -> &'static str;

    /// Adds positional arguments, flags or options to the subcommand.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Runs the command.
    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> Result<(), AppError>;
}

/// Commands registered by name.
pub struct CommandRegistry {
    commands: HashMap<&'static str, Box<dyn ManagementCommand>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.list_commands())
            .finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registers a command, replacing any command of the same name.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        self.commands.insert(command.name(), command);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Registered names, sorted.
    pub fn list_commands(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the top-level parser with one subcommand per registered command.
    pub fn build_cli(&self) -> clap::Command {
        let mut app = clap::Command::new(PROGRAM_NAME)
            .about("Administration of foreign-student records")
            .subcommand_required(true)
            .arg_required_else_help(true);

        for name in self.list_commands() {
            if let Some(cmd) = self.get(name) {
                let subcmd = clap::Command::new(name).about(cmd.help());
                app = app.subcommand(cmd.add_arguments(subcmd));
            }
        }

        app
    }

    /// Dispatches parsed top-level matches to the chosen command.
    pub async fn execute(&self, matches: &clap::ArgMatches, settings: &Settings) -> Result<(), AppError> {
        let (name, sub_matches) = matches
            .subcommand()
            .ok_or_else(|| AppError::ConfigurationError("No subcommand specified".to_string()))?;

        let cmd = self
            .get(name)
            .ok_or_else(|| AppError::ConfigurationError(format!("Unknown command: {name}")))?;

        tracing::debug!(command = name, "running management command");
        cmd.handle(sub_matches, settings).await
    }

    /// Parses `args` (program name first) and executes the result.
    ///
    /// Parse failures, including `--help`, come back as
    /// [`AppError::ConfigurationError`] carrying clap's rendered message.
    pub async fn run_from<I, T>(&self, args: I, settings: &Settings) -> Result<(), AppError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .build_cli()
            .try_get_matches_from(args)
            .map_err(|err| AppError::ConfigurationError(err.render().to_string()))?;
        self.execute(&matches, settings).await
    }
}
