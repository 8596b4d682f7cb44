//! # etudiant-rs-cli
//!
//! Management commands for etudiant-rs.
//!
//! - **Command framework** - [`ManagementCommand`] and [`CommandRegistry`]
//! - **Built-in commands** - `runserver`, `check`, `list`, `show`, `delete`
//!   and `create-student` (see [`commands`])
//!
//! ## Quick Start
//!
//! ```rust
//! use etudiant_rs_cli::command::CommandRegistry;
//! use etudiant_rs_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! let names = registry.list_commands();
//! assert!(names.contains(&"runserver"));
//! assert!(names.contains(&"create-student"));
//! ```

// - result_large_err: AppError is the workspace-wide error type
// - unused_async: command handlers keep one async signature
#![allow(clippy::result_large_err)]
#![allow(clippy::unused_async)]

pub mod command;
pub mod commands;

pub use command::{CommandRegistry, ManagementCommand};
