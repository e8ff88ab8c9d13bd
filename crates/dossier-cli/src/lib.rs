//! Dossier CLI library.
//!
//! Configuration, argument parsing, command execution and output formatting
//! for the `dossier` binary, which operates on a registry persisted as JSON.

#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod session;

pub use cli::{Cli, Command};
pub use config::{Config, OutputFormat};
pub use error::{CliError, Result};
pub use output::Formatter;
pub use session::Session;
