//! Citation check command.

use crate::cli::ValidateArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::session::Session;
use std::fs;

/// Execute the validate command.
///
/// Exits with an error when any cited id is unknown, so the command can
/// gate a pipeline step.
pub fn execute_validate(args: ValidateArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let mut ids = args.ids;
    if let Some(path) = &args.file {
        let contents = fs::read_to_string(path)?;
        ids.extend(split_ids(&contents));
    }
    if ids.is_empty() {
        return Err(CliError::InvalidInput("No ids given".to_string()));
    }

    let registry = session.open_registry()?;
    let report = registry.validate_citations(ids.iter().map(String::as_str));
    println!("{}", formatter.format_citations(&report)?);

    if report.all_valid() {
        Ok(())
    } else {
        Err(CliError::InvalidInput(format!(
            "{} cited id(s) not in the registry",
            report.invalid.len()
        )))
    }
}

fn split_ids(contents: &str) -> Vec<String> {
    contents
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
