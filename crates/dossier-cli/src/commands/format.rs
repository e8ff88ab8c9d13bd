//! Reasoning snapshot command.

use crate::cli::FormatArgs;
use crate::error::Result;
use crate::session::Session;

/// Execute the format command.
///
/// The snapshot is plain text meant for a reasoning prompt, so it is
/// printed as-is whatever the output format.
pub fn execute_format(args: FormatArgs, session: &Session) -> Result<()> {
    let registry = session.open_registry()?;
    println!("{}", registry.format_for_reasoning(&args.domain, args.entity.into()));
    Ok(())
}
