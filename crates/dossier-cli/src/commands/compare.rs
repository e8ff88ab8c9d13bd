//! Compare command implementation.

use crate::cli::CompareArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::session::Session;
use dossier_domain::Entity;

/// Execute the compare command.
pub fn execute_compare(args: CompareArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let registry = session.open_registry()?;
    let report = registry.compare(
        Entity::Target,
        Entity::Buyer,
        args.domain.as_deref(),
        args.category.as_deref(),
    );
    println!("{}", formatter.format_comparison(&report)?);
    Ok(())
}
