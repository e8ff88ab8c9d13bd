//! Facts and gaps listing.

use crate::cli::{FactsArgs, GapsArgs};
use crate::error::Result;
use crate::output::Formatter;
use crate::session::Session;
use dossier_domain::FactQuery;

/// Execute the facts command.
pub fn execute_facts(args: FactsArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let registry = session.open_registry()?;
    let query = FactQuery {
        entity: args.entity.map(Into::into),
        domain: args.domain,
        category: args.category,
        source_document: args.source,
        include_removed: args.include_removed,
    };

    let facts = registry.query_facts(&query);
    println!("{}", formatter.format_facts(&facts)?);
    Ok(())
}

/// Execute the gaps command.
pub fn execute_gaps(args: GapsArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let registry = session.open_registry()?;
    let gaps = registry.gaps_for(args.domain.as_deref());
    println!("{}", formatter.format_gaps(&gaps)?);
    Ok(())
}
