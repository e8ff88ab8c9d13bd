//! Summary command implementation.

use crate::error::Result;
use crate::output::Formatter;
use crate::session::Session;
use dossier_domain::Entity;

/// Execute the summary command.
pub fn execute_summary(session: &Session, formatter: &Formatter) -> Result<()> {
    let registry = session.open_registry()?;
    let locks: Vec<_> = Entity::ALL
        .iter()
        .map(|&entity| (entity, registry.lock_state(entity)))
        .collect();

    println!("{}", formatter.format_summary(&registry.stats(), &locks)?);

    let malformed = registry.malformed_ids();
    if !malformed.is_empty() {
        eprintln!(
            "{}",
            formatter.warning(&format!("{} malformed id(s): {}", malformed.len(), malformed.join(", ")))
        );
    }
    Ok(())
}
