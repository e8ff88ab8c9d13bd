//! Lock and confirm commands.

use crate::cli::{ConfirmArgs, LockArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::session::Session;
use dossier_domain::Entity;

/// Execute the lock command.
pub fn execute_lock(args: LockArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let registry = session.open_registry()?;
    let entity: Entity = args.entity.into();

    if registry.lock_with_coverage(entity, args.covered, args.missing) {
        session.save_registry(&registry)?;
        println!("{}", formatter.success(&format!("{} locked", entity)));
    } else {
        println!("{}", formatter.warning(&format!("{} was already locked", entity)));
    }
    Ok(())
}

/// Execute the confirm command.
pub fn execute_confirm(args: ConfirmArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    if args.by.trim().is_empty() {
        return Err(CliError::InvalidInput("Reviewer id must not be empty".to_string()));
    }

    let registry = session.open_registry()?;
    registry.confirm_fact(&args.id, args.by.trim(), &args.note)?;
    session.save_registry(&registry)?;

    println!(
        "{}",
        formatter.success(&format!("{} confirmed by {}", args.id, args.by.trim()))
    );
    Ok(())
}
