//! Conflict listing and resolution.

use crate::cli::{ConflictsArgs, ResolveArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::session::Session;
use dossier_merge::IncrementalMerger;

/// Execute the conflicts command.
pub fn execute_conflicts(args: ConflictsArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let queue = session.load_conflicts()?;
    let conflicts = if args.all {
        queue.all().iter().collect()
    } else {
        queue.pending()
    };
    println!("{}", formatter.format_conflicts(&conflicts)?);
    Ok(())
}

/// Execute the resolve command.
pub fn execute_resolve(args: ResolveArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    if args.by.trim().is_empty() {
        return Err(CliError::InvalidInput("Reviewer id must not be empty".to_string()));
    }

    let registry = session.open_registry()?;
    let queue = session.load_conflicts()?;
    let mut merger = IncrementalMerger::with_queue(&registry, session.config.merge.clone(), queue);

    let fact = merger.resolve(&args.conflict_id, args.resolution.into(), args.by.trim(), &args.notes)?;
    let queue = merger.into_queue();

    session.save_registry(&registry)?;
    session.save_conflicts(&queue)?;

    println!(
        "{}",
        formatter.success(&format!("{} resolved; {} is now {}", args.conflict_id, fact.id, fact.verification_status))
    );
    Ok(())
}
