//! Combine command implementation.

use crate::cli::CombineArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::session::Session;
use dossier_store::FactRegistry;

/// Execute the combine command.
///
/// Each file is loaded with the session's registry settings and absorbed
/// in argument order; records keep their original ids.
pub fn execute_combine(args: CombineArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let registry = session.open_or_create_registry()?;

    for path in &args.files {
        let other = FactRegistry::load_with_config(path, session.config.registry.clone())?;
        let counts = registry.merge_from(&other);
        println!(
            "{}",
            formatter.success(&format!(
                "{}: {} facts, {} gaps imported",
                path.display(),
                counts.facts,
                counts.gaps
            ))
        );
        if counts.duplicates > 0 {
            println!(
                "{}",
                formatter.warning(&format!("{} duplicate id(s) kept local", counts.duplicates))
            );
        }
    }

    session.save_registry(&registry)?;
    Ok(())
}
