//! Merge command implementation.

use crate::cli::{MergeArgs, PresetArg};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::session::Session;
use dossier_merge::{FactCandidate, IncrementalMerger, MergeConfig};
use std::fs;

/// Execute the merge command.
///
/// The input file holds a JSON array of extracted facts. Every candidate is
/// attributed to `--source`. With `--dry-run` the decisions are printed and
/// neither the registry nor the conflict queue is written.
pub fn execute_merge(args: MergeArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let source = args.source.trim();
    if source.is_empty() {
        return Err(CliError::InvalidInput("Source document must not be empty".to_string()));
    }

    let contents = fs::read_to_string(&args.file)?;
    let candidates: Vec<FactCandidate> = serde_json::from_str(&contents)?;
    let config = merge_config(args.preset, session);

    let registry = session.open_or_create_registry()?;
    let queue = session.load_conflicts()?;
    let mut merger = IncrementalMerger::with_queue(&registry, config, queue);

    if args.dry_run {
        let decisions: Vec<_> = candidates
            .into_iter()
            .map(|mut candidate| {
                candidate.fact.source_document = source.to_string();
                let decision = merger.determine_action(&candidate, source);
                (candidate.fact.item, decision)
            })
            .collect();
        println!("{}", formatter.format_decisions(&decisions)?);
        return Ok(());
    }

    let result = merger.merge_document_facts(candidates, source, args.remove_missing)?;
    let queue = merger.into_queue();

    session.save_registry(&registry)?;
    session.save_conflicts(&queue)?;

    println!("{}", formatter.format_merge_result(&result)?);
    Ok(())
}

fn merge_config(preset: Option<PresetArg>, session: &Session) -> MergeConfig {
    match preset {
        Some(PresetArg::Default) => MergeConfig::default(),
        Some(PresetArg::Strict) => MergeConfig::strict(),
        Some(PresetArg::Lenient) => MergeConfig::lenient(),
        None => session.config.merge.clone(),
    }
}
