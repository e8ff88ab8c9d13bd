//! Dossier CLI - operator surface over a due-diligence fact registry.

use clap::Parser;
use dossier_cli::commands;
use dossier_cli::{Cli, Command, Config, Formatter, Session};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> dossier_cli::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let session = Session::new(config, cli.registry);
    tracing::debug!(registry = %session.registry_path().display(), "Session opened");

    match cli.command {
        Command::Summary => commands::execute_summary(&session, &formatter)?,
        Command::Facts(args) => commands::execute_facts(args, &session, &formatter)?,
        Command::Gaps(args) => commands::execute_gaps(args, &session, &formatter)?,
        Command::Format(args) => commands::execute_format(args, &session)?,
        Command::Compare(args) => commands::execute_compare(args, &session, &formatter)?,
        Command::Lock(args) => commands::execute_lock(args, &session, &formatter)?,
        Command::Confirm(args) => commands::execute_confirm(args, &session, &formatter)?,
        Command::Merge(args) => commands::execute_merge(args, &session, &formatter)?,
        Command::Combine(args) => commands::execute_combine(args, &session, &formatter)?,
        Command::Conflicts(args) => commands::execute_conflicts(args, &session, &formatter)?,
        Command::Resolve(args) => commands::execute_resolve(args, &session, &formatter)?,
        Command::Validate(args) => commands::execute_validate(args, &session, &formatter)?,
    }

    Ok(())
}
