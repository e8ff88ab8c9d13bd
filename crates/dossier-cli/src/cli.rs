//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use dossier_domain::Entity;
use dossier_merge::Resolution;
use std::path::PathBuf;

/// Dossier CLI - Inspect and maintain a due-diligence fact registry.
#[derive(Debug, Parser)]
#[command(name = "dossier")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Registry file (overrides the configured path)
    #[arg(short, long, global = true, env = "DOSSIER_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show registry counts and lock states
    Summary,

    /// List facts
    Facts(FactsArgs),

    /// List gaps
    Gaps(GapsArgs),

    /// Print the reasoning snapshot for one domain and entity
    Format(FormatArgs),

    /// Compare target and buyer facts
    Compare(CompareArgs),

    /// Mark an entity's discovery complete
    Lock(LockArgs),

    /// Confirm a fact after human review
    Confirm(ConfirmArgs),

    /// Merge a document's extracted facts into the registry
    Merge(MergeArgs),

    /// Absorb other registry files, keeping their ids
    Combine(CombineArgs),

    /// List queued conflicts
    Conflicts(ConflictsArgs),

    /// Resolve a queued conflict
    Resolve(ResolveArgs),

    /// Check that cited ids exist
    Validate(ValidateArgs),
}

/// Entity argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EntityArg {
    /// The company being acquired
    Target,
    /// The acquiring company
    Buyer,
}

/// Arguments for the facts command.
#[derive(Debug, Parser)]
pub struct FactsArgs {
    /// Filter by entity
    #[arg(short, long, value_enum)]
    pub entity: Option<EntityArg>,

    /// Filter by domain
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Filter by category
    #[arg(long)]
    pub category: Option<String>,

    /// Filter by source document
    #[arg(short, long)]
    pub source: Option<String>,

    /// Include facts marked removed
    #[arg(long)]
    pub include_removed: bool,
}

/// Arguments for the gaps command.
#[derive(Debug, Parser)]
pub struct GapsArgs {
    /// Filter by domain
    #[arg(short, long)]
    pub domain: Option<String>,
}

/// Arguments for the format command.
#[derive(Debug, Parser)]
pub struct FormatArgs {
    /// Domain to project
    pub domain: String,

    /// Entity to project
    #[arg(short, long, value_enum, default_value = "target")]
    pub entity: EntityArg,
}

/// Arguments for the compare command.
#[derive(Debug, Parser)]
pub struct CompareArgs {
    /// Restrict to one domain
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Restrict to one category
    #[arg(long)]
    pub category: Option<String>,
}

/// Arguments for the lock command.
#[derive(Debug, Parser)]
pub struct LockArgs {
    /// Entity to lock
    #[arg(value_enum)]
    pub entity: EntityArg,

    /// Categories declared covered (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub covered: Vec<String>,

    /// Categories declared missing (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub missing: Vec<String>,
}

/// Arguments for the confirm command.
#[derive(Debug, Parser)]
pub struct ConfirmArgs {
    /// Fact id
    pub id: String,

    /// Reviewer id
    #[arg(short, long, env = "DOSSIER_REVIEWER")]
    pub by: String,

    /// Verification note
    #[arg(short, long, default_value = "")]
    pub note: String,
}

/// Arguments for the merge command.
#[derive(Debug, Parser)]
pub struct MergeArgs {
    /// JSON file with an array of extracted facts
    pub file: PathBuf,

    /// Source document the facts were extracted from
    #[arg(short, long)]
    pub source: String,

    /// Mark facts from this document that are no longer extracted as removed
    #[arg(long)]
    pub remove_missing: bool,

    /// Merge preset (overrides the configured [merge] section)
    #[arg(short, long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Report decisions without changing the registry
    #[arg(long)]
    pub dry_run: bool,
}

/// Merge preset argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Default thresholds
    Default,
    /// Fewer matches, more evidence conflicts
    Strict,
    /// More matches, fewer evidence conflicts
    Lenient,
}

/// Arguments for the combine command.
#[derive(Debug, Parser)]
pub struct CombineArgs {
    /// Registry files to absorb
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the conflicts command.
#[derive(Debug, Parser)]
pub struct ConflictsArgs {
    /// Include resolved conflicts
    #[arg(short, long)]
    pub all: bool,
}

/// Arguments for the resolve command.
#[derive(Debug, Parser)]
pub struct ResolveArgs {
    /// Conflict id
    pub conflict_id: String,

    /// Resolution strategy
    #[arg(value_enum)]
    pub resolution: ResolutionArg,

    /// Reviewer id
    #[arg(short, long, env = "DOSSIER_REVIEWER")]
    pub by: String,

    /// Resolution notes
    #[arg(short, long, default_value = "")]
    pub notes: String,
}

/// Resolution argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ResolutionArg {
    /// Keep the confirmed fact
    KeepExisting,
    /// Take the new data and return the fact to pending
    UseNew,
    /// Join old and new values
    Merge,
}

/// Arguments for the validate command.
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// Cited ids
    pub ids: Vec<String>,

    /// Read ids from a file (whitespace or comma separated)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<EntityArg> for Entity {
    fn from(entity: EntityArg) -> Self {
        match entity {
            EntityArg::Target => Entity::Target,
            EntityArg::Buyer => Entity::Buyer,
        }
    }
}

impl From<ResolutionArg> for Resolution {
    fn from(resolution: ResolutionArg) -> Self {
        match resolution {
            ResolutionArg::KeepExisting => Resolution::KeepExisting,
            ResolutionArg::UseNew => Resolution::UseNew,
            ResolutionArg::Merge => Resolution::Merge,
        }
    }
}
