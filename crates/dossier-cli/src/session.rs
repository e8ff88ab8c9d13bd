//! Registry and conflict-queue files for one CLI invocation.

use crate::config::Config;
use crate::error::{CliError, Result};
use dossier_merge::ConflictQueue;
use dossier_store::FactRegistry;
use std::path::{Path, PathBuf};

/// Resolved file locations plus the loaded configuration.
#[derive(Debug, Clone)]
pub struct Session {
    /// Loaded configuration
    pub config: Config,
    registry_path: PathBuf,
    conflicts_path: PathBuf,
}

impl Session {
    /// Create a session; the registry path falls back to the configured one.
    pub fn new(config: Config, registry: Option<PathBuf>) -> Self {
        let registry_path = registry.unwrap_or_else(|| config.settings.registry_path.clone());
        let conflicts_path = conflicts_path_for(&registry_path);
        Self {
            config,
            registry_path,
            conflicts_path,
        }
    }

    /// Registry file
    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    /// Conflict queue file kept next to the registry
    pub fn conflicts_path(&self) -> &Path {
        &self.conflicts_path
    }

    /// Load the registry, failing if the file does not exist.
    pub fn open_registry(&self) -> Result<FactRegistry> {
        if !self.registry_path.exists() {
            return Err(CliError::NoRegistry(self.registry_path.display().to_string()));
        }
        Ok(FactRegistry::load_with_config(
            &self.registry_path,
            self.config.registry.clone(),
        )?)
    }

    /// Load the registry, or start an empty one if the file does not exist.
    pub fn open_or_create_registry(&self) -> Result<FactRegistry> {
        if self.registry_path.exists() {
            self.open_registry()
        } else {
            tracing::info!(path = %self.registry_path.display(), "Starting new registry");
            Ok(FactRegistry::with_config(self.config.registry.clone()))
        }
    }

    /// Write the registry back to its file.
    pub fn save_registry(&self, registry: &FactRegistry) -> Result<()> {
        registry.save(&self.registry_path)?;
        Ok(())
    }

    /// Load the conflict queue (empty when no file exists yet).
    pub fn load_conflicts(&self) -> Result<ConflictQueue> {
        Ok(ConflictQueue::load(&self.conflicts_path)?)
    }

    /// Write the conflict queue.
    pub fn save_conflicts(&self, queue: &ConflictQueue) -> Result<()> {
        queue.save(&self.conflicts_path)?;
        Ok(())
    }
}

/// `deal/facts.json` keeps its conflicts in `deal/facts.conflicts.json`.
fn conflicts_path_for(registry_path: &Path) -> PathBuf {
    let stem = registry_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dossier".to_string());
    registry_path.with_file_name(format!("{}.conflicts.json", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_domain::{Entity, NewFact};
    use tempfile::TempDir;

    #[test]
    fn test_conflicts_path() {
        assert_eq!(
            conflicts_path_for(Path::new("deal/facts.json")),
            PathBuf::from("deal/facts.conflicts.json")
        );
        assert_eq!(
            conflicts_path_for(Path::new("dossier.json")),
            PathBuf::from("dossier.conflicts.json")
        );
    }

    #[test]
    fn test_registry_round_trip() {
        let dir = TempDir::new().unwrap();
        let session = Session::new(Config::default(), Some(dir.path().join("facts.json")));

        assert!(matches!(session.open_registry(), Err(CliError::NoRegistry(_))));

        let registry = session.open_or_create_registry().unwrap();
        registry
            .add_fact(NewFact::new("network", "wan", "MPLS", Entity::Target))
            .unwrap();
        session.save_registry(&registry).unwrap();

        let reopened = session.open_registry().unwrap();
        assert_eq!(reopened.fact_count(), 1);
        assert!(session.load_conflicts().unwrap().is_empty());
    }
}
