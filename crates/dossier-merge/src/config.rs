//! Merger configuration

use serde::{Deserialize, Serialize};

/// Thresholds and weights used by the incremental merger
///
/// # Examples
///
/// ```
/// use dossier_merge::MergeConfig;
///
/// let config = MergeConfig::default();
/// assert_eq!(config.match_threshold, 0.85);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Minimum weighted score for a candidate to match an existing fact (0.0-1.0)
    pub match_threshold: f64,

    /// Weight of item similarity in the match score
    pub item_weight: f64,

    /// Weight of evidence-quote similarity in the match score
    pub evidence_weight: f64,

    /// Evidence similarity below this is reported as an evidence conflict
    pub evidence_conflict_threshold: f64,

    /// Separator placed between old and new values by the `merge` resolution
    pub merge_separator: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.85,
            item_weight: 0.7,
            evidence_weight: 0.3,
            evidence_conflict_threshold: 0.8,
            merge_separator: " | ".to_string(),
        }
    }
}

impl MergeConfig {
    /// Create a strict configuration (fewer matches, more evidence conflicts)
    pub fn strict() -> Self {
        Self {
            match_threshold: 0.92,
            evidence_conflict_threshold: 0.9,
            ..Self::default()
        }
    }

    /// Create a lenient configuration (more matches, fewer evidence conflicts)
    pub fn lenient() -> Self {
        Self {
            match_threshold: 0.75,
            evidence_conflict_threshold: 0.6,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("match_threshold", self.match_threshold),
            ("item_weight", self.item_weight),
            ("evidence_weight", self.evidence_weight),
            ("evidence_conflict_threshold", self.evidence_conflict_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0.0 and 1.0", name));
            }
        }

        if (self.item_weight + self.evidence_weight - 1.0).abs() > 1e-6 {
            return Err("item_weight and evidence_weight must sum to 1.0".to_string());
        }

        if self.merge_separator.is_empty() {
            return Err("merge_separator must not be empty".to_string());
        }

        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
