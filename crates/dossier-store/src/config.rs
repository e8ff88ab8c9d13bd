//! Registry configuration

use serde::{Deserialize, Serialize};

/// Domains accepted by default
pub const DEFAULT_DOMAINS: [&str; 6] = [
    "infrastructure",
    "network",
    "cybersecurity",
    "applications",
    "identity_access",
    "organization",
];

/// Configuration for a fact registry
///
/// # Examples
///
/// ```
/// use dossier_store::RegistryConfig;
///
/// let config = RegistryConfig::default();
/// assert!(config.is_known_domain("Infrastructure"));
/// assert!(!config.is_known_domain("marketing"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Domains facts and gaps may be filed under
    #[serde(default = "default_domains")]
    pub domains: Vec<String>,

    /// Evidence quotes longer than this are truncated in reasoning snapshots
    #[serde(default = "default_evidence_excerpt_chars")]
    pub evidence_excerpt_chars: usize,

    /// Item similarity at or above which a new fact counts as a near-duplicate
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f64,
}

fn default_domains() -> Vec<String> {
    DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect()
}

fn default_evidence_excerpt_chars() -> usize {
    150
}

fn default_duplicate_threshold() -> f64 {
    0.85
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            domains: default_domains(),
            evidence_excerpt_chars: default_evidence_excerpt_chars(),
            duplicate_threshold: default_duplicate_threshold(),
        }
    }
}

impl RegistryConfig {
    /// Whether `domain` is in the configured set (case-insensitive)
    pub fn is_known_domain(&self, domain: &str) -> bool {
        let domain = domain.trim();
        self.domains.iter().any(|d| d.eq_ignore_ascii_case(domain))
    }

    /// Configured domains, comma-joined for messages
    pub fn domain_list(&self) -> String {
        self.domains.join(", ")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.domains.is_empty() {
            return Err("domains must not be empty".to_string());
        }
        if self.domains.iter().any(|d| d.trim().is_empty()) {
            return Err("domains must not contain blank names".to_string());
        }
        if self.evidence_excerpt_chars == 0 {
            return Err("evidence_excerpt_chars must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.duplicate_threshold) {
            return Err("duplicate_threshold must be between 0.0 and 1.0".to_string());
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
