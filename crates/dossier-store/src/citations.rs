//! Citation validation for collaborators that cite facts and gaps by id

use serde::{Deserialize, Serialize};

/// Outcome of checking a list of cited ids against the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationReport {
    /// Cited ids that resolve to a fact or gap
    pub valid: Vec<String>,

    /// Cited ids that resolve to nothing
    pub invalid: Vec<String>,

    /// `valid / (valid + invalid)`; 1.0 when nothing was cited
    pub validation_rate: f64,
}

impl CitationReport {
    /// Build a report by testing each id with `exists`
    ///
    /// Ids are trimmed; blank entries are ignored. Order is preserved.
    pub(crate) fn build<'a>(ids: impl IntoIterator<Item = &'a str>, exists: impl Fn(&str) -> bool) -> Self {
        let mut valid = Vec::new();
        let mut invalid = Vec::new();

        for id in ids {
            let id = id.trim();
            if id.is_empty() {
                continue;
            }
            if exists(id) {
                valid.push(id.to_string());
            } else {
                invalid.push(id.to_string());
            }
        }

        let total = valid.len() + invalid.len();
        let validation_rate = if total == 0 {
            1.0
        } else {
            valid.len() as f64 / total as f64
        };

        Self {
            valid,
            invalid,
            validation_rate,
        }
    }

    /// Whether every citation resolved
    pub fn all_valid(&self) -> bool {
        self.invalid.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate() {
        let known = ["F-NET-001", "G-NET-001"];
        let report = CitationReport::build(
            ["F-NET-001", " G-NET-001 ", "F-NET-999", ""],
            |id| known.contains(&id),
        );
        assert_eq!(report.valid, vec!["F-NET-001", "G-NET-001"]);
        assert_eq!(report.invalid, vec!["F-NET-999"]);
        assert!((report.validation_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!(!report.all_valid());
    }

    #[test]
    fn test_empty_is_fully_valid() {
        let report = CitationReport::build(Vec::<&str>::new(), |_| false);
        assert_eq!(report.validation_rate, 1.0);
        assert!(report.all_valid());
    }
}
