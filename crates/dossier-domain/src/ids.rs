//! Identifier format for facts and gaps
//!
//! Ids look like `F-INFRA-001` (facts) and `G-INFRA-001` (gaps): a kind
//! letter, a domain prefix and a sequence number zero-padded to three digits.
//! Sequences past 999 simply grow wider.

use crate::DomainError;
use std::fmt;

/// Prefix used for domains outside the known table
pub const GENERIC_PREFIX: &str = "GEN";

/// Map a domain name to its short id prefix
///
/// Unknown domains map to [`GENERIC_PREFIX`].
///
/// # Examples
///
/// ```
/// use dossier_domain::domain_prefix;
///
/// assert_eq!(domain_prefix("infrastructure"), "INFRA");
/// assert_eq!(domain_prefix("quantum"), "GEN");
/// ```
pub fn domain_prefix(domain: &str) -> &'static str {
    match domain.trim().to_lowercase().as_str() {
        "infrastructure" => "INFRA",
        "network" => "NET",
        "cybersecurity" => "CYBER",
        "applications" => "APP",
        "identity_access" => "IAM",
        "organization" => "ORG",
        _ => GENERIC_PREFIX,
    }
}

/// Which id space an identifier belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// Fact ids (`F-`)
    Fact,
    /// Gap ids (`G-`)
    Gap,
}

impl IdKind {
    /// Leading letter of ids in this space
    pub fn letter(&self) -> &'static str {
        match self {
            IdKind::Fact => "F",
            IdKind::Gap => "G",
        }
    }

    /// Render an id in this space
    ///
    /// ```
    /// use dossier_domain::IdKind;
    ///
    /// assert_eq!(IdKind::Fact.format("INFRA", 7), "F-INFRA-007");
    /// assert_eq!(IdKind::Gap.format("NET", 1234), "G-NET-1234");
    /// ```
    pub fn format(&self, prefix: &str, sequence: u32) -> String {
        format!("{}-{}-{:03}", self.letter(), prefix, sequence)
    }
}

/// An id split into its components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId {
    /// Fact or gap space
    pub kind: IdKind,
    /// Domain prefix, e.g. `INFRA`
    pub prefix: String,
    /// Sequence number within the prefix
    pub sequence: u32,
}

impl ParsedId {
    /// Parse an id of the form `{F|G}-{PREFIX}-{NNN}`
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        let malformed = || DomainError::MalformedId(id.to_string());

        let (letter, rest) = id.split_once('-').ok_or_else(malformed)?;
        let kind = match letter {
            "F" => IdKind::Fact,
            "G" => IdKind::Gap,
            _ => return Err(malformed()),
        };

        let (prefix, seq) = rest.rsplit_once('-').ok_or_else(malformed)?;
        if prefix.is_empty() || seq.is_empty() || !seq.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        let sequence = seq.parse::<u32>().map_err(|_| malformed())?;

        Ok(Self {
            kind,
            prefix: prefix.to_string(),
            sequence,
        })
    }
}

impl fmt::Display for ParsedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind.format(&self.prefix, self.sequence))
    }
}
