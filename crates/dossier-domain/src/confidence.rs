//! Derived confidence score for facts
//!
//! A deterministic score in `[0.0, 1.0]` computed from documentation status,
//! evidence quality and human verification. It is derived data: every write
//! path that touches a fact recomputes it through [`Fact::refresh_confidence`].
//!
//! [`Fact::refresh_confidence`]: crate::Fact::refresh_confidence

use crate::{Evidence, FactStatus, VerificationStatus};

/// Base score for a fully documented fact
pub const DOCUMENTED_BASE: f64 = 0.6;

/// Base score for a partially documented fact
pub const PARTIAL_BASE: f64 = 0.4;

/// Base score for a fact that is itself a documentation gap
pub const GAP_BASE: f64 = 0.2;

/// Quotes shorter than this count as weak evidence
pub const MIN_STRONG_QUOTE_CHARS: usize = 20;

/// Compute the confidence score for a fact's current content
///
/// Steps:
/// 1. Base score from status
/// 2. Evidence boost: +0.1 for any quote, +0.1 more for a substantive quote
/// 3. Source section boost: +0.1 when the quote is anchored to a section
/// 4. Confirmed facts are floored at 0.9
pub fn compute_confidence(
    status: FactStatus,
    evidence: &Evidence,
    verification: VerificationStatus,
) -> f64 {
    let mut score = match status {
        FactStatus::Documented => DOCUMENTED_BASE,
        FactStatus::Partial => PARTIAL_BASE,
        FactStatus::Gap => GAP_BASE,
    };

    let quote = evidence.exact_quote.trim();
    if !quote.is_empty() {
        score += 0.1;
        if quote.chars().count() >= MIN_STRONG_QUOTE_CHARS {
            score += 0.1;
        }
        if !evidence.source_section.trim().is_empty() {
            score += 0.1;
        }
    }

    if verification == VerificationStatus::Confirmed {
        score = score.max(0.9);
    }

    score.clamp(0.0, 1.0)
}
