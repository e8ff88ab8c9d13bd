//! Bounded text projection of one partition for downstream reasoning
//!
//! Prompt assembly treats the output as an opaque block of context, so the
//! layout is stable: header, facts grouped by category, gaps, and finally an
//! optional one-line note when the other party has facts in the same domain.

use dossier_domain::{fact::value_to_string, Entity, Fact, Gap};
use indexmap::IndexMap;

/// Marker appended to truncated evidence quotes
pub const ELLIPSIS: &str = "...";

/// Shorten `text` to at most `max_chars` characters plus [`ELLIPSIS`]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

fn flatten_details(fact: &Fact) -> String {
    fact.details
        .iter()
        .map(|(key, value)| format!("{}={}", key, value_to_string(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render one partition of one domain
///
/// `buyer_fact_count` is only consulted for the target partition; the buyer
/// content itself never enters the target projection.
pub(crate) fn render(
    domain: &str,
    entity: Entity,
    facts: &[&Fact],
    gaps: &[&Gap],
    buyer_fact_count: usize,
    evidence_chars: usize,
) -> String {
    let mut out = format!(
        "## {} ({})\nFacts: {} | Gaps: {}\n",
        domain.to_uppercase(),
        entity.as_str().to_uppercase(),
        facts.len(),
        gaps.len()
    );

    if facts.is_empty() {
        out.push_str("\nNo facts recorded.\n");
    }

    let mut by_category: IndexMap<&str, Vec<&Fact>> = IndexMap::new();
    for fact in facts {
        by_category.entry(fact.category.as_str()).or_default().push(*fact);
    }

    for (category, facts) in &by_category {
        out.push_str(&format!("\n### {}\n", category));
        for fact in facts {
            out.push_str(&format!("- [{}] {}", fact.id, fact.item));
            let details = flatten_details(fact);
            if !details.is_empty() {
                out.push_str(&format!(" | {}", details));
            }
            out.push_str(&format!(" | status: {} | entity: {}\n", fact.status, fact.entity));
            if fact.evidence.has_quote() {
                out.push_str(&format!(
                    "  Evidence: \"{}\"\n",
                    truncate_chars(&fact.evidence.exact_quote, evidence_chars)
                ));
            }
        }
    }

    if !gaps.is_empty() {
        out.push_str("\n### GAPS\n");
        for gap in gaps {
            out.push_str(&format!(
                "- [{}] {} ({}): {}\n",
                gap.id, gap.category, gap.importance, gap.description
            ));
        }
    }

    if entity == Entity::Target && buyer_fact_count > 0 {
        out.push_str(&format!(
            "\nNOTE: Buyer context exists for {} ({} facts). Use the entity comparison to assess overlap.\n",
            domain, buyer_fact_count
        ));
    }

    out
}
