//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use dossier_domain::fact::value_to_string;
use dossier_domain::{Entity, Fact, Gap};
use dossier_merge::{Conflict, MergeDecision, MergeResult};
use dossier_store::{CitationReport, ComparisonReport, EntityLockState, RegistryStats};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format facts.
    pub fn format_facts(&self, facts: &[Fact]) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(facts),
            OutputFormat::Quiet => Ok(join_ids(facts.iter().map(|f| f.id.as_str()))),
            OutputFormat::Table => {
                if facts.is_empty() {
                    return Ok(self.colorize("No facts found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record([
                    "ID", "Entity", "Domain", "Category", "Item", "Details", "Status", "Review", "Confidence",
                    "Source",
                ]);
                for fact in facts {
                    let details = fact
                        .details
                        .iter()
                        .map(|(k, v)| format!("{}={}", k, value_to_string(v)))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let review = if fact.removed {
                        "removed".to_string()
                    } else {
                        fact.verification_status.to_string()
                    };
                    builder.push_record([
                        fact.id.clone(),
                        fact.entity.to_string(),
                        fact.domain.clone(),
                        fact.category.clone(),
                        fact.item.clone(),
                        details,
                        fact.status.to_string(),
                        review,
                        format!("{:.2}", fact.confidence_score),
                        fact.source_document.clone(),
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format gaps.
    pub fn format_gaps(&self, gaps: &[Gap]) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(gaps),
            OutputFormat::Quiet => Ok(join_ids(gaps.iter().map(|g| g.id.as_str()))),
            OutputFormat::Table => {
                if gaps.is_empty() {
                    return Ok(self.colorize("No gaps found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Domain", "Category", "Importance", "Entity", "Description"]);
                for gap in gaps {
                    builder.push_record([
                        gap.id.clone(),
                        gap.domain.clone(),
                        gap.category.clone(),
                        gap.importance.to_string(),
                        gap.entity.map(|e| e.to_string()).unwrap_or_default(),
                        gap.description.clone(),
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format registry statistics and lock states.
    pub fn format_summary(&self, stats: &RegistryStats, locks: &[(Entity, EntityLockState)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let locks: Vec<_> = locks
                    .iter()
                    .map(|(entity, state)| serde_json::json!({ "entity": entity, "state": state }))
                    .collect();
                to_json(&serde_json::json!({ "stats": stats, "locks": locks }))
            }
            OutputFormat::Quiet => Ok(format!("{} {}", stats.total_facts, stats.total_gaps)),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Metric", "Value"]);
                builder.push_record(["Facts".to_string(), stats.total_facts.to_string()]);
                builder.push_record(["Removed".to_string(), stats.removed_facts.to_string()]);
                builder.push_record(["Confirmed".to_string(), stats.confirmed_facts.to_string()]);
                builder.push_record(["Gaps".to_string(), stats.total_gaps.to_string()]);
                for (entity, count) in &stats.by_entity {
                    builder.push_record([format!("Entity: {}", entity), count.to_string()]);
                }
                for (domain, count) in &stats.by_domain {
                    builder.push_record([format!("Domain: {}", domain), count.to_string()]);
                }
                for (status, count) in &stats.by_status {
                    builder.push_record([format!("Status: {}", status), count.to_string()]);
                }
                for (importance, count) in &stats.gaps_by_importance {
                    builder.push_record([format!("Gaps: {}", importance), count.to_string()]);
                }

                let mut out = render(builder);
                for (entity, state) in locks {
                    out.push('\n');
                    if state.complete {
                        let when = state
                            .completed_at
                            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                            .unwrap_or_default();
                        out.push_str(&self.warning(&format!("{} locked {}", entity, when)));
                    } else {
                        out.push_str(&self.info(&format!("{} open", entity)));
                    }
                }
                Ok(out)
            }
        }
    }

    /// Format a cross-entity comparison.
    pub fn format_comparison(&self, report: &ComparisonReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report),
            OutputFormat::Quiet => Ok(report.summary()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Result", "Category", "Item", report.entity_a.as_str(), report.entity_b.as_str()]);
                for item in &report.only_a {
                    builder.push_record([
                        format!("{} only", report.entity_a),
                        item.category.clone(),
                        item.item.clone(),
                        item.fact_id.clone(),
                        String::new(),
                    ]);
                }
                for item in &report.only_b {
                    builder.push_record([
                        format!("{} only", report.entity_b),
                        item.category.clone(),
                        item.item.clone(),
                        String::new(),
                        item.fact_id.clone(),
                    ]);
                }
                for item in &report.shared {
                    builder.push_record([
                        "shared".to_string(),
                        item.category.clone(),
                        item.item.clone(),
                        item.a_id.clone(),
                        item.b_id.clone(),
                    ]);
                }
                for conflict in &report.conflicts {
                    builder.push_record([
                        self.colorize("vendor mismatch", "red"),
                        conflict.category.clone(),
                        conflict.item.clone(),
                        format!("{} ({})", conflict.a_id, conflict.a_vendor),
                        format!("{} ({})", conflict.b_id, conflict.b_vendor),
                    ]);
                }
                Ok(format!("{}\n{}", render(builder), self.info(&report.summary())))
            }
        }
    }

    /// Format the outcome of a merge batch.
    pub fn format_merge_result(&self, result: &MergeResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(result),
            OutputFormat::Quiet => Ok(join_ids(result.added.iter().map(String::as_str))),
            OutputFormat::Table => {
                let mut lines = vec![self.success(&result.summary())];
                for failed in &result.failed {
                    lines.push(self.error(&format!("{}: {}", failed.item, failed.reason)));
                }
                if !result.conflicts.is_empty() {
                    lines.push(self.warning(&format!(
                        "{} conflict(s) need review; run 'dossier conflicts'",
                        result.conflicts.len()
                    )));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format dry-run decisions, one per candidate item.
    pub fn format_decisions(&self, decisions: &[(String, MergeDecision)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<_> = decisions
                    .iter()
                    .map(|(item, d)| {
                        serde_json::json!({
                            "item": item,
                            "action": d.action,
                            "existing_id": d.existing_id,
                            "score": d.score,
                            "conflict": d.conflict,
                        })
                    })
                    .collect();
                to_json(&rows)
            }
            OutputFormat::Quiet => Ok(decisions
                .iter()
                .map(|(_, d)| d.action.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if decisions.is_empty() {
                    return Ok(self.colorize("No candidates.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Item", "Action", "Matched", "Score", "Fields"]);
                for (item, decision) in decisions {
                    let fields = decision
                        .conflict
                        .as_ref()
                        .map(|c| c.field_conflicts.keys().cloned().collect::<Vec<_>>().join(", "))
                        .unwrap_or_default();
                    builder.push_record([
                        item.clone(),
                        decision.action.to_string(),
                        decision.existing_id.clone().unwrap_or_default(),
                        format!("{:.3}", decision.score),
                        fields,
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format conflicts.
    pub fn format_conflicts(&self, conflicts: &[&Conflict]) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(&conflicts),
            OutputFormat::Quiet => Ok(join_ids(conflicts.iter().map(|c| c.id.as_str()))),
            OutputFormat::Table => {
                if conflicts.is_empty() {
                    return Ok(self.colorize("No conflicts found.", "green"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Fact", "Type", "Field", "Existing", "Incoming", "Source", "Resolution"]);
                for conflict in conflicts {
                    for (field, (old, new)) in &conflict.field_conflicts {
                        builder.push_record([
                            conflict.id.clone(),
                            conflict.fact_id.clone(),
                            conflict.conflict_type.to_string(),
                            field.clone(),
                            value_to_string(old),
                            value_to_string(new),
                            conflict.source_document.clone(),
                            conflict.resolution.to_string(),
                        ]);
                    }
                }
                Ok(render(builder))
            }
        }
    }

    /// Format a citation check.
    pub fn format_citations(&self, report: &CitationReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report),
            OutputFormat::Quiet => Ok(report.invalid.join("\n")),
            OutputFormat::Table => {
                let rate = format!(
                    "{} valid, {} invalid ({:.0}%)",
                    report.valid.len(),
                    report.invalid.len(),
                    report.validation_rate * 100.0
                );
                let mut lines = vec![if report.all_valid() {
                    self.success(&rate)
                } else {
                    self.warning(&rate)
                }];
                for id in &report.invalid {
                    lines.push(self.error(&format!("Unknown id: {}", id)));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn join_ids<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    ids.collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dossier_domain::NewFact;

    fn fact() -> Fact {
        NewFact::new("network", "wan", "MPLS backbone", Entity::Target)
            .with_detail("vendor", "Lumen")
            .from_document("network.pdf")
            .into_fact("F-NET-001".to_string(), Utc::now())
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_facts(&[fact()]).unwrap();
        assert!(output.contains("F-NET-001"));
        assert!(output.contains("vendor=Lumen"));
        assert!(output.contains("Confidence"));
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_facts(&[fact()]).unwrap();
        let parsed: Vec<Fact> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0].id, "F-NET-001");
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_facts(&[fact(), fact()]).unwrap();
        assert_eq!(output, "F-NET-001\nF-NET-001");
    }

    #[test]
    fn test_empty_facts() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_facts(&[]).unwrap();
        assert!(output.contains("No facts found"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("saved"), "✓ saved");
        assert_eq!(formatter.warning("locked"), "⚠ locked");
    }
}
