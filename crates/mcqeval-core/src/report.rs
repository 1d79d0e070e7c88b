//! Analysis report envelope with JSON persistence and markdown rendering.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::distractors::choice_columns;
use crate::engine::Analysis;
use crate::levels::{DifficultyLevel, DiscriminationLevel};
use crate::scoring::Quartile;

/// A complete analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Where the responses came from.
    pub source: SourceSummary,
    /// Thresholds the levels were assigned with.
    pub config: AnalysisConfig,
    pub analysis: Analysis,
    /// Wall-clock duration of the analysis in milliseconds.
    pub duration_ms: u64,
}

/// Summary of the analyzed table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSummary {
    /// File name or other label of the input.
    pub name: String,
    pub students: usize,
    pub items: usize,
}

impl AnalysisReport {
    pub fn new(
        source: impl Into<String>,
        config: AnalysisConfig,
        analysis: Analysis,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source: SourceSummary {
                name: source.into(),
                students: analysis.students.len(),
                items: analysis.items.len(),
            },
            config,
            analysis,
            duration_ms,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AnalysisReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let a = &self.analysis;
        let mut md = String::new();

        let _ = writeln!(md, "# Item analysis: {}\n", self.source.name);
        let std_dev = a
            .summary
            .std_dev
            .map_or_else(|| "N/A".to_string(), |s| format!("{s:.2}"));
        let _ = writeln!(
            md,
            "**Summary:** {} students, {} items, mean score {:.2}, std dev {}, range {}-{}\n",
            self.source.students, self.source.items, a.summary.mean, std_dev, a.summary.min, a.summary.max
        );
        let _ = writeln!(
            md,
            "Thresholds: difficulty {}/{}, discrimination {}/{}\n",
            self.config.difficulty.low,
            self.config.difficulty.high,
            self.config.discrimination.fair,
            self.config.discrimination.good
        );

        if !a.diagnostics.is_empty() {
            md.push_str("## Warnings\n\n");
            for d in &a.diagnostics {
                let _ = writeln!(md, "- {d} ({})", d.hint());
            }
            md.push('\n');
        }

        md.push_str("## Student scores\n\n");
        md.push_str("| Student | Correct | Incorrect | Blank | Group |\n");
        md.push_str("|---------|---------|-----------|-------|-------|\n");
        for s in &a.scores {
            let group = match s.quartile {
                Some(Quartile::Upper) => "upper",
                Some(Quartile::Lower) => "lower",
                None => "",
            };
            let _ = writeln!(
                md,
                "| {} | {} | {} | {} | {} |",
                s.student, s.correct, s.incorrect, s.blank, group
            );
        }
        md.push('\n');

        let _ = writeln!(md, "## Quartile groups (size {})\n", a.quartiles.size);
        for (label, members) in [("Upper", &a.quartiles.upper), ("Lower", &a.quartiles.lower)] {
            let list = members
                .iter()
                .map(|m| format!("{} ({})", m.student, m.correct))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(md, "- **{label}:** {}", if list.is_empty() { "-" } else { &list });
        }
        md.push('\n');

        md.push_str("## Items\n\n");
        md.push_str("| Item | Key | Difficulty | Level | Discrimination | Level |\n");
        md.push_str("|------|-----|------------|-------|----------------|-------|\n");
        for s in &a.item_stats {
            let _ = writeln!(
                md,
                "| {} | {} | {}% | {} | {} | {} |",
                s.item,
                s.key,
                s.difficulty_pct,
                s.difficulty_level_label(),
                s.discrimination_label(),
                s.discrimination_level_label()
            );
        }
        md.push('\n');

        md.push_str("## Discrimination by difficulty\n\n");
        md.push_str("| | easy | medium | hard |\n");
        md.push_str("|---|---|---|---|\n");
        for discrimination in DiscriminationLevel::GRID_ORDER {
            let cells: Vec<String> = DifficultyLevel::GRID_ORDER
                .iter()
                .map(|&difficulty| a.cross_tab.label(discrimination, difficulty))
                .collect();
            let _ = writeln!(md, "| {discrimination} | {} |", cells.join(" | "));
        }
        md.push('\n');

        if !a.distractors.is_empty() {
            md.push_str("## Distractors\n\n");
            let columns = choice_columns(&a.distractors);
            let header: Vec<String> = columns.iter().map(ToString::to_string).collect();
            let _ = writeln!(md, "| Item | {} |", header.join(" | "));
            let _ = writeln!(md, "|------|{}", "---|".repeat(columns.len()));
            for d in &a.distractors {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|r| {
                        let count = d.count(r);
                        if r == &d.key {
                            format!("**{count}**")
                        } else {
                            count.to_string()
                        }
                    })
                    .collect();
                let _ = writeln!(md, "| {} | {} |", d.item, cells.join(" | "));
            }
            md.push('\n');

            md.push_str("### Upper vs lower group\n\n");
            md.push_str("| Item | Response | Upper | Lower |\n");
            md.push_str("|------|----------|-------|-------|\n");
            for d in &a.distractors {
                for c in &d.choices {
                    let response = if c.is_key {
                        format!("**{}**", c.response)
                    } else {
                        c.response.to_string()
                    };
                    let _ = writeln!(md, "| {} | {} | {} | {} |", d.item, response, c.upper, c.lower);
                }
            }
            md.push('\n');
        }

        if !a.failures.is_empty() {
            md.push_str("## Failed items\n\n");
            for f in &a.failures {
                let _ = writeln!(md, "- {}: {}", f.item, f.message);
            }
            md.push('\n');
        }

        md
    }
}
