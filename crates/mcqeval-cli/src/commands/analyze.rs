//! The `mcqeval analyze` command.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use mcqeval_core::config::{load_config_from, parse_difficulty, parse_discrimination, AnalysisConfig};
use mcqeval_core::distractors::choice_columns;
use mcqeval_core::engine::{Analysis, Analyzer, QuartileMember};
use mcqeval_core::levels::{DifficultyLevel, DiscriminationLevel};
use mcqeval_core::report::AnalysisReport;
use mcqeval_core::scoring::Quartile;
use mcqeval_report::html::write_html_report;

use crate::loader::{load_csv, LoadOptions};

const FORMATS: [&str; 4] = ["text", "json", "markdown", "html"];

#[allow(clippy::too_many_arguments)]
pub fn execute(
    input: PathBuf,
    header: bool,
    index_col: bool,
    difficulty: Option<String>,
    discrimination: Option<String>,
    config_path: Option<PathBuf>,
    format: String,
    output: PathBuf,
    strict: bool,
) -> Result<()> {
    let formats: Vec<&str> = if format == "all" {
        vec!["json", "markdown", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    };
    if let Some(unknown) = formats.iter().find(|f| !FORMATS.contains(f) && **f != "md") {
        anyhow::bail!("unknown format '{unknown}'; expected one of text, json, markdown, html, all");
    }

    let config = resolve_config(config_path.as_deref(), difficulty.as_deref(), discrimination.as_deref())?;
    let analyzer = Analyzer::new(config)?;

    let raw = load_csv(&input, LoadOptions { header, index_col })?;
    let start = Instant::now();
    let analysis = analyzer
        .analyze(&raw)
        .with_context(|| format!("cannot analyze {}", input.display()))?;
    let duration_ms = start.elapsed().as_millis() as u64;

    let source = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    let report = AnalysisReport::new(source, config, analysis, duration_ms);

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    for fmt in &formats {
        match *fmt {
            "text" => print_text(&report.analysis),
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "markdown" | "md" => {
                let path = output.join(format!("report-{timestamp}.md"));
                write_file(&path, &report.to_markdown())?;
                eprintln!("Markdown report: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            other => anyhow::bail!("unknown format '{other}'"),
        }
    }

    let analysis = &report.analysis;
    if !formats.contains(&"text") {
        print_warnings(analysis);
    }

    if strict && (!analysis.diagnostics.is_empty() || !analysis.failures.is_empty()) {
        anyhow::bail!(
            "strict mode: {} warning(s), {} failed item(s)",
            analysis.diagnostics.len(),
            analysis.failures.len()
        );
    }

    Ok(())
}

/// File config, then environment, then command-line flags.
fn resolve_config(
    path: Option<&Path>,
    difficulty: Option<&str>,
    discrimination: Option<&str>,
) -> Result<AnalysisConfig> {
    let mut config = load_config_from(path)?;
    if let Some(d) = difficulty {
        config.difficulty = parse_difficulty(d).context("--difficulty")?;
    }
    if let Some(d) = discrimination {
        config.discrimination = parse_discrimination(d).context("--discrimination")?;
    }
    config.validate()?;
    Ok(config)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn print_warnings(analysis: &Analysis) {
    for d in &analysis.diagnostics {
        eprintln!("Warning: {d} ({})", d.hint());
    }
    for f in &analysis.failures {
        eprintln!("Item {} skipped: {}", f.item, f.message);
    }
}

fn print_text(analysis: &Analysis) {
    let summary = &analysis.summary;
    let std_dev = summary
        .std_dev
        .map_or_else(|| "N/A".to_string(), |s| format!("{s:.2}"));
    println!(
        "{} students, {} items | mean {:.2} | std dev {} | range {}-{}",
        summary.students, summary.items, summary.mean, std_dev, summary.min, summary.max
    );

    let mut scores = Table::new();
    scores.set_header(vec!["Student", "Correct", "Incorrect", "Blank", "Group"]);
    for s in &analysis.scores {
        let group = match s.quartile {
            Some(Quartile::Upper) => "upper",
            Some(Quartile::Lower) => "lower",
            None => "",
        };
        scores.add_row(vec![
            Cell::new(&s.student),
            Cell::new(s.correct),
            Cell::new(s.incorrect),
            Cell::new(s.blank),
            Cell::new(group),
        ]);
    }
    println!("\nStudent scores\n{scores}");

    let q = &analysis.quartiles;
    let ids = |members: &[QuartileMember]| {
        if members.is_empty() {
            "-".to_string()
        } else {
            members
                .iter()
                .map(|m| m.student.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    };
    println!("\nQuartile groups (size {})", q.size);
    println!("  upper: {}", ids(&q.upper));
    println!("  lower: {}", ids(&q.lower));

    let mut items = Table::new();
    items.set_header(vec!["Item", "Key", "Difficulty", "Level", "Discrimination", "Level"]);
    for s in &analysis.item_stats {
        items.add_row(vec![
            Cell::new(&s.item),
            Cell::new(&s.key),
            Cell::new(format!("{}%", s.difficulty_pct)),
            Cell::new(s.difficulty_level_label()),
            Cell::new(s.discrimination_label()),
            Cell::new(s.discrimination_level_label()),
        ]);
    }
    println!("\nItems\n{items}");

    let mut grid = Table::new();
    let mut grid_header = vec![String::new()];
    grid_header.extend(DifficultyLevel::GRID_ORDER.iter().map(ToString::to_string));
    grid.set_header(grid_header);
    for discrimination in DiscriminationLevel::GRID_ORDER {
        let mut row = vec![Cell::new(discrimination)];
        row.extend(
            DifficultyLevel::GRID_ORDER
                .iter()
                .map(|&difficulty| Cell::new(analysis.cross_tab.label(discrimination, difficulty))),
        );
        grid.add_row(row);
    }
    println!("\nDiscrimination by difficulty\n{grid}");

    if !analysis.distractors.is_empty() {
        let columns = choice_columns(&analysis.distractors);
        let mut table = Table::new();
        let mut distractor_header = vec!["Item".to_string()];
        distractor_header.extend(columns.iter().map(ToString::to_string));
        table.set_header(distractor_header);
        for d in &analysis.distractors {
            let mut row = vec![Cell::new(&d.item)];
            row.extend(columns.iter().map(|r| {
                let count = d.count(r);
                if r == &d.key {
                    Cell::new(format!("{count}*"))
                } else {
                    Cell::new(count)
                }
            }));
            table.add_row(row);
        }
        println!("\nDistractors (* = key)\n{table}");
    }

    print_warnings(analysis);
}
