//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS and charts inlined.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use mcqeval_core::distractors::{choice_columns, ItemDistractors};
use mcqeval_core::levels::{DifficultyLevel, DiscriminationLevel};
use mcqeval_core::report::AnalysisReport;
use mcqeval_core::scoring::{Quartile, ScoreSummary};

/// Escape a string for safe HTML insertion.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from an analysis report.
pub fn generate_html(report: &AnalysisReport) -> String {
    let a = &report.analysis;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(
        html,
        "<title>mcqeval report: {}</title>",
        html_escape(&report.source.name)
    );
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Item analysis</h1>\n");
    let _ = writeln!(
        html,
        "<p class=\"meta\">Source: <strong>{}</strong> | {} students | {} items | {}</p>",
        html_escape(&report.source.name),
        report.source.students,
        report.source.items,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        html,
        "<p class=\"meta\">Difficulty thresholds {}/{} | discrimination thresholds {}/{}</p>",
        report.config.difficulty.low,
        report.config.difficulty.high,
        report.config.discrimination.fair,
        report.config.discrimination.good
    );
    html.push_str("</header>\n");

    if !a.diagnostics.is_empty() {
        html.push_str("<section class=\"warnings\">\n<ul>\n");
        for d in &a.diagnostics {
            let _ = writeln!(
                html,
                "<li><strong>{}</strong>: {}</li>",
                html_escape(&d.to_string()),
                html_escape(d.hint())
            );
        }
        html.push_str("</ul>\n</section>\n");
    }

    // Score distribution
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Scores</h2>\n");
    let std_dev = a
        .summary
        .std_dev
        .map_or_else(|| "N/A".to_string(), |s| format!("{s:.2}"));
    let _ = writeln!(
        html,
        "<p>Mean {:.2} | std dev {} | min {} | max {}</p>",
        a.summary.mean, std_dev, a.summary.min, a.summary.max
    );
    html.push_str(&generate_histogram(&a.summary));

    let _ = writeln!(html, "<h3>Quartile groups (size {})</h3>", a.quartiles.size);
    html.push_str("<div class=\"groups\">\n");
    for (label, members) in [("Upper", &a.quartiles.upper), ("Lower", &a.quartiles.lower)] {
        let _ = writeln!(html, "<div><h4>{label}</h4><ol>");
        for m in members {
            let _ = writeln!(html, "<li>{} ({})</li>", html_escape(m.student.as_str()), m.correct);
        }
        html.push_str("</ol></div>\n");
    }
    html.push_str("</div>\n");

    html.push_str("<details>\n<summary>Student scores</summary>\n");
    html.push_str("<table class=\"scores\">\n");
    html.push_str("<thead><tr><th>Student</th><th>Correct</th><th>Incorrect</th><th>Blank</th><th>Group</th></tr></thead>\n<tbody>\n");
    for s in &a.scores {
        let (class, group) = match s.quartile {
            Some(Quartile::Upper) => ("upper", "upper"),
            Some(Quartile::Lower) => ("lower", "lower"),
            None => ("", ""),
        };
        let _ = writeln!(
            html,
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{group}</td></tr>",
            html_escape(s.student.as_str()),
            s.correct,
            s.incorrect,
            s.blank
        );
    }
    html.push_str("</tbody></table>\n</details>\n");
    html.push_str("</section>\n");

    // Items
    html.push_str("<section class=\"items\">\n");
    html.push_str("<h2>Items</h2>\n");
    html.push_str("<table class=\"items-table\" id=\"items\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Item</th><th onclick=\"sortTable(1)\">Key</th><th onclick=\"sortTable(2)\">Difficulty</th><th onclick=\"sortTable(3)\">Level</th><th onclick=\"sortTable(4)\">Discrimination</th><th onclick=\"sortTable(5)\">Level</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for s in &a.item_stats {
        let level_class = s.difficulty_level.map_or("na", difficulty_class);
        let di_class = s
            .discrimination_level
            .map_or("na", discrimination_class);
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}%</td><td class=\"{}\">{}</td><td>{}</td><td class=\"{}\">{}</td></tr>",
            html_escape(s.item.as_str()),
            html_escape(&s.key.to_string()),
            s.difficulty_pct,
            level_class,
            s.difficulty_level_label(),
            s.discrimination_label(),
            di_class,
            s.discrimination_level_label()
        );
    }
    html.push_str("</tbody></table>\n");

    html.push_str("<h3>Discrimination by difficulty</h3>\n");
    html.push_str("<table class=\"cross-tab\">\n<thead><tr><th></th>");
    for difficulty in DifficultyLevel::GRID_ORDER {
        let _ = write!(html, "<th>{difficulty}</th>");
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for discrimination in DiscriminationLevel::GRID_ORDER {
        let _ = write!(
            html,
            "<tr><th class=\"{}\">{discrimination}</th>",
            discrimination_class(discrimination)
        );
        for difficulty in DifficultyLevel::GRID_ORDER {
            let _ = write!(
                html,
                "<td>{}</td>",
                html_escape(&a.cross_tab.label(discrimination, difficulty))
            );
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Distractors
    if !a.distractors.is_empty() {
        html.push_str("<section class=\"distractors\">\n");
        html.push_str("<h2>Distractors</h2>\n");
        html.push_str(&distractor_table(&a.distractors));
        html.push_str("<h3>Upper vs lower group</h3>\n<div class=\"charts\">\n");
        for d in &a.distractors {
            html.push_str(&generate_group_chart(d));
        }
        html.push_str("</div>\n</section>\n");
    }

    if !a.failures.is_empty() {
        html.push_str("<section class=\"failures\">\n<h2>Failed items</h2>\n<ul>\n");
        for f in &a.failures {
            let _ = writeln!(
                html,
                "<li class=\"fail\">{}: {}</li>",
                html_escape(f.item.as_str()),
                html_escape(&f.message)
            );
        }
        html.push_str("</ul>\n</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn difficulty_class(level: DifficultyLevel) -> &'static str {
    match level {
        DifficultyLevel::Easy => "easy",
        DifficultyLevel::Medium => "medium",
        DifficultyLevel::Hard => "hard",
    }
}

fn discrimination_class(level: DiscriminationLevel) -> &'static str {
    match level {
        DiscriminationLevel::Good => "good",
        DiscriminationLevel::Fair => "fair",
        DiscriminationLevel::Poor => "poor",
    }
}

/// Items × responses count table, key counts in bold.
fn distractor_table(items: &[ItemDistractors]) -> String {
    let columns = choice_columns(items);
    let mut html = String::from("<table class=\"distractor-table\">\n<thead><tr><th>Item</th>");
    for c in &columns {
        let _ = write!(html, "<th>{}</th>", html_escape(&c.to_string()));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for d in items {
        let _ = write!(html, "<tr><td>{}</td>", html_escape(d.item.as_str()));
        for c in &columns {
            let count = d.count(c);
            if c == &d.key {
                let _ = write!(html, "<td class=\"key\"><strong>{count}</strong></td>");
            } else {
                let _ = write!(html, "<td>{count}</td>");
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody></table>\n");
    html
}

/// Vertical bars, one column per score from min to max.
fn generate_histogram(summary: &ScoreSummary) -> String {
    let bar_width = 28;
    let gap = 6;
    let max_height = 160;
    let label_height = 20;

    let peak = summary
        .histogram
        .iter()
        .map(|&(_, n)| n)
        .max()
        .unwrap_or(0)
        .max(1);
    let width = summary.histogram.len() * (bar_width + gap) + gap;
    let height = max_height + 2 * label_height;

    let mut svg = format!(
        "<svg class=\"histogram\" width=\"{width}\" height=\"{height}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
    );
    for (i, &(score, count)) in summary.histogram.iter().enumerate() {
        let x = gap + i * (bar_width + gap);
        let h = count * max_height / peak;
        let y = label_height + max_height - h;
        let _ = writeln!(
            svg,
            "  <rect x=\"{x}\" y=\"{y}\" width=\"{bar_width}\" height=\"{h}\" fill=\"#3b82f6\" rx=\"3\"/>"
        );
        if count > 0 {
            let _ = writeln!(
                svg,
                "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"middle\">{count}</text>",
                x + bar_width / 2,
                y - 4
            );
        }
        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" text-anchor=\"middle\">{score}</text>",
            x + bar_width / 2,
            height - 4
        );
    }
    svg.push_str("</svg>\n");
    svg
}

/// Paired horizontal bars per response: upper group above, lower below.
fn generate_group_chart(d: &ItemDistractors) -> String {
    let bar_height = 12;
    let row_height = 2 * bar_height + 10;
    let max_width = 200;
    let label_width = 80;
    let title_height = 22;

    let peak = d
        .choices
        .iter()
        .map(|c| c.upper.max(c.lower))
        .max()
        .unwrap_or(0)
        .max(1);
    let height = title_height + d.choices.len() * row_height;

    let mut svg = format!(
        "<svg class=\"group-chart\" width=\"{}\" height=\"{height}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 40
    );
    let title = match d.key_choice() {
        Some(k) => format!(
            "{} (key {}: upper {}, lower {})",
            d.item, k.response, k.upper, k.lower
        ),
        None => d.item.to_string(),
    };
    let _ = writeln!(
        svg,
        "  <text x=\"0\" y=\"14\" font-size=\"13\" font-weight=\"bold\" fill=\"currentColor\">{}</text>",
        html_escape(&title)
    );
    for (i, c) in d.choices.iter().enumerate() {
        let y = title_height + i * row_height;
        let weight = if c.is_key { "bold" } else { "normal" };
        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" font-weight=\"{weight}\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>",
            label_width - 8,
            y + bar_height,
            html_escape(&c.response.to_string())
        );
        for (j, (count, color)) in [(c.upper, "#22c55e"), (c.lower, "#ef4444")].into_iter().enumerate() {
            let by = y + j * bar_height;
            let w = count * max_width / peak;
            let _ = writeln!(
                svg,
                "  <rect x=\"{label_width}\" y=\"{by}\" width=\"{w}\" height=\"{}\" fill=\"{color}\" rx=\"2\"/>",
                bar_height - 2
            );
            let _ = writeln!(
                svg,
                "  <text x=\"{}\" y=\"{}\" font-size=\"10\" fill=\"currentColor\" dominant-baseline=\"middle\">{count}</text>",
                label_width + w + 4,
                by + bar_height / 2
            );
        }
    }
    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --good: #dcfce7; --fair: #fef9c3; --poor: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --good: #064e3b; --fair: #713f12; --poor: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.good, .easy, .upper { background: var(--good); }
.fair, .medium { background: var(--fair); }
.poor, .hard, .lower, .fail { background: var(--poor); }
.warnings { border-left: 4px solid #eab308; padding-left: 1rem; }
.groups, .charts { display: flex; flex-wrap: wrap; gap: 2rem; }
td.key { text-decoration: underline; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('items');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = !isNaN(na) && !isNaN(nb) ? na - nb : va.localeCompare(vb);
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
