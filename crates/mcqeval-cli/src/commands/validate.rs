//! The `mcqeval validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use mcqeval_core::config::AnalysisConfig;
use mcqeval_core::engine::analyze;

use crate::loader::{load_csv, LoadOptions};

/// Diagnostics and key checks are threshold-independent, so the default
/// config is enough.
pub fn execute(input: PathBuf, header: bool, index_col: bool) -> Result<()> {
    let raw = load_csv(&input, LoadOptions { header, index_col })?;
    let analysis = analyze(&raw, &AnalysisConfig::default())
        .with_context(|| format!("{} is not a valid response table", input.display()))?;

    println!(
        "{}: {} students, {} items",
        input.display(),
        analysis.students.len(),
        analysis.items.len()
    );

    for d in &analysis.diagnostics {
        println!("  WARNING: {d}");
        println!("    hint: {}", d.hint());
    }
    for f in &analysis.failures {
        println!("  [{}] ERROR: {}", f.item, f.message);
    }

    let total = analysis.diagnostics.len() + analysis.failures.len();
    if total == 0 {
        println!("Table valid.");
    } else {
        println!("\n{total} issue(s) found.");
    }

    Ok(())
}
