//! Recoverable warnings about the input.
//!
//! None of these stop the analysis. They are heuristics the caller should
//! show the user, each with a hint on how to fix the input.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{RawTable, Response};
use crate::scoring::StudentScore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Fewer than four students: the quartile groups are empty and
    /// discrimination is undefined.
    TooFewStudents { students: usize },
    /// Every student scored zero.
    AllScoresZero,
    /// Every cell of the key row is distinct, as in a row of column labels.
    FirstRowLooksLikeHeader,
    /// Every cell of the first column is distinct, as in a column of ids.
    FirstColumnLooksLikeIndex,
}

impl Diagnostic {
    /// What the user can do about it.
    pub fn hint(&self) -> &'static str {
        match self {
            Diagnostic::TooFewStudents { .. } => {
                "discrimination needs at least 4 students; it is reported as N/A"
            }
            Diagnostic::AllScoresZero => {
                "possibly malformed table; check whether the first row holds column labels"
            }
            Diagnostic::FirstRowLooksLikeHeader => "try using the first row as column labels",
            Diagnostic::FirstColumnLooksLikeIndex => "try using the first column as the index",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::TooFewStudents { students } => {
                write!(f, "only {students} student(s); quartile groups are empty")
            }
            Diagnostic::AllScoresZero => write!(f, "every student scored zero"),
            Diagnostic::FirstRowLooksLikeHeader => {
                write!(f, "first row appears to contain column labels")
            }
            Diagnostic::FirstColumnLooksLikeIndex => {
                write!(f, "first column appears to be an index")
            }
        }
    }
}

/// Shape heuristics on the raw table. Only checked for the side that has
/// no labels yet: a table already split into labels gets no header hint.
pub fn table_diagnostics(raw: &RawTable) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if raw.item_labels.is_none() {
        if let Some(key_row) = raw.rows.first() {
            let width = raw.width();
            let cells = (0..width).map(|i| key_row.get(i).and_then(|c| c.as_deref()));
            if width >= 2 && all_distinct(cells) {
                diagnostics.push(Diagnostic::FirstRowLooksLikeHeader);
            }
        }
    }

    if raw.row_labels.is_none() && raw.rows.len() >= 2 {
        let cells = raw
            .rows
            .iter()
            .map(|row| row.first().and_then(|c| c.as_deref()));
        if all_distinct(cells) {
            diagnostics.push(Diagnostic::FirstColumnLooksLikeIndex);
        }
    }

    diagnostics
}

/// Warnings derived from the scores.
pub fn score_diagnostics(scores: &[StudentScore]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if scores.len() < 4 {
        diagnostics.push(Diagnostic::TooFewStudents {
            students: scores.len(),
        });
    }
    if !scores.is_empty() && scores.iter().all(|s| s.correct == 0) {
        diagnostics.push(Diagnostic::AllScoresZero);
    }
    diagnostics
}

fn all_distinct<'a>(cells: impl Iterator<Item = Option<&'a str>>) -> bool {
    let mut seen = HashSet::new();
    // blanks compare equal to each other
    cells.map(Response::from_cell).all(|cell| seen.insert(cell))
}
