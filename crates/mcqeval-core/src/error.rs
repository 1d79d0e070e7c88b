//! Analysis error types.
//!
//! `AnalysisError` covers data-integrity failures: conditions under which the
//! pipeline (or one item's part of it) cannot produce a meaningful result.
//! Recoverable oddities in the input are reported as
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.

use thiserror::Error;

use crate::model::{ItemId, StudentId};

/// Errors that stop an analysis pass or one item's computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The thresholds are out of range or out of order.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The raw table has no rows at all, so there is no answer key.
    #[error("table is empty: the first row must hold the answer key")]
    EmptyTable,

    /// The table has a key row but no student rows.
    #[error("table has an answer key but no student responses")]
    NoStudents,

    /// Two columns share the same item identifier.
    #[error("duplicate item identifier: {0}")]
    DuplicateItem(ItemId),

    /// Two rows share the same student identifier.
    #[error("duplicate student identifier: {0}")]
    DuplicateStudent(StudentId),

    /// An item column exists in the response table but not in the key.
    #[error("item {item} has no entry in the answer key")]
    MissingKey { item: ItemId },

    /// The key value for an item is blank or matches none of the item's
    /// responses, usually a header row left in the data.
    #[error("key for item {item} is blank or matches no response; cannot mark the correct response")]
    KeyNotFound { item: ItemId },
}

impl AnalysisError {
    /// Returns `true` if the error only affects a single item and the rest of
    /// the analysis can proceed.
    pub fn is_item_scoped(&self) -> bool {
        matches!(self, AnalysisError::KeyNotFound { .. })
    }

    /// The item this error refers to, if any.
    pub fn item(&self) -> Option<&ItemId> {
        match self {
            AnalysisError::DuplicateItem(item)
            | AnalysisError::MissingKey { item }
            | AnalysisError::KeyNotFound { item } => Some(item),
            _ => None,
        }
    }
}

/// Invalid threshold configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("difficulty thresholds must satisfy 5 <= low < high <= 95, got ({low}, {high})")]
    InvalidDifficulty { low: u32, high: u32 },

    #[error("discrimination thresholds must satisfy 0.1 <= fair < good <= 0.9, got ({fair}, {good})")]
    InvalidDiscrimination { fair: f64, good: f64 },
}
