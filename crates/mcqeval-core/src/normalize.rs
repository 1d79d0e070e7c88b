//! Split a raw table into an answer key and a response table.

use crate::error::AnalysisError;
use crate::model::{AnswerKey, ItemId, RawTable, Response, ResponseTable, StudentId};

/// The answer key together with the student responses it grades.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub key: AnswerKey,
    pub responses: ResponseTable,
}

/// Normalize a raw table: row 0 becomes the answer key, the remaining rows
/// become students, and missing or empty cells become [`Response::Blank`].
///
/// Without labels, items are named by column position (`"0"`, `"1"`, ...)
/// and students by row position (`"1"`, `"2"`, ... since the key is row 0).
/// A key row shorter than the table leaves the trailing items without a key
/// entry; grading reports that as [`AnalysisError::MissingKey`].
pub fn normalize(raw: &RawTable) -> Result<NormalizedTable, AnalysisError> {
    let (key_row, student_rows) = raw.rows.split_first().ok_or(AnalysisError::EmptyTable)?;
    if student_rows.is_empty() {
        return Err(AnalysisError::NoStudents);
    }

    let width = raw.width();
    let items: Vec<ItemId> = match &raw.item_labels {
        Some(labels) => labels.iter().map(|l| ItemId::new(l.as_str())).collect(),
        None => (0..width).map(|i| ItemId::new(i.to_string())).collect(),
    };

    let key = AnswerKey::new(
        items
            .iter()
            .zip(key_row)
            .map(|(item, cell)| (item.clone(), Response::from_cell(cell.as_deref()))),
    )?;

    let students: Vec<StudentId> = (1..raw.rows.len())
        .map(|row| {
            raw.row_labels
                .as_ref()
                .and_then(|labels| labels.get(row))
                .map(|label| StudentId::new(label.as_str()))
                .unwrap_or_else(|| StudentId::new(row.to_string()))
        })
        .collect();

    let rows = student_rows
        .iter()
        .map(|row| {
            row.iter()
                .take(width)
                .map(|cell| Response::from_cell(cell.as_deref()))
                .collect()
        })
        .collect();

    let responses = ResponseTable::new(items, students, rows)?;

    tracing::debug!(
        items = responses.n_items(),
        students = responses.n_students(),
        "normalized response table"
    );

    Ok(NormalizedTable { key, responses })
}
