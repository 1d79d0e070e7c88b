//! Core data model types for mcqeval.
//!
//! Item and student identifiers are shared newtypes so the answer key, the
//! response table and every derived structure agree on what a column or row
//! is called. Alignment is checked when tables are built, not assumed from
//! positions.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Identifier of a test item (a table column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

/// Identifier of a student (a table row).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(ItemId);
string_id!(StudentId);

/// A single response cell.
///
/// `Blank` is a variant rather than a reserved token, so no real answer can
/// collide with it. The derived ordering sorts answers by token (byte order,
/// case-sensitive) and places `Blank` after every answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Response {
    Answer(String),
    Blank,
}

impl Response {
    /// Normalize a raw cell: missing, empty and whitespace-only cells are blank.
    /// Anything else is kept verbatim.
    pub fn from_cell(cell: Option<&str>) -> Self {
        match cell {
            Some(s) if !s.trim().is_empty() => Response::Answer(s.to_string()),
            _ => Response::Blank,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Response::Blank)
    }

    /// The answer token, or `None` for a blank.
    pub fn token(&self) -> Option<&str> {
        match self {
            Response::Answer(s) => Some(s),
            Response::Blank => None,
        }
    }

    /// Whether this response earns credit against `key`. Blanks never match,
    /// not even a blank key.
    pub fn matches(&self, key: &Response) -> bool {
        match (self, key) {
            (Response::Answer(a), Response::Answer(k)) => a == k,
            _ => false,
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Answer(s) => f.write_str(s),
            Response::Blank => f.write_str("(blank)"),
        }
    }
}

impl From<Option<String>> for Response {
    fn from(cell: Option<String>) -> Self {
        Response::from_cell(cell.as_deref())
    }
}

impl From<Response> for Option<String> {
    fn from(response: Response) -> Self {
        match response {
            Response::Answer(s) => Some(s),
            Response::Blank => None,
        }
    }
}

impl From<&str> for Response {
    fn from(s: &str) -> Self {
        Response::from_cell(Some(s))
    }
}

/// A table as handed over by ingestion: row 0 is the answer key, rows 1..
/// are students. Header rows and index columns have already been split off
/// into the optional label vectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column labels, one per item.
    pub item_labels: Option<Vec<String>>,
    /// Row labels, one per row including the key row.
    pub row_labels: Option<Vec<String>>,
    /// Cell values; `None` marks a missing cell.
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self {
            item_labels: None,
            row_labels: None,
            rows,
        }
    }

    /// Build a table where every cell is present. Empty strings still
    /// normalize to blanks.
    pub fn from_cells<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| Some(cell.as_ref().to_string()))
                        .collect()
                })
                .collect(),
        )
    }

    pub fn with_item_labels(mut self, labels: Vec<String>) -> Self {
        self.item_labels = Some(labels);
        self
    }

    pub fn with_row_labels(mut self, labels: Vec<String>) -> Self {
        self.row_labels = Some(labels);
        self
    }

    /// Number of item columns: the label count if labels are present,
    /// otherwise the widest row.
    pub fn width(&self) -> usize {
        match &self.item_labels {
            Some(labels) => labels.len(),
            None => self.rows.iter().map(Vec::len).max().unwrap_or(0),
        }
    }
}

/// Mapping from item to its correct response, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerKey {
    entries: Vec<(ItemId, Response)>,
    index: HashMap<ItemId, usize>,
}

impl AnswerKey {
    pub fn new(entries: impl IntoIterator<Item = (ItemId, Response)>) -> Result<Self, AnalysisError> {
        let entries: Vec<_> = entries.into_iter().collect();
        let mut index = HashMap::with_capacity(entries.len());
        for (pos, (item, _)) in entries.iter().enumerate() {
            if index.insert(item.clone(), pos).is_some() {
                return Err(AnalysisError::DuplicateItem(item.clone()));
            }
        }
        Ok(Self { entries, index })
    }

    pub fn get(&self, item: &ItemId) -> Option<&Response> {
        self.index.get(item).map(|&pos| &self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &Response)> {
        self.entries.iter().map(|(item, key)| (item, key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Student responses, rows = students and columns = items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTable {
    items: Vec<ItemId>,
    students: Vec<StudentId>,
    // row-major, students.len() * items.len()
    cells: Vec<Response>,
}

impl ResponseTable {
    /// Build a table from per-student rows. Short rows are padded with
    /// blanks and cells past the last item are dropped.
    pub fn new(
        items: Vec<ItemId>,
        students: Vec<StudentId>,
        rows: Vec<Vec<Response>>,
    ) -> Result<Self, AnalysisError> {
        check_unique(&items, |id| AnalysisError::DuplicateItem(id.clone()))?;
        check_unique(&students, |id| AnalysisError::DuplicateStudent(id.clone()))?;

        let width = items.len();
        let mut cells = Vec::with_capacity(students.len() * width);
        let mut rows = rows.into_iter();
        for _ in &students {
            let mut row = rows.next().unwrap_or_default();
            row.resize(width, Response::Blank);
            cells.extend(row);
        }

        Ok(Self {
            items,
            students,
            cells,
        })
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn students(&self) -> &[StudentId] {
        &self.students
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn n_students(&self) -> usize {
        self.students.len()
    }

    pub fn response(&self, student: usize, item: usize) -> &Response {
        &self.cells[student * self.items.len() + item]
    }

    pub fn row(&self, student: usize) -> &[Response] {
        let width = self.items.len();
        &self.cells[student * width..(student + 1) * width]
    }

    pub fn column(&self, item: usize) -> impl Iterator<Item = &Response> + '_ {
        (0..self.students.len()).map(move |s| self.response(s, item))
    }
}

fn check_unique<T, F>(ids: &[T], err: F) -> Result<(), AnalysisError>
where
    T: Eq + std::hash::Hash,
    F: Fn(&T) -> AnalysisError,
{
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id) {
            return Err(err(id));
        }
    }
    Ok(())
}
