//! CSV ingestion into a [`RawTable`].

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;

use mcqeval_core::model::RawTable;

/// How to interpret the first row and first column of the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// The first row holds item labels.
    pub header: bool,
    /// The first column holds row labels (key row included).
    pub index_col: bool,
}

pub fn load_csv(path: &Path, options: LoadOptions) -> Result<RawTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_csv(file, options).with_context(|| format!("failed to read CSV from {}", path.display()))
}

pub fn read_csv<R: Read>(input: R, options: LoadOptions) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut records: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.context("malformed CSV record")?;
        records.push(record.iter().map(str::to_string).collect());
    }

    let mut labels = if options.header && !records.is_empty() {
        let mut header = records.remove(0);
        if options.index_col && !header.is_empty() {
            header.remove(0);
        }
        Some(header)
    } else {
        None
    };

    let mut row_labels = options.index_col.then(Vec::new);
    let rows: Vec<Vec<Option<String>>> = records
        .into_iter()
        .map(|mut record| {
            if let Some(row_labels) = row_labels.as_mut() {
                let label = if record.is_empty() {
                    String::new()
                } else {
                    record.remove(0)
                };
                row_labels.push(label);
            }
            record
                .into_iter()
                .map(|cell| (!cell.is_empty()).then_some(cell))
                .collect()
        })
        .collect();

    // rows wider than the header get positional labels for the extra columns
    if let Some(labels) = labels.as_mut() {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for i in labels.len()..width {
            labels.push(i.to_string());
        }
    }

    tracing::debug!(rows = rows.len(), header = options.header, index_col = options.index_col, "loaded CSV");

    let mut raw = RawTable::new(rows);
    if let Some(labels) = labels {
        raw = raw.with_item_labels(labels);
    }
    if let Some(row_labels) = row_labels {
        raw = raw.with_row_labels(row_labels);
    }
    Ok(raw)
}
