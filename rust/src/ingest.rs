//! CSV ingestion and header mapping.
//!
//! Headers are resolved once into a [`ColumnMap`]; every row is then read
//! positionally into an [`ActivityRecord`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;

use crate::error::CpmError;
use crate::models::{
    ActivityRecord, FIELD_DESCRIPTION, FIELD_DURATION, FIELD_ID, FIELD_PREDECESSORS,
};

/// Errors raised while reading tabular input.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Schema(#[from] CpmError),
}

/// Positions of the schema fields among the input columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    id: usize,
    description: usize,
    duration: usize,
    /// `None` when the input has no predecessors column.
    predecessors: Option<usize>,
    width: usize,
}

impl ColumnMap {
    /// Resolve header names, trimmed and matched case-insensitively.
    ///
    /// The first column matching a field wins. `predecessors` may be absent,
    /// in which case every activity has no predecessors.
    pub fn from_headers<'a, I>(headers: I) -> Result<Self, CpmError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let position = |field: &str| names.iter().position(|name| name == field);
        let required =
            |field: &str| position(field).ok_or_else(|| CpmError::missing_field(field));

        Ok(Self {
            id: required(FIELD_ID)?,
            description: required(FIELD_DESCRIPTION)?,
            duration: required(FIELD_DURATION)?,
            predecessors: position(FIELD_PREDECESSORS),
            width: names.len(),
        })
    }

    /// Map one CSV row onto the schema.
    ///
    /// Missing trailing cells read as empty. When the predecessors column is
    /// the last one, cells past the header width are unquoted continuations of
    /// the predecessor list and are joined back with commas.
    pub fn record(&self, row: &StringRecord) -> ActivityRecord {
        let cell = |idx: usize| row.get(idx).unwrap_or_default().to_string();

        let predecessors = match self.predecessors {
            Some(idx) if idx + 1 == self.width && row.len() > self.width => row
                .iter()
                .skip(idx)
                .collect::<Vec<_>>()
                .join(","),
            Some(idx) => cell(idx),
            None => String::new(),
        };

        ActivityRecord {
            id: cell(self.id),
            description: cell(self.description),
            duration: cell(self.duration),
            predecessors,
        }
    }
}

/// Read activity records from CSV text with a header row.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ActivityRecord>, IngestError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(csv_reader.headers()?.iter())?;

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        records.push(columns.record(&row));
    }
    Ok(records)
}

/// Read activity records from a CSV file.
pub fn read_records_from_path(path: &Path) -> Result<Vec<ActivityRecord>, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.display().to_string(),
        source,
    })?;
    read_records(file)
}
