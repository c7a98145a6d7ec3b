// Copyright (C) 2026 dialnorm maintainers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Input parsing for `catalog,pattern` record files.
//!
//! The files come out of PBX export tooling: two columns, no header row,
//! often saved with a UTF-8 byte-order mark by spreadsheet editors.

use std::{fs, path::Path};

use csv::{ReaderBuilder, Trim};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("record on line {line} has no pattern column")]
    MissingPattern { line: u64 },
}

/// Reads `(catalog, pattern)` records from a delimited file, stripping a
/// leading UTF-8 BOM if present.
pub fn read_records_from_path(
    path: &Path,
    delimiter: u8,
) -> Result<Vec<(String, String)>, RecordError> {
    let data = fs::read_to_string(path)?;
    parse_records(data.strip_prefix('\u{feff}').unwrap_or(&data), delimiter)
}

/// Parses `(catalog, pattern)` records from two-column delimited text with
/// no header row. Fields are trimmed; blank lines are skipped; extra
/// columns are ignored.
pub fn parse_records(data: &str, delimiter: u8) -> Result<Vec<(String, String)>, RecordError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(data.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let catalog = record
            .get(0)
            .ok_or(RecordError::MissingPattern { line })?;
        let pattern = record
            .get(1)
            .filter(|pattern| !pattern.is_empty())
            .ok_or(RecordError::MissingPattern { line })?;
        records.push((catalog.to_owned(), pattern.to_owned()));
    }
    Ok(records)
}
