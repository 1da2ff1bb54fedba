//! Header-plus-rows tables backed by delimited text files.

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use release_model::Delimiter;

use crate::error::{IngestError, Result};

/// A delimited file held as strings: one header row and the data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DelimitedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

impl DelimitedTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Value at (`row`, `column`), empty when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|values| values.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Keeps rows for which `keep` returns true, preserving order.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[String]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Applies `f` to every value of one column.
    pub fn map_column<F>(&mut self, column: usize, mut f: F)
    where
        F: FnMut(&str) -> String,
    {
        for row in &mut self.rows {
            if let Some(value) = row.get_mut(column) {
                *value = f(value);
            }
        }
    }
}

/// Reads a delimited file whose first record is the header row.
///
/// Rows shorter than the header are padded with empty values and longer
/// rows are truncated, so every row has exactly `headers.len()` cells.
/// An empty file yields an empty table.
pub fn read_table(path: &Path, delimiter: Delimiter) -> Result<DelimitedTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::parse(path, e))?;

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|e| IngestError::parse(path, e))?
            .iter()
            .map(normalize_header)
            .collect(),
        None => return Ok(DelimitedTable::default()),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(|e| IngestError::parse(path, e))?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let mut row: Vec<String> = record
            .iter()
            .take(headers.len())
            .map(str::to_string)
            .collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    Ok(DelimitedTable { headers, rows })
}

/// Writes `table` with its header row, replacing any existing file.
pub fn write_table(path: &Path, table: &DelimitedTable, delimiter: Delimiter) -> Result<()> {
    write_records(path, table, delimiter, true)
}

/// Writes only the data rows of `table`.
pub fn write_table_without_header(
    path: &Path,
    table: &DelimitedTable,
    delimiter: Delimiter,
) -> Result<()> {
    write_records(path, table, delimiter, false)
}

fn write_records(
    path: &Path,
    table: &DelimitedTable,
    delimiter: Delimiter,
    with_header: bool,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IngestError::FileRead {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter.as_byte())
        .from_path(path)
        .map_err(|e| IngestError::CsvWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    let write_err = |e: csv::Error| IngestError::CsvWrite {
        path: path.to_path_buf(),
        source: e,
    };
    if with_header && !table.headers.is_empty() {
        writer.write_record(&table.headers).map_err(write_err)?;
    }
    for row in &table.rows {
        writer.write_record(row).map_err(write_err)?;
    }
    writer.flush().map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
