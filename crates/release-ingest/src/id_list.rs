//! Participant identifier lists (block lists and allow lists).
//!
//! Lists arrive either as spreadsheets (`.xlsx`, `.xls`) or as delimited
//! text. Both are read the same way: first column, no header row.

use std::collections::BTreeSet;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use csv::ReaderBuilder;
use release_model::Delimiter;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::probe::probe_delimiter;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Reads the first column of a headerless list file as a set of identifiers.
///
/// Every row counts, including the first one. Values are trimmed and empty
/// values are dropped. Extra columns are ignored.
pub fn read_identifier_list(path: &Path) -> Result<BTreeSet<String>> {
    let identifiers = if is_spreadsheet(path) {
        read_first_sheet_column(path)?
    } else {
        read_delimited_column(path)?
    };
    debug!(
        path = %path.display(),
        count = identifiers.len(),
        "identifier list loaded"
    );
    Ok(identifiers)
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn read_delimited_column(path: &Path) -> Result<BTreeSet<String>> {
    let delimiter = probe_delimiter(path)?.unwrap_or(Delimiter::Comma);
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::parse(path, e))?;

    let mut identifiers = BTreeSet::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::parse(path, e))?;
        let Some(value) = record.get(0) else {
            continue;
        };
        let value = value.trim().trim_matches('\u{feff}');
        if !value.is_empty() {
            identifiers.insert(value.to_string());
        }
    }
    Ok(identifiers)
}

/// First column of the first worksheet.
fn read_first_sheet_column(path: &Path) -> Result<BTreeSet<String>> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let sheet_err = |source: calamine::Error| IngestError::Spreadsheet {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = open_workbook_auto(path).map_err(sheet_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::NoWorksheet {
            path: path.to_path_buf(),
        })?
        .map_err(sheet_err)?;

    Ok(range
        .rows()
        .filter_map(|row| row.first())
        .filter_map(cell_identifier)
        .collect())
}

/// Whole numbers lose their fractional part, so `1003.0` reads as `1003`.
fn cell_identifier(cell: &Data) -> Option<String> {
    let value = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(text) => text.trim().to_string(),
        Data::Float(number) if number.is_finite() && number.fract() == 0.0 => {
            format!("{number:.0}")
        }
        other => other.to_string().trim().to_string(),
    };
    (!value.is_empty()).then_some(value)
}
