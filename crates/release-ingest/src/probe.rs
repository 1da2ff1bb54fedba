//! Delimiter detection from a file's first line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use release_model::Delimiter;

use crate::error::{IngestError, Result};

/// Classifies a header line. Comma is checked before semicolon; first match wins.
pub fn detect_delimiter(line: &str) -> Option<Delimiter> {
    [Delimiter::Comma, Delimiter::Semicolon]
        .into_iter()
        .find(|delimiter| line.contains(delimiter.as_char()))
}

/// Reads the first line of `path` and detects its delimiter.
///
/// Returns `None` for empty files and single-column files.
pub fn probe_delimiter(path: &Path) -> Result<Option<Delimiter>> {
    let file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let mut reader = BufReader::new(file);
    let mut raw = Vec::new();
    reader
        .read_until(b'\n', &mut raw)
        .map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    // Undecodable bytes cannot be delimiters, so a lossy decode is enough.
    let line = String::from_utf8_lossy(&raw);
    Ok(detect_delimiter(&line))
}
