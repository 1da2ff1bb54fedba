//! Per-stage run reports.
//!
//! Recoverable conditions (a missing table, a file without an identifier
//! column) are recorded here instead of being raised, so a stage always
//! finishes with partial results and the caller decides how to present them.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Why a stage left a table or file out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Named table is not in the live schema.
    TableNotInSchema,
    /// Projection query failed at export time.
    QueryFailed { message: String },
    /// File has no `participant_identifier` column.
    MissingIdentifierColumn,
    /// File has neither a visit code nor a visit label column.
    NoTimepointColumn,
    /// File could not be read or written.
    Unreadable { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TableNotInSchema => f.write_str("table not found in database"),
            SkipReason::QueryFailed { message } => write!(f, "query failed: {message}"),
            SkipReason::MissingIdentifierColumn => {
                f.write_str("participant_identifier column not found")
            }
            SkipReason::NoTimepointColumn => {
                f.write_str("no 'visit_name' or 'VisitCode' column found")
            }
            SkipReason::Unreadable { message } => write!(f, "unreadable: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    /// File name, or `item/table` for export entries.
    pub subject: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenFile {
    pub source: Option<PathBuf>,
    pub path: PathBuf,
    pub rows: usize,
}

impl WrittenFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: String,
    pub written: Vec<WrittenFile>,
    pub skipped: Vec<SkippedFile>,
}

impl StageReport {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Self::default()
        }
    }

    pub fn record_written(&mut self, source: Option<PathBuf>, path: PathBuf, rows: usize) {
        self.written.push(WrittenFile { source, path, rows });
    }

    pub fn record_skip(&mut self, subject: impl Into<String>, reason: SkipReason) {
        self.skipped.push(SkippedFile {
            subject: subject.into(),
            reason,
        });
    }

    pub fn has_skips(&self) -> bool {
        !self.skipped.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.written.iter().map(|file| file.rows).sum()
    }

    pub fn written_names(&self) -> Vec<String> {
        self.written.iter().map(WrittenFile::file_name).collect()
    }
}
