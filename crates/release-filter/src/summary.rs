//! Per-participant summary of the final item files.

use std::collections::HashSet;
use std::path::Path;

use release_ingest::{
    DelimitedTable, StageFile, list_stage_files, probe_delimiter, read_table, write_table,
};
use release_model::naming::{SUMMARY_FILE_NAME, is_final_output};
use release_model::{Delimiter, PARTICIPANT_IDENTIFIER, SkipReason, StageReport};
use tracing::{debug, info, info_span, warn};

use crate::error::Result;

pub const DEFAULT_SUMMARY_COLUMNS: [&str; 3] = ["unit", "condition", "randomize"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSummary {
    pub identifier: String,
    /// One value per summary column, empty when the source file lacks it.
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    attribute_columns: Vec<String>,
    delimiter: Delimiter,
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new(
            DEFAULT_SUMMARY_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
            Delimiter::Semicolon,
        )
    }
}

impl SummaryBuilder {
    /// `delimiter` is the output delimiter; input files are probed one by one.
    pub fn new(attribute_columns: Vec<String>, delimiter: Delimiter) -> Self {
        Self {
            attribute_columns,
            delimiter,
        }
    }

    /// Scans the final item files of `dir` in name order.
    ///
    /// The first column of each file is the participant identifier. The first
    /// file a participant appears in supplies their attributes; later rows
    /// for the same participant are ignored.
    pub fn build(&self, dir: &Path) -> Result<(Vec<ParticipantSummary>, StageReport)> {
        let mut report = StageReport::new("summary");
        let mut seen: HashSet<String> = HashSet::new();
        let mut participants = Vec::new();

        for StageFile { path, name } in list_stage_files(dir, is_final_output)? {
            let table = match self.read_final_file(&path) {
                Ok(table) => table,
                Err(error) => {
                    warn!(file = %name, %error, "skipped");
                    report.record_skip(
                        name,
                        SkipReason::Unreadable {
                            message: error.to_string(),
                        },
                    );
                    continue;
                }
            };
            let columns: Vec<Option<usize>> = self
                .attribute_columns
                .iter()
                .map(|column| table.column_index(column))
                .collect();
            if columns.iter().any(Option::is_none) {
                debug!(file = %name, "some summary columns missing, left empty");
            }

            let before = participants.len();
            for row in 0..table.height() {
                let identifier = table.cell(row, 0).trim();
                if identifier.is_empty() || seen.contains(identifier) {
                    continue;
                }
                seen.insert(identifier.to_string());
                participants.push(ParticipantSummary {
                    identifier: identifier.to_string(),
                    attributes: columns
                        .iter()
                        .map(|idx| {
                            idx.map_or_else(String::new, |i| table.cell(row, i).to_string())
                        })
                        .collect(),
                });
            }
            debug!(file = %name, new = participants.len() - before, "scanned");
        }
        Ok((participants, report))
    }

    fn read_final_file(&self, path: &Path) -> release_ingest::Result<DelimitedTable> {
        let delimiter = probe_delimiter(path)?.unwrap_or(Delimiter::Comma);
        read_table(path, delimiter)
    }

    pub fn write(&self, path: &Path, participants: &[ParticipantSummary]) -> Result<()> {
        let mut headers = vec![PARTICIPANT_IDENTIFIER.to_string()];
        headers.extend(self.attribute_columns.iter().cloned());
        let rows = participants
            .iter()
            .map(|p| {
                let mut row = vec![p.identifier.clone()];
                row.extend(p.attributes.iter().cloned());
                row
            })
            .collect();
        write_table(path, &DelimitedTable::new(headers, rows), self.delimiter)?;
        Ok(())
    }

    /// Builds the summary of `dir` and writes it into the same directory.
    pub fn run(&self, dir: &Path) -> Result<StageReport> {
        let _span = info_span!("summary", dir = %dir.display()).entered();
        let (participants, mut report) = self.build(dir)?;
        let output = dir.join(SUMMARY_FILE_NAME);
        self.write(&output, &participants)?;
        info!(participants = participants.len(), "summary written");
        report.record_written(None, output, participants.len());
        Ok(report)
    }
}
