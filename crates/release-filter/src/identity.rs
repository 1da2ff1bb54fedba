//! Participant identifier set filters.
//!
//! Exclusion and inclusion share one algorithm. They differ in the polarity
//! of the membership test and in which stage's files they read and write.

use std::collections::BTreeSet;
use std::path::Path;

use release_ingest::{
    DelimitedTable, StageFile, file_name_of, list_stage_files, read_identifier_list, read_table,
    write_table,
};
use release_model::naming::{
    exclusion_output_name, final_output_name, is_exclusion_output, is_window_output,
};
use release_model::{Delimiter, PARTICIPANT_IDENTIFIER, SkipReason, StageReport};
use tracing::{debug, info, info_span, warn};

use crate::error::{FilterError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityMode {
    /// Drop rows whose identifier is listed.
    Exclude,
    /// Keep only rows whose identifier is listed.
    Include,
}

impl IdentityMode {
    fn stage(self) -> &'static str {
        match self {
            IdentityMode::Exclude => "exclude",
            IdentityMode::Include => "include",
        }
    }

    fn is_input(self, file_name: &str) -> bool {
        match self {
            IdentityMode::Exclude => is_window_output(file_name),
            IdentityMode::Include => is_exclusion_output(file_name),
        }
    }

    fn output_name(self, file_name: &str) -> String {
        match self {
            IdentityMode::Exclude => exclusion_output_name(file_name),
            IdentityMode::Include => final_output_name(file_name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IdentitySetFilter {
    mode: IdentityMode,
    identifiers: BTreeSet<String>,
    delimiter: Delimiter,
}

impl IdentitySetFilter {
    pub fn exclusion(identifiers: BTreeSet<String>, delimiter: Delimiter) -> Self {
        Self {
            mode: IdentityMode::Exclude,
            identifiers,
            delimiter,
        }
    }

    pub fn inclusion(identifiers: BTreeSet<String>, delimiter: Delimiter) -> Self {
        Self {
            mode: IdentityMode::Include,
            identifiers,
            delimiter,
        }
    }

    /// Loads the identifier list at `path`. A missing or unreadable list is fatal.
    pub fn from_list_file(mode: IdentityMode, path: &Path, delimiter: Delimiter) -> Result<Self> {
        let identifiers =
            read_identifier_list(path).map_err(|source| FilterError::IdentifierList {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            mode,
            identifiers,
            delimiter,
        })
    }

    pub fn identifier_count(&self) -> usize {
        self.identifiers.len()
    }

    fn keeps(&self, identifier: &str) -> bool {
        let listed = self.identifiers.contains(identifier);
        match self.mode {
            IdentityMode::Exclude => !listed,
            IdentityMode::Include => listed,
        }
    }

    /// Trims the identifier column and applies the membership test.
    pub fn filter_table(
        &self,
        mut table: DelimitedTable,
    ) -> std::result::Result<DelimitedTable, SkipReason> {
        let idx = table
            .column_index(PARTICIPANT_IDENTIFIER)
            .ok_or(SkipReason::MissingIdentifierColumn)?;
        table.map_column(idx, |value| value.trim().to_string());
        table.retain_rows(|row| self.keeps(&row[idx]));
        Ok(table)
    }

    fn filter_file(&self, input: &Path, output: &Path) -> std::result::Result<usize, SkipReason> {
        let table = read_table(input, self.delimiter).map_err(|e| SkipReason::Unreadable {
            message: e.to_string(),
        })?;
        let filtered = self.filter_table(table)?;
        write_table(output, &filtered, self.delimiter).map_err(|e| SkipReason::Unreadable {
            message: e.to_string(),
        })?;
        Ok(filtered.height())
    }

    /// Filters every file of the preceding stage found in `dir`.
    pub fn run(&self, dir: &Path) -> Result<StageReport> {
        let stage = self.mode.stage();
        let _span =
            info_span!("identity_filter", stage, listed = self.identifiers.len()).entered();
        let mut report = StageReport::new(stage);

        for StageFile { path, name } in list_stage_files(dir, |name| self.mode.is_input(name))? {
            let output = dir.join(self.mode.output_name(&name));
            match self.filter_file(&path, &output) {
                Ok(rows) => {
                    info!(file = %file_name_of(&output), rows, "saved");
                    report.record_written(Some(path), output, rows);
                }
                Err(reason) => {
                    warn!(file = %name, %reason, "skipped");
                    report.record_skip(name, reason);
                }
            }
        }
        Ok(report)
    }
}

/// Rewrites every exclusion-stage file under its final `ITEM_` name.
///
/// Used when a release has no allow list, so later stages always find final
/// item files.
pub fn promote_final_files(dir: &Path, delimiter: Delimiter) -> Result<StageReport> {
    let _span = info_span!("promote").entered();
    let mut report = StageReport::new("include");

    for StageFile { path, name } in list_stage_files(dir, is_exclusion_output)? {
        let output = dir.join(final_output_name(&name));
        let promoted = read_table(&path, delimiter)
            .and_then(|table| write_table(&output, &table, delimiter).map(|()| table.height()));
        match promoted {
            Ok(rows) => {
                debug!(file = %file_name_of(&output), rows, "promoted");
                report.record_written(Some(path), output, rows);
            }
            Err(error) => {
                warn!(file = %name, %error, "promotion failed");
                report.record_skip(
                    name,
                    SkipReason::Unreadable {
                        message: error.to_string(),
                    },
                );
            }
        }
    }
    Ok(report)
}
