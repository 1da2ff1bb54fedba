//! Materializes an export plan as one file per (item, table).

use std::fs;
use std::path::{Path, PathBuf};

use release_ingest::write_table;
use release_model::{Delimiter, ExportPlanEntry, SkipReason, StageReport};
use tracing::{info, info_span, warn};

use crate::error::{ExportError, Result};
use crate::store::DataStore;

#[derive(Debug, Clone)]
pub struct TableExporter {
    output_dir: PathBuf,
    delimiter: Delimiter,
}

impl TableExporter {
    pub fn new(output_dir: impl Into<PathBuf>, delimiter: Delimiter) -> Self {
        Self {
            output_dir: output_dir.into(),
            delimiter,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Runs every plan entry and writes `{item}_{table}.csv`.
    ///
    /// Only an uncreatable output directory is an error; a failed query or
    /// write is recorded in the report and the remaining entries still run.
    pub fn export<S>(&self, plan: &[ExportPlanEntry], store: &S) -> Result<StageReport>
    where
        S: DataStore + ?Sized,
    {
        let _span = info_span!("export", output_dir = %self.output_dir.display()).entered();
        fs::create_dir_all(&self.output_dir).map_err(|e| ExportError::CreateDir {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let mut report = StageReport::new("export");
        for entry in plan {
            let subject = format!("{}/{}", entry.item_number, entry.table);
            let table = match store.fetch(&entry.table, &entry.columns) {
                Ok(table) => table,
                Err(error) => {
                    warn!(
                        item = entry.item_number,
                        table = %entry.table,
                        %error,
                        "export query failed"
                    );
                    report.record_skip(
                        subject,
                        SkipReason::QueryFailed {
                            message: error.to_string(),
                        },
                    );
                    continue;
                }
            };

            let path = self.output_dir.join(entry.output_file_name());
            if let Err(error) = write_table(&path, &table, self.delimiter) {
                warn!(path = %path.display(), %error, "failed to write export");
                report.record_skip(
                    subject,
                    SkipReason::Unreadable {
                        message: error.to_string(),
                    },
                );
                continue;
            }
            info!(
                table = %entry.table,
                columns = %entry.columns.describe(),
                rows = table.height(),
                "exported"
            );
            report.record_written(None, path, table.height());
        }
        Ok(report)
    }
}
