//! Header-free copies of the final item files.

use std::path::Path;

use release_ingest::{
    StageFile, file_name_of, list_stage_files, read_table, write_table_without_header,
};
use release_model::naming::{headerless_name, is_final_output};
use release_model::{Delimiter, SkipReason, StageReport};
use tracing::{debug, info_span, warn};

use crate::error::Result;

/// Writes `ITEM_{stem}_no_headers.csv` next to every final item file.
pub fn write_headerless_copies(dir: &Path, delimiter: Delimiter) -> Result<StageReport> {
    let _span = info_span!("headerless").entered();
    let mut report = StageReport::new("headerless");

    for StageFile { path, name } in list_stage_files(dir, is_final_output)? {
        let output = dir.join(headerless_name(&name));
        let written = read_table(&path, delimiter).and_then(|table| {
            write_table_without_header(&output, &table, delimiter).map(|()| table.height())
        });
        match written {
            Ok(rows) => {
                debug!(file = %file_name_of(&output), rows, "saved");
                report.record_written(Some(path), output, rows);
            }
            Err(error) => {
                warn!(file = %name, %error, "skipped");
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn copies_drop_the_header_line() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("ITEM_1_esm.csv"),
            "participant_identifier;VisitCode\nP1;0\nP2;0\n",
        )
        .unwrap();

        let report = write_headerless_copies(dir.path(), Delimiter::Semicolon).unwrap();
        assert_eq!(report.written_names(), vec!["ITEM_1_esm_no_headers.csv"]);
        assert_eq!(
            fs::read_to_string(dir.path().join("ITEM_1_esm_no_headers.csv")).unwrap(),
            "P1;0\nP2;0\n"
        );

        // Re-running does not copy the copies.
        let again = write_headerless_copies(dir.path(), Delimiter::Semicolon).unwrap();
        assert_eq!(again.written.len(), 1);
    }
}
