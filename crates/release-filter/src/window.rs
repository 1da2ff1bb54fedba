//! Assessment-window filtering.

use std::path::Path;

use regex::{Regex, RegexBuilder};
use release_ingest::{
    DelimitedTable, StageFile, file_name_of, list_stage_files, read_table, write_table,
};
use release_model::naming::{is_stage_output, window_output_name};
use release_model::{
    Delimiter, SkipReason, StageReport, VISIT_CODE_COLUMN, VISIT_LABEL_COLUMN, WindowTargets,
    resolve_windows,
};
use tracing::{debug, info, info_span, warn};

use crate::error::{FilterError, Result};

/// How a table encodes its timepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimepointColumn {
    /// Numeric `VisitCode` column at this index.
    VisitCode(usize),
    /// Free-text `visit_name` column at this index.
    VisitLabel(usize),
    Neither,
}

/// Visit code wins when a table carries both columns.
pub fn probe_timepoint_column(table: &DelimitedTable) -> TimepointColumn {
    if let Some(idx) = table.column_index(VISIT_CODE_COLUMN) {
        TimepointColumn::VisitCode(idx)
    } else if let Some(idx) = table.column_index(VISIT_LABEL_COLUMN) {
        TimepointColumn::VisitLabel(idx)
    } else {
        TimepointColumn::Neither
    }
}

/// Keeps the rows of selected assessment windows.
#[derive(Debug, Clone)]
pub struct WindowFilter {
    targets: WindowTargets,
    codes: Vec<i64>,
    label_pattern: Regex,
    delimiter: Delimiter,
}

impl WindowFilter {
    /// Builds a filter from window names such as `"Baseline"` or
    /// `"6-month post-baseline"`.
    ///
    /// Unknown names are dropped. An empty selector, or one where no name is
    /// known, is an error.
    pub fn new<S: AsRef<str>>(window_names: &[S], delimiter: Delimiter) -> Result<Self> {
        if window_names.iter().all(|name| name.as_ref().trim().is_empty()) {
            return Err(FilterError::EmptyWindowSelector);
        }
        let targets = resolve_windows(window_names);
        if targets.is_empty() {
            return Err(FilterError::NoMappedWindows {
                names: targets.unmapped,
            });
        }
        if !targets.unmapped.is_empty() {
            debug!(unmapped = ?targets.unmapped, "unknown window names dropped");
        }
        let pattern = targets
            .labels()
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        let label_pattern = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
        Ok(Self {
            codes: targets.visit_codes(),
            targets,
            label_pattern,
            delimiter,
        })
    }

    /// Filters one table in memory.
    pub fn filter_table(
        &self,
        mut table: DelimitedTable,
    ) -> std::result::Result<DelimitedTable, SkipReason> {
        match probe_timepoint_column(&table) {
            TimepointColumn::VisitCode(idx) => {
                table.retain_rows(|row| matches_visit_code(&row[idx], &self.codes));
            }
            TimepointColumn::VisitLabel(idx) => {
                table.retain_rows(|row| self.label_pattern.is_match(&row[idx]));
            }
            TimepointColumn::Neither => return Err(SkipReason::NoTimepointColumn),
        }
        Ok(table)
    }

    /// Filters `input` into `output`, returning the number of rows kept.
    pub fn filter_file(
        &self,
        input: &Path,
        output: &Path,
    ) -> std::result::Result<usize, SkipReason> {
        let table = read_table(input, self.delimiter).map_err(|e| SkipReason::Unreadable {
            message: e.to_string(),
        })?;
        let filtered = self.filter_table(table)?;
        write_table(output, &filtered, self.delimiter).map_err(|e| SkipReason::Unreadable {
            message: e.to_string(),
        })?;
        Ok(filtered.height())
    }

    /// Filters every exported file in `dir` into `{stem}_filtered.csv`.
    ///
    /// Files written by later stages are not inputs, so re-running the stage
    /// rewrites the same outputs instead of filtering its own results.
    pub fn run(&self, dir: &Path) -> Result<StageReport> {
        let _span = info_span!("window_filter", windows = ?self.targets.labels()).entered();
        let mut report = StageReport::new("window");

        for StageFile { path, name } in list_stage_files(dir, |name| !is_stage_output(name))? {
            let output = dir.join(window_output_name(&name));
            match self.filter_file(&path, &output) {
                Ok(rows) => {
                    info!(file = %file_name_of(&output), rows, "saved");
                    report.record_written(Some(path), output, rows);
                }
                Err(SkipReason::NoTimepointColumn) => {
                    debug!(file = %name, "skipped, no timepoint column");
                    report.record_skip(name, SkipReason::NoTimepointColumn);
                }
                Err(reason) => {
                    warn!(file = %name, %reason, "window filter failed");
                    report.record_skip(name, reason);
                }
            }
        }
        Ok(report)
    }
}

/// Visit codes compare numerically, so `"1"`, `" 1 "` and `"1.0"` all match 1.
fn matches_visit_code(value: &str, codes: &[i64]) -> bool {
    let value = value.trim();
    if let Ok(code) = value.parse::<i64>() {
        return codes.contains(&code);
    }
    match value.parse::<f64>() {
        Ok(code) if code.is_finite() && code.fract() == 0.0 => codes.contains(&(code as i64)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> DelimitedTable {
        DelimitedTable::new(
            headers.iter().map(|h| (*h).to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|v| (*v).to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn empty_selector_is_fatal() {
        let names: [&str; 0] = [];
        assert!(matches!(
            WindowFilter::new(&names, Delimiter::Semicolon),
            Err(FilterError::EmptyWindowSelector)
        ));
    }

    #[test]
    fn unmapped_selector_is_fatal() {
        let err = WindowFilter::new(&["Screening"], Delimiter::Semicolon).unwrap_err();
        assert!(matches!(err, FilterError::NoMappedWindows { .. }));
        assert_eq!(err.to_string(), "no known assessment window in selector: Screening");
    }

    #[test]
    fn visit_code_rows_are_kept_by_code() {
        let filter =
            WindowFilter::new(&["Baseline", "6-month post-baseline"], Delimiter::Semicolon)
                .unwrap();
        let input = table(
            &["participant_identifier", "VisitCode"],
            &[&["P1", "0"], &["P1", "1"], &["P1", "2.0"], &["P2", ""], &["P2", " 2 "]],
        );

        let filtered = filter.filter_table(input).unwrap();
        let codes: Vec<&str> = filtered.rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(codes, vec!["0", "2.0", " 2 "]);
    }

    #[test]
    fn visit_labels_match_case_insensitively() {
        let filter = WindowFilter::new(&["2-month post-baseline"], Delimiter::Semicolon).unwrap();
        let input = table(
            &["participant_identifier", "visit_name"],
            &[
                &["P1", "Baseline (Arm 1: Included)"],
                &["P1", "t1 (Arm 1: Included)"],
                &["P2", "T2"],
            ],
        );

        let filtered = filter.filter_table(input).unwrap();
        assert_eq!(filtered.rows.len(), 1);
        assert_eq!(filtered.rows[0][1], "t1 (Arm 1: Included)");
    }

    #[test]
    fn visit_code_takes_precedence_over_label() {
        let input = table(&["visit_name", "VisitCode"], &[]);
        assert_eq!(probe_timepoint_column(&input), TimepointColumn::VisitCode(1));
    }

    #[test]
    fn table_without_timepoint_is_skipped() {
        let filter = WindowFilter::new(&["Baseline"], Delimiter::Semicolon).unwrap();
        let input = table(&["participant_identifier", "unit"], &[&["P1", "A"]]);
        assert_eq!(
            filter.filter_table(input).unwrap_err(),
            SkipReason::NoTimepointColumn
        );
    }

    #[test]
    fn non_integer_visit_codes_never_match() {
        assert!(!matches_visit_code("abc", &[0]));
        assert!(matches_visit_code("3", &[3]));
        assert!(!matches_visit_code("3.5", &[3]));
    }
}
