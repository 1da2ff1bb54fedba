//! Resolution of manifest items into an export plan.

use std::collections::BTreeSet;

use release_model::{ColumnSelection, ExportPlanEntry, RequestManifest, SkipReason, StageReport};
use tracing::{debug, info_span, warn};

use crate::error::Result;
use crate::store::SchemaSource;

/// Leading columns (identifiers, metadata) always exported with a projection.
pub const DEFAULT_BASE_COLUMN_COUNT: usize = 10;

/// Export plan plus the tables that were left out.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPlan {
    pub entries: Vec<ExportPlanEntry>,
    pub report: StageReport,
}

/// Applies the "first N columns + requested extras" rule.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSelector {
    base_column_count: usize,
}

impl Default for ColumnSelector {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_COLUMN_COUNT)
    }
}

impl ColumnSelector {
    pub fn new(base_column_count: usize) -> Self {
        Self { base_column_count }
    }

    pub fn base_column_count(&self) -> usize {
        self.base_column_count
    }

    /// Resolves every (item, table) pair of `manifest` against `schema`.
    ///
    /// Tables missing from the schema are skipped with a warning. Failing to
    /// list the schema at all is an error.
    pub fn resolve<S>(&self, manifest: &RequestManifest, schema: &S) -> Result<ResolvedPlan>
    where
        S: SchemaSource + ?Sized,
    {
        let _span = info_span!("select_columns", base = self.base_column_count).entered();
        let live_tables: BTreeSet<String> = schema.table_names()?.into_iter().collect();
        let mut plan = ResolvedPlan {
            entries: Vec::with_capacity(manifest.table_reference_count()),
            report: StageReport::new("plan"),
        };

        for item in &manifest.items {
            for table in &item.table_names {
                if !live_tables.contains(table) {
                    warn!(
                        item = item.item_number,
                        %table,
                        "table not found in database, skipping"
                    );
                    plan.report.record_skip(
                        format!("{}/{}", item.item_number, table),
                        SkipReason::TableNotInSchema,
                    );
                    continue;
                }
                let columns = if item.exports_all_columns() {
                    ColumnSelection::All
                } else {
                    let table_columns = match schema.column_names(table) {
                        Ok(table_columns) => table_columns,
                        Err(error) => {
                            warn!(
                                item = item.item_number,
                                %table,
                                %error,
                                "cannot list columns, skipping"
                            );
                            plan.report.record_skip(
                                format!("{}/{}", item.item_number, table),
                                SkipReason::QueryFailed {
                                    message: error.to_string(),
                                },
                            );
                            continue;
                        }
                    };
                    ColumnSelection::Columns(select_columns(
                        &table_columns,
                        &item.requested_variables,
                        self.base_column_count,
                    ))
                };
                debug!(
                    item = item.item_number,
                    %table,
                    columns = %columns.describe(),
                    "table resolved"
                );
                plan.entries.push(ExportPlanEntry {
                    item_number: item.item_number,
                    table: table.clone(),
                    columns,
                });
            }
        }
        Ok(plan)
    }
}

/// First `base_count` columns of `table_columns`, then each requested column
/// that exists in the table and is not already selected, in request order.
pub fn select_columns(
    table_columns: &[String],
    requested: &[String],
    base_count: usize,
) -> Vec<String> {
    let mut selected: Vec<String> = table_columns.iter().take(base_count).cloned().collect();
    for variable in requested {
        if table_columns.contains(variable) && !selected.contains(variable) {
            selected.push(variable.clone());
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn base_columns_then_requested_extras() {
        let selected = select_columns(&columns(15), &strings(&["c2", "c12", "c99"]), 10);
        let mut expected = columns(10);
        expected.push("c12".to_string());
        assert_eq!(selected, expected);
    }

    #[test]
    fn narrow_table_keeps_every_column() {
        let selected = select_columns(&columns(4), &strings(&["c3", "c1"]), 10);
        assert_eq!(selected, columns(4));
    }

    #[test]
    fn extras_follow_request_order_once() {
        let selected = select_columns(&columns(6), &strings(&["c5", "c4", "c5"]), 2);
        assert_eq!(selected, strings(&["c0", "c1", "c5", "c4"]));
    }
}
