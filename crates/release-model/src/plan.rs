//! Resolved export plan.

use serde::{Deserialize, Serialize};

use crate::naming;

/// Projection applied to a source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSelection {
    /// No projection.
    All,
    Columns(Vec<String>),
}

impl ColumnSelection {
    pub fn is_all(&self) -> bool {
        matches!(self, ColumnSelection::All)
    }

    pub fn columns(&self) -> Option<&[String]> {
        match self {
            ColumnSelection::All => None,
            ColumnSelection::Columns(columns) => Some(columns),
        }
    }

    /// Short description for reports ("all columns", "12 columns").
    pub fn describe(&self) -> String {
        match self {
            ColumnSelection::All => "all columns".to_string(),
            ColumnSelection::Columns(columns) => format!("{} columns", columns.len()),
        }
    }
}

/// One (item, table) pair that passed the schema check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPlanEntry {
    pub item_number: u32,
    pub table: String,
    pub columns: ColumnSelection,
}

impl ExportPlanEntry {
    pub fn output_file_name(&self) -> String {
        naming::export_file_name(self.item_number, &self.table)
    }
}
