//! Export stage of a data release.
//!
//! The research database is consumed through two small traits:
//! [`SchemaSource`] lists tables and their columns, [`DataStore`] adds
//! projection queries. [`SqliteStore`] implements both over a SQLite file.
//!
//! Export runs in two steps:
//! 1. [`ColumnSelector`] resolves a manifest against the live schema into an
//!    ordered export plan (one entry per item and table that exists).
//! 2. [`TableExporter`] runs each plan entry and writes `{item}_{table}.csv`.
//!
//! Both steps keep going past per-table problems and record them in a
//! [`StageReport`](release_model::StageReport).

mod error;
mod exporter;
mod selector;
mod sqlite;
mod store;

pub use error::{ExportError, Result};
pub use exporter::TableExporter;
pub use selector::{ColumnSelector, DEFAULT_BASE_COLUMN_COUNT, ResolvedPlan, select_columns};
pub use sqlite::SqliteStore;
pub use store::{DataStore, SchemaSource};
