//! Shared types for the data release pipeline.
//!
//! Every stage of a release reads and writes files in one working directory.
//! This crate holds the vocabulary those stages agree on: the parsed request
//! manifest, the fixed assessment-window table, the export plan, the file
//! naming conventions and the per-stage run report.

pub mod delimiter;
pub mod error;
pub mod manifest;
pub mod naming;
pub mod plan;
pub mod report;
pub mod window;

pub use delimiter::Delimiter;
pub use error::{ModelError, Result};
pub use manifest::{ManifestItem, RequestManifest};
pub use plan::{ColumnSelection, ExportPlanEntry};
pub use report::{SkipReason, SkippedFile, StageReport, WrittenFile};
pub use window::{TimepointCode, WindowTargets, resolve_windows};

/// Column that keys every participant-level output row.
pub const PARTICIPANT_IDENTIFIER: &str = "participant_identifier";

/// Numeric visit code column (0-3).
pub const VISIT_CODE_COLUMN: &str = "VisitCode";

/// Free-text visit label column.
pub const VISIT_LABEL_COLUMN: &str = "visit_name";
