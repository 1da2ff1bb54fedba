//! Assessment windows and their two timepoint encodings.
//!
//! Source tables encode the study timepoint either as a numeric visit code
//! (`VisitCode`, 0-3) or as a free-text visit label (`visit_name`, e.g.
//! "T1 (Arm 1: Included)"). Human-facing window names map to both through
//! one closed table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Study timepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimepointCode {
    Baseline,
    T1,
    T2,
    T3,
}

impl TimepointCode {
    pub const ALL: [TimepointCode; 4] = [
        TimepointCode::Baseline,
        TimepointCode::T1,
        TimepointCode::T2,
        TimepointCode::T3,
    ];

    /// Window name as it appears in request documents.
    pub fn window_name(self) -> &'static str {
        match self {
            TimepointCode::Baseline => "Baseline",
            TimepointCode::T1 => "2-month post-baseline",
            TimepointCode::T2 => "6-month post-baseline",
            TimepointCode::T3 => "12-month post-baseline",
        }
    }

    /// Symbolic label matched against free-text visit columns.
    pub fn label(self) -> &'static str {
        match self {
            TimepointCode::Baseline => "Baseline",
            TimepointCode::T1 => "T1",
            TimepointCode::T2 => "T2",
            TimepointCode::T3 => "T3",
        }
    }

    /// Integer visit code matched against numeric visit columns.
    pub fn visit_code(self) -> i64 {
        match self {
            TimepointCode::Baseline => 0,
            TimepointCode::T1 => 1,
            TimepointCode::T2 => 2,
            TimepointCode::T3 => 3,
        }
    }

    /// Looks up a window name (trimmed, case-insensitive).
    pub fn from_window_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|code| code.window_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for TimepointCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Timepoints selected by a window directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowTargets {
    pub timepoints: Vec<TimepointCode>,
    /// Names absent from the window table; dropped, kept only for diagnostics.
    pub unmapped: Vec<String>,
}

impl WindowTargets {
    pub fn is_empty(&self) -> bool {
        self.timepoints.is_empty()
    }

    pub fn visit_codes(&self) -> Vec<i64> {
        self.timepoints.iter().map(|t| t.visit_code()).collect()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.timepoints.iter().map(|t| t.label()).collect()
    }
}

/// Maps window names to timepoints, keeping first-seen order and dropping repeats.
pub fn resolve_windows<S: AsRef<str>>(names: &[S]) -> WindowTargets {
    let mut targets = WindowTargets::default();
    for name in names {
        let name = name.as_ref();
        match TimepointCode::from_window_name(name) {
            Some(code) if !targets.timepoints.contains(&code) => targets.timepoints.push(code),
            Some(_) => {}
            None => targets.unmapped.push(name.trim().to_string()),
        }
    }
    targets
}
