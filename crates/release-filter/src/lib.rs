//! Filtering stages of a data release.
//!
//! All stages work on the release directory left by the export stage and
//! never modify their inputs; each writes new files under its own naming
//! convention (see [`release_model::naming`]):
//!
//! 1. [`WindowFilter`] keeps rows of the requested assessment windows
//! 2. [`IdentitySetFilter`] in exclusion mode drops block-listed participants
//! 3. [`IdentitySetFilter`] in inclusion mode keeps allow-listed participants,
//!    or [`promote_final_files`] when the release has no allow list
//! 4. [`SummaryBuilder`] writes one row per participant of the final files
//! 5. [`write_headerless_copies`] writes header-free copies of the final files

mod error;
mod headerless;
mod identity;
mod summary;
mod window;

pub use error::{FilterError, Result};
pub use headerless::write_headerless_copies;
pub use identity::{IdentityMode, IdentitySetFilter, promote_final_files};
pub use summary::{DEFAULT_SUMMARY_COLUMNS, ParticipantSummary, SummaryBuilder};
pub use window::{TimepointColumn, WindowFilter, probe_timepoint_column};
