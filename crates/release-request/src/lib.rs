//! Data request parsing.
//!
//! A data request arrives as free text: a header naming the request, an
//! assessment-window directive, and numbered `ITEM` blocks that reference
//! source files and optionally list the variables of interest. This crate
//! turns that text into a [`RequestManifest`] and persists it as JSON so a
//! release can be re-run from the structured form.
//!
//! [`RequestManifest`]: release_model::RequestManifest

mod error;
mod parser;
mod persist;

pub use error::{RequestError, Result};
pub use parser::{TABULAR_EXTENSIONS, parse_request, parse_request_file};
pub use persist::{load_manifest, manifest_path_for, save_manifest};
