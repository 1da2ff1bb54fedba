//! Delimited-file I/O for data releases.
//!
//! Every pipeline stage exchanges data through delimited text files in one
//! working directory. This crate provides the primitives they share:
//!
//! - **Tables**: read and write a header row plus string rows with a fixed
//!   delimiter
//! - **Delimiter probe**: classify a file as comma- or semicolon-delimited
//!   from its first line
//! - **Discovery**: list the CSV files of a directory in a stable order
//! - **Identifier lists**: load participant block/allow lists from
//!   spreadsheets or delimited text
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use release_ingest::{list_csv_files, read_table};
//! use release_model::Delimiter;
//!
//! for path in list_csv_files(Path::new("releases/r22"))? {
//!     let table = read_table(&path, Delimiter::Semicolon)?;
//!     println!("{}: {} rows", path.display(), table.height());
//! }
//! ```

mod discovery;
mod error;
mod id_list;
mod probe;
mod table;

// === Error Types ===
pub use error::{IngestError, Result};

// === Tables ===
pub use table::{DelimitedTable, read_table, write_table, write_table_without_header};

// === Delimiter Probe ===
pub use probe::{detect_delimiter, probe_delimiter};

// === File Discovery ===
pub use discovery::{StageFile, file_name_of, list_csv_files, list_stage_files};

// === Identifier Lists ===
pub use id_list::read_identifier_list;
