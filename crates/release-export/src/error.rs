use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("database not found: {path}")]
    DatabaseNotFound { path: PathBuf },

    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to list tables: {source}")]
    ListTables {
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to list columns of {table}: {source}")]
    ListColumns {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query on {table} failed: {source}")]
    Query {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("table not found: {table}")]
    TableNotFound { table: String },

    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExportError>;
