use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("assessment window selector is empty")]
    EmptyWindowSelector,

    #[error("no known assessment window in selector: {}", names.join(", "))]
    NoMappedWindows { names: Vec<String> },

    #[error("invalid visit label pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to read identifier list {path}: {source}")]
    IdentifierList {
        path: PathBuf,
        #[source]
        source: release_ingest::IngestError,
    },

    #[error(transparent)]
    Ingest(#[from] release_ingest::IngestError),
}

pub type Result<T> = std::result::Result<T, FilterError>;
