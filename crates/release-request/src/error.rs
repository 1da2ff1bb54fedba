use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request document not found: {path}")]
    Missing { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid manifest {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: release_model::ModelError,
    },
}

impl RequestError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::Missing { path }
        } else {
            Self::Read { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, RequestError>;
