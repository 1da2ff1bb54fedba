//! JSON persistence for parsed manifests.

use std::fs;
use std::path::{Path, PathBuf};

use release_model::RequestManifest;
use tracing::info;

use crate::error::{RequestError, Result};

/// Default manifest location: next to the request document, `.json` extension.
pub fn manifest_path_for(request_path: &Path) -> PathBuf {
    request_path.with_extension("json")
}

pub fn save_manifest(manifest: &RequestManifest, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RequestError::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let json = serde_json::to_string_pretty(manifest).map_err(|e| RequestError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, json).map_err(|e| RequestError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(path = %path.display(), "manifest saved");
    Ok(())
}

pub fn load_manifest(path: &Path) -> Result<RequestManifest> {
    let content = fs::read_to_string(path).map_err(|e| RequestError::read(path, e))?;
    let manifest: RequestManifest =
        serde_json::from_str(&content).map_err(|e| RequestError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
    manifest.validate().map_err(|e| RequestError::Model {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(manifest)
}
