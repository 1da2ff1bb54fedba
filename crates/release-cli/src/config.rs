//! Release configuration (`release.toml`).
//!
//! One file describes the data source, the study-wide filters and every
//! release. Per-release rules that used to live in separate copies of the
//! pipeline (base-column count, output delimiter, summary columns) are fields
//! of [`ReleaseProfile`].
//!
//! Paths are stored as written and resolved against the directory of the
//! configuration file when used.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use release_export::DEFAULT_BASE_COLUMN_COUNT;
use release_filter::DEFAULT_SUMMARY_COLUMNS;
use release_model::Delimiter;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "release.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub releases: BTreeMap<String, ReleaseProfile>,
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database holding the research data.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Participants removed from every release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion_list: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseProfile {
    /// Free-text request document.
    pub request: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_list: Option<PathBuf>,
    /// Parsed request, registered by `parse`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
    /// Overrides the windows named in the request document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<String>,
    #[serde(default = "default_base_column_count")]
    pub base_column_count: usize,
    #[serde(default)]
    pub delimiter: Delimiter,
    #[serde(default = "default_summary_columns")]
    pub summary_columns: Vec<String>,
    #[serde(default = "default_headerless_copies")]
    pub headerless_copies: bool,
}

fn default_base_column_count() -> usize {
    DEFAULT_BASE_COLUMN_COUNT
}

fn default_summary_columns() -> Vec<String> {
    DEFAULT_SUMMARY_COLUMNS
        .iter()
        .map(|column| (*column).to_string())
        .collect()
}

fn default_headerless_copies() -> bool {
    true
}

impl ReleaseProfile {
    pub fn new(request: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            request: request.into(),
            output_dir: output_dir.into(),
            inclusion_list: None,
            manifest: None,
            windows: Vec::new(),
            base_column_count: default_base_column_count(),
            delimiter: Delimiter::default(),
            summary_columns: default_summary_columns(),
            headerless_copies: default_headerless_copies(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read configuration {}", path.display()))?;
        let mut config: PipelineConfig = toml::from_str(&content)
            .with_context(|| format!("parse configuration {}", path.display()))?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("serialize configuration")?;
        fs::write(path, content)
            .with_context(|| format!("write configuration {}", path.display()))?;
        info!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Absolute paths pass through; relative ones join the config directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.resolve(&self.store.path)
    }

    pub fn exclusion_list(&self) -> Option<PathBuf> {
        self.filters
            .exclusion_list
            .as_deref()
            .map(|path| self.resolve(path))
    }

    pub fn release(&self, name: &str) -> Result<&ReleaseProfile> {
        match self.releases.get(name) {
            Some(profile) => Ok(profile),
            None => {
                let known: Vec<&str> = self.releases.keys().map(String::as_str).collect();
                bail!(
                    "unknown release '{name}' (configured: {})",
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                )
            }
        }
    }

    /// Records where the parsed request of `release` was written.
    pub fn register_manifest(&mut self, release: &str, manifest: PathBuf) -> Result<()> {
        let Some(profile) = self.releases.get_mut(release) else {
            bail!("unknown release '{release}'");
        };
        profile.manifest = Some(manifest);
        Ok(())
    }
}
