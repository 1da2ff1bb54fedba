//! Stage orchestration for one release.
//!
//! Stages run strictly in order and hand data to each other only through the
//! files in the release directory, so any stage can be re-run on its own once
//! its predecessors have produced their files.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use release_export::{ColumnSelector, ResolvedPlan, SqliteStore, TableExporter};
use release_filter::{
    IdentityMode, IdentitySetFilter, SummaryBuilder, WindowFilter, promote_final_files,
    write_headerless_copies,
};
use release_model::{RequestManifest, StageReport};
use release_request::{load_manifest, manifest_path_for, parse_request_file, save_manifest};
use tracing::{info, info_span, warn};

use crate::config::{PipelineConfig, ReleaseProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Parse,
    Export,
    Window,
    Exclude,
    Include,
    Summary,
    Headerless,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Parse,
        Stage::Export,
        Stage::Window,
        Stage::Exclude,
        Stage::Include,
        Stage::Summary,
        Stage::Headerless,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::Export => "export",
            Stage::Window => "window",
            Stage::Exclude => "exclude",
            Stage::Include => "include",
            Stage::Summary => "summary",
            Stage::Headerless => "headerless",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range of stages to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageRange {
    pub from: Stage,
    pub to: Stage,
}

impl Default for StageRange {
    fn default() -> Self {
        Self {
            from: Stage::Parse,
            to: Stage::Headerless,
        }
    }
}

impl StageRange {
    pub fn new(from: Stage, to: Stage) -> Result<Self> {
        if from > to {
            bail!("stage range is empty: '{from}' comes after '{to}'");
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.from <= stage && stage <= self.to
    }

    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL.into_iter().filter(|stage| self.contains(*stage))
    }
}

/// Outcome of [`run_release`].
#[derive(Debug, Clone)]
pub struct ReleaseRun {
    pub release: String,
    pub output_dir: PathBuf,
    pub reports: Vec<StageReport>,
    /// Set when the parse stage wrote a manifest that should be registered.
    pub parsed_manifest: Option<PathBuf>,
}

impl ReleaseRun {
    pub fn has_skips(&self) -> bool {
        self.reports.iter().any(StageReport::has_skips)
    }
}

/// One release bound to the configuration it was loaded from.
pub struct ReleasePipeline<'a> {
    config: &'a PipelineConfig,
    name: &'a str,
    profile: &'a ReleaseProfile,
    manifest: Option<RequestManifest>,
}

impl<'a> ReleasePipeline<'a> {
    pub fn new(config: &'a PipelineConfig, name: &'a str) -> Result<Self> {
        Ok(Self {
            config,
            name,
            profile: config.release(name)?,
            manifest: None,
        })
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config.resolve(&self.profile.output_dir)
    }

    fn request_path(&self) -> PathBuf {
        self.config.resolve(&self.profile.request)
    }

    /// Manifest location as it should appear in the configuration file.
    fn manifest_location(&self) -> PathBuf {
        self.profile
            .manifest
            .clone()
            .unwrap_or_else(|| manifest_path_for(&self.profile.request))
    }

    /// Parses the request document and persists the manifest.
    ///
    /// Returns the manifest location relative to the configuration.
    pub fn parse(&mut self) -> Result<(PathBuf, StageReport)> {
        let request = self.request_path();
        let manifest = parse_request_file(&request)
            .with_context(|| format!("parse request for release '{}'", self.name))?;
        let location = self.manifest_location();
        let path = self.config.resolve(&location);
        save_manifest(&manifest, &path)?;

        let mut report = StageReport::new(Stage::Parse.as_str());
        report.record_written(Some(request), path, manifest.items.len());
        self.manifest = Some(manifest);
        Ok((location, report))
    }

    /// The manifest of this release: parsed in this run, registered in the
    /// configuration, or parsed from the request document on the fly.
    pub fn manifest(&mut self) -> Result<&RequestManifest> {
        if self.manifest.is_none() {
            let manifest = match &self.profile.manifest {
                Some(location) => {
                    let path = self.config.resolve(location);
                    load_manifest(&path)
                        .with_context(|| format!("load manifest {}", path.display()))?
                }
                None => parse_request_file(&self.request_path())?,
            };
            self.manifest = Some(manifest);
        }
        match &self.manifest {
            Some(manifest) => Ok(manifest),
            None => bail!("manifest for release '{}' is unavailable", self.name),
        }
    }

    pub fn plan(&mut self) -> Result<ResolvedPlan> {
        let store = SqliteStore::new(self.config.store_path());
        let selector = ColumnSelector::new(self.profile.base_column_count);
        let manifest = self.manifest()?;
        Ok(selector.resolve(manifest, &store)?)
    }

    pub fn export(&mut self) -> Result<StageReport> {
        let plan = self.plan()?;
        let store = SqliteStore::new(self.config.store_path());
        let exporter = TableExporter::new(self.output_dir(), self.profile.delimiter);
        let mut report = exporter.export(&plan.entries, &store)?;
        let mut skipped = plan.report.skipped;
        skipped.append(&mut report.skipped);
        report.skipped = skipped;
        Ok(report)
    }

    fn window_names(&mut self) -> Result<Vec<String>> {
        if !self.profile.windows.is_empty() {
            return Ok(self.profile.windows.clone());
        }
        Ok(self.manifest()?.assessment_window.clone())
    }

    pub fn window(&mut self) -> Result<StageReport> {
        let names = self.window_names()?;
        let filter = WindowFilter::new(&names, self.profile.delimiter)
            .with_context(|| format!("assessment windows of release '{}'", self.name))?;
        Ok(filter.run(&self.output_dir())?)
    }

    pub fn exclude(&self) -> Result<StageReport> {
        let filter = match self.config.exclusion_list() {
            Some(path) => IdentitySetFilter::from_list_file(
                IdentityMode::Exclude,
                &path,
                self.profile.delimiter,
            )?,
            None => {
                warn!("no exclusion list configured, no participants are excluded");
                IdentitySetFilter::exclusion(BTreeSet::new(), self.profile.delimiter)
            }
        };
        Ok(filter.run(&self.output_dir())?)
    }

    /// Applies the allow list when one is configured and present, otherwise
    /// promotes the exclusion outputs to final files unchanged.
    pub fn include(&self) -> Result<StageReport> {
        let output_dir = self.output_dir();
        let allow_list = self
            .profile
            .inclusion_list
            .as_deref()
            .map(|path| self.config.resolve(path));
        match allow_list {
            Some(path) if path.is_file() => {
                let filter = IdentitySetFilter::from_list_file(
                    IdentityMode::Include,
                    &path,
                    self.profile.delimiter,
                )?;
                Ok(filter.run(&output_dir)?)
            }
            Some(path) => {
                warn!(
                    path = %path.display(),
                    "inclusion list not found, promoting exclusion outputs"
                );
                Ok(promote_final_files(&output_dir, self.profile.delimiter)?)
            }
            None => Ok(promote_final_files(&output_dir, self.profile.delimiter)?),
        }
    }

    pub fn summary(&self) -> Result<StageReport> {
        let builder =
            SummaryBuilder::new(self.profile.summary_columns.clone(), self.profile.delimiter);
        Ok(builder.run(&self.output_dir())?)
    }

    pub fn headerless(&self) -> Result<Option<StageReport>> {
        if !self.profile.headerless_copies {
            return Ok(None);
        }
        Ok(Some(write_headerless_copies(
            &self.output_dir(),
            self.profile.delimiter,
        )?))
    }
}

/// Runs the stages of `range` for one release.
///
/// Recoverable problems end up in the stage reports. The first fatal error
/// stops the run.
pub fn run_release(
    config: &PipelineConfig,
    release: &str,
    range: StageRange,
) -> Result<ReleaseRun> {
    let _span = info_span!("release", release).entered();
    let mut pipeline = ReleasePipeline::new(config, release)?;
    let mut run = ReleaseRun {
        release: release.to_string(),
        output_dir: pipeline.output_dir(),
        reports: Vec::new(),
        parsed_manifest: None,
    };
    if range.from > Stage::Export {
        ensure_output_dir(&run.output_dir)?;
    }

    for stage in range.stages() {
        info!(%stage, "stage started");
        let report = match stage {
            Stage::Parse => {
                let (location, report) = pipeline.parse()?;
                run.parsed_manifest = Some(location);
                Some(report)
            }
            Stage::Export => Some(pipeline.export()?),
            Stage::Window => Some(pipeline.window()?),
            Stage::Exclude => Some(pipeline.exclude()?),
            Stage::Include => Some(pipeline.include()?),
            Stage::Summary => Some(pipeline.summary()?),
            Stage::Headerless => pipeline.headerless()?,
        };
        if let Some(report) = report {
            info!(
                %stage,
                written = report.written.len(),
                skipped = report.skipped.len(),
                "stage finished"
            );
            run.reports.push(report);
        }
    }
    Ok(run)
}

fn ensure_output_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        bail!(
            "release directory {} does not exist; run the export stage first",
            path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_range_is_inclusive() {
        let range = StageRange::new(Stage::Window, Stage::Include).unwrap();
        let stages: Vec<Stage> = range.stages().collect();
        assert_eq!(stages, vec![Stage::Window, Stage::Exclude, Stage::Include]);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let error = StageRange::new(Stage::Summary, Stage::Export).unwrap_err();
        assert_eq!(
            error.to_string(),
            "stage range is empty: 'summary' comes after 'export'"
        );
    }

    #[test]
    fn default_range_runs_everything() {
        assert_eq!(StageRange::default().stages().count(), Stage::ALL.len());
    }
}
