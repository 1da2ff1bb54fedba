use std::path::Path;

use anyhow::Result;
use release_cli::config::PipelineConfig;
use release_cli::pipeline::{ReleasePipeline, ReleaseRun, StageRange, run_release};
use release_export::ResolvedPlan;
use release_model::RequestManifest;
use tracing::info;

use crate::cli::RunArgs;

pub fn run(config_path: &Path, args: &RunArgs) -> Result<ReleaseRun> {
    let mut config = PipelineConfig::load(config_path)?;
    let range = StageRange::new(args.from.into(), args.to.into())?;
    let run = run_release(&config, &args.release, range)?;
    if let Some(location) = &run.parsed_manifest {
        register(&mut config, config_path, &args.release, location)?;
    }
    Ok(run)
}

pub fn parse(config_path: &Path, release: &str) -> Result<RequestManifest> {
    let mut config = PipelineConfig::load(config_path)?;
    let (location, manifest) = {
        let mut pipeline = ReleasePipeline::new(&config, release)?;
        let (location, _) = pipeline.parse()?;
        (location, pipeline.manifest()?.clone())
    };
    register(&mut config, config_path, release, &location)?;
    Ok(manifest)
}

pub fn plan(config_path: &Path, release: &str) -> Result<ResolvedPlan> {
    let config = PipelineConfig::load(config_path)?;
    let mut pipeline = ReleasePipeline::new(&config, release)?;
    pipeline.plan()
}

fn register(
    config: &mut PipelineConfig,
    config_path: &Path,
    release: &str,
    location: &Path,
) -> Result<()> {
    let already = config
        .release(release)?
        .manifest
        .as_deref()
        .is_some_and(|current| current == location);
    if already {
        return Ok(());
    }
    config.register_manifest(release, location.to_path_buf())?;
    config.save(config_path)?;
    info!(release, manifest = %location.display(), "manifest registered");
    Ok(())
}
