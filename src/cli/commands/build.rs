//! Build command implementation
//!
//! Implements `pkgrecipe build`: installs requirements from the local cache,
//! runs configure/build/test and packages the artifacts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::commands::RecipeArgs;
use crate::cli::output::OutputConfig;
use crate::core::builder::Tools;
use crate::core::pipeline::{Pipeline, PipelineConfig};
use crate::infra::cache::LocalCache;
use crate::infra::dirs::RecipeDirs;
use crate::infra::process::{check_tools, ProcessRunner};

/// Build options
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Native tool programs
    pub tools: Tools,
    /// Build directory override
    pub build_dir: Option<PathBuf>,
    /// Package directory override
    pub package_dir: Option<PathBuf>,
    /// Number of parallel jobs
    pub jobs: Option<usize>,
    /// Package cache root override
    pub cache_dir: Option<PathBuf>,
}

/// Execute the build command
pub async fn execute(
    cwd: &Path,
    args: &RecipeArgs,
    options: BuildOptions,
    output: &OutputConfig,
) -> Result<()> {
    let loaded = args.load(cwd)?;

    let mut config = PipelineConfig::new(loaded.recipe_dir.clone())
        .with_tools(options.tools)
        .with_jobs(Some(options.jobs.unwrap_or_else(num_cpus::get)));
    if let Some(dir) = options.build_dir {
        config = config.with_build_dir(cwd.join(dir));
    }
    if let Some(dir) = options.package_dir {
        config = config.with_package_dir(cwd.join(dir));
    }
    check_tools(&config.tools, loaded.options.testing())?;

    let cache_dir = options
        .cache_dir
        .map_or_else(|| RecipeDirs::new().cache_dir(), |dir| cwd.join(dir));
    let cache = LocalCache::new(cache_dir);
    let reference = format!("{}/{}", loaded.recipe.package.name, loaded.recipe.package.version);

    let report = tokio::task::spawn_blocking(move || {
        Pipeline::new(&loaded.recipe, &loaded.options, &loaded.settings).run(
            &config,
            &cache,
            &ProcessRunner::new(),
        )
    })
    .await
    .context("Build task panicked")?
    .with_context(|| format!("Failed to build {reference}"))?;

    output.print_json(&report)?;
    output.print_success(&format!("Built {reference}"));
    if let Some(link_name) = report.metadata.link_name() {
        output.print_detail(&format!("Link name: {link_name}"));
    }
    output.print_detail(&format!(
        "Packaged {} file(s) into {}",
        report.packaged.len(),
        report.package_dir.display()
    ));
    Ok(())
}
