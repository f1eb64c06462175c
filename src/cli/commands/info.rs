//! Info command implementation
//!
//! Implements `pkgrecipe info`: evaluates the recipe under the selected
//! options and settings and shows what a build would do, without installing
//! anything or starting any process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::cli::commands::RecipeArgs;
use crate::cli::output::OutputConfig;
use crate::core::builder::{BuildStep, Tools};
use crate::core::options::ResolvedOption;
use crate::core::pipeline::{Pipeline, PipelineConfig};

/// Applicability of one artifact rule
#[derive(Debug, Serialize)]
struct RuleSummary {
    pattern: String,
    dst: String,
    keep_path: bool,
    applies: bool,
}

/// Everything `info` reports
#[derive(Debug, Serialize)]
struct InfoReport {
    name: String,
    version: String,
    recipe_dir: PathBuf,
    settings: BTreeMap<String, String>,
    options: BTreeMap<String, ResolvedOption>,
    requirements: Vec<String>,
    steps: Vec<BuildStep>,
    link_name: Option<String>,
    artifacts: Vec<RuleSummary>,
}

/// Execute the info command
pub async fn execute(
    cwd: &Path,
    args: &RecipeArgs,
    tools: Tools,
    output: &OutputConfig,
) -> Result<()> {
    let loaded = args.load(cwd)?;
    let config = PipelineConfig::new(loaded.recipe_dir.clone()).with_tools(tools);
    let pipeline = Pipeline::new(&loaded.recipe, &loaded.options, &loaded.settings);
    let plan = pipeline.plan(&config)?;

    let artifacts = loaded
        .recipe
        .artifacts
        .iter()
        .map(|rule| -> Result<RuleSummary> {
            Ok(RuleSummary {
                pattern: rule.pattern.clone(),
                dst: rule.dst.clone(),
                keep_path: rule.keep_path,
                applies: rule.applies(&loaded.settings, &loaded.options)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let report = InfoReport {
        name: loaded.recipe.package.name.clone(),
        version: loaded.recipe.package.version.clone(),
        recipe_dir: loaded.recipe_dir.clone(),
        settings: loaded.settings.to_map(),
        options: loaded
            .options
            .entries()
            .into_iter()
            .map(|(name, resolved)| (name.to_string(), resolved))
            .collect(),
        requirements: plan.requirements.iter().map(ToString::to_string).collect(),
        steps: plan.invocation.steps().to_vec(),
        link_name: plan.metadata.link_name().map(ToString::to_string),
        artifacts,
    };

    if output.json {
        return output.print_json(&report);
    }

    output.print_line(&format!("{}/{}", report.name, report.version));
    if let Some(description) = &loaded.recipe.package.description {
        output.print_detail(description);
    }

    output.print_line("\nSettings:");
    for (key, value) in &report.settings {
        output.print_detail(&format!("{key} = {value}"));
    }

    output.print_line("\nOptions:");
    for (name, resolved) in &report.options {
        output.print_detail(&format!("{name} = {} ({:?})", resolved.value, resolved.source));
    }

    output.print_line("\nRequirements:");
    if report.requirements.is_empty() {
        output.print_detail("(none)");
    }
    for requirement in &report.requirements {
        output.print_detail(requirement);
    }

    output.print_line("\nBuild steps:");
    for step in &report.steps {
        output.print_detail(&format!("{}: {}", step.kind, step.command.display_line()));
    }

    output.print_line("\nPackage:");
    if let Some(link_name) = &report.link_name {
        output.print_detail(&format!("link name: {link_name}"));
    }
    for rule in &report.artifacts {
        let layout = if rule.keep_path { "keep path" } else { "flatten" };
        let state = if rule.applies { "" } else { " (skipped)" };
        output.print_detail(&format!("{} -> {}/ [{layout}]{state}", rule.pattern, rule.dst));
    }
    Ok(())
}
