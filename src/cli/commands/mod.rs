//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod info;
pub mod init;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::output::OutputConfig;
use crate::config::defaults::{DEFAULT_CMAKE, DEFAULT_CTEST, DEFAULT_RECIPE_FILE};
use crate::core::builder::Tools;
use crate::core::options::{parse_assignment, OptionOverrides, OptionSet};
use crate::core::profile::Profile;
use crate::core::recipe::Recipe;
use crate::core::settings::PlatformSettings;
use crate::infra::dirs::RecipeDirs;

/// Recipe, profile, option and setting selection shared by commands
#[derive(Args, Debug, Clone)]
pub struct RecipeArgs {
    /// Path to the recipe file
    #[arg(short, long, default_value = DEFAULT_RECIPE_FILE)]
    pub recipe: PathBuf,

    /// Option override: name=value, or pkg:name=value for a dependency
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Setting override: os, compiler, compiler.version, build_type, arch
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Profile name (under the profiles directory) or path
    #[arg(short, long)]
    pub profile: Option<String>,
}

/// A loaded recipe with its resolved options and settings
#[derive(Debug, Clone)]
pub struct LoadedRecipe {
    pub recipe_dir: PathBuf,
    pub recipe: Recipe,
    pub options: OptionSet,
    pub settings: PlatformSettings,
}

impl RecipeArgs {
    /// Load the recipe and profile, then resolve options and settings
    pub fn load(&self, cwd: &Path) -> Result<LoadedRecipe> {
        let recipe_path = cwd.join(&self.recipe);
        let recipe = Recipe::load(&recipe_path)?;
        let recipe_dir = recipe_path
            .parent()
            .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);

        let dirs = RecipeDirs::new();
        let profile = match &self.profile {
            Some(name) => {
                let path = cwd.join(dirs.profile_path(name));
                Profile::load(&path).with_context(|| format!("Failed to load profile '{name}'"))?
            }
            None => Profile::load_or_default(&dirs.default_profile_path())?,
        };

        let cli_settings = self
            .settings
            .iter()
            .map(|raw| parse_assignment(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let settings = PlatformSettings::resolve(&cli_settings, &profile.settings_map()?)?;

        let cli_options = OptionOverrides::parse(&self.options)?;
        let options = OptionSet::resolve(&recipe, &cli_options, &profile.option_overrides()?)?;

        Ok(LoadedRecipe {
            recipe_dir,
            recipe,
            options,
            settings,
        })
    }
}

/// Native tool selection
#[derive(Args, Debug, Clone)]
pub struct ToolArgs {
    /// CMake program used for configure and build
    #[arg(long, env = "PKGRECIPE_CMAKE", default_value = DEFAULT_CMAKE)]
    pub cmake: String,

    /// CTest program used for the test step
    #[arg(long, env = "PKGRECIPE_CTEST", default_value = DEFAULT_CTEST)]
    pub ctest: String,
}

impl From<ToolArgs> for Tools {
    fn from(args: ToolArgs) -> Self {
        Self {
            cmake: args.cmake,
            ctest: args.ctest,
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter recipe.toml into the current directory
    Init {
        /// Package name (defaults to the template's)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite an existing recipe
        #[arg(short, long)]
        force: bool,
    },

    /// Show resolved options, settings, requirements and planned commands
    Info {
        #[command(flatten)]
        recipe: RecipeArgs,

        #[command(flatten)]
        tools: ToolArgs,
    },

    /// Install requirements, build, test and package
    Build {
        #[command(flatten)]
        recipe: RecipeArgs,

        #[command(flatten)]
        tools: ToolArgs,

        /// Build directory (defaults to build/ next to the recipe)
        #[arg(long)]
        build_dir: Option<PathBuf>,

        /// Package directory (defaults to package/ next to the recipe)
        #[arg(long)]
        package_dir: Option<PathBuf>,

        /// Number of parallel build jobs (defaults to CPU count)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Package cache root
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
}

impl Commands {
    /// Execute the command
    pub async fn run(self, output: &OutputConfig) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        match self {
            Self::Init { name, force } => init::execute(&current_dir, name, force, output).await,
            Self::Info { recipe, tools } => {
                info::execute(&current_dir, &recipe, tools.into(), output).await
            }
            Self::Build {
                recipe,
                tools,
                build_dir,
                package_dir,
                jobs,
                cache_dir,
            } => {
                let options = build::BuildOptions {
                    tools: tools.into(),
                    build_dir,
                    package_dir,
                    jobs,
                    cache_dir,
                };
                build::execute(&current_dir, &recipe, options, output).await
            }
        }
    }
}
