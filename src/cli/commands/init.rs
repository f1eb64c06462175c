//! CLI implementation for `pkgrecipe init` command

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use crate::cli::output::OutputConfig;
use crate::core::init::{init_recipe, InitOptions};

/// Execute the init command
pub async fn execute(
    path: &Path,
    name: Option<String>,
    force: bool,
    output: &OutputConfig,
) -> Result<()> {
    let options = InitOptions { name, force };
    let result = init_recipe(path, &options).with_context(|| "Failed to initialize recipe")?;

    output.print_json(&json!({
        "recipe": result.recipe_path,
        "name": result.name,
    }))?;
    output.print_success(&format!("Initialized recipe '{}' in {}", result.name, path.display()));
    output.print_detail(&format!("Created {}", result.recipe_path.display()));
    if result.gitignore_existed {
        output.print_detail("Updated .gitignore");
    } else {
        output.print_detail("Created .gitignore");
    }
    Ok(())
}
