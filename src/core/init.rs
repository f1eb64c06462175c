//! Recipe initialization logic
//!
//! Writes a starter `recipe.toml` and keeps the build and package output
//! directories out of version control.

use std::path::{Path, PathBuf};

use crate::config::defaults::{
    DEFAULT_BUILD_DIR, DEFAULT_PACKAGE_DIR, DEFAULT_RECIPE, DEFAULT_RECIPE_FILE,
};
use crate::core::recipe::Recipe;
use crate::core::resolver::is_valid_token;
use crate::error::InitError;

/// Marker comment for the pkgrecipe section in .gitignore
pub const GITIGNORE_MARKER: &str = "# pkgrecipe";

/// Name the built-in template is written for
const TEMPLATE_NAME: &str = "oomuse-flags";

/// Options for recipe initialization
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Package name (defaults to the template's)
    pub name: Option<String>,
    /// Overwrite an existing recipe
    pub force: bool,
}

/// Result of initialization
#[derive(Debug)]
pub struct InitResult {
    /// Path to the written recipe
    pub recipe_path: PathBuf,
    /// Package name in the recipe
    pub name: String,
    /// Whether an existing .gitignore was updated (false: created)
    pub gitignore_existed: bool,
}

/// Entries to add to .gitignore
pub fn gitignore_entries() -> Vec<String> {
    vec![format!("{DEFAULT_BUILD_DIR}/"), format!("{DEFAULT_PACKAGE_DIR}/")]
}

/// Recipe text for a package name
pub fn generate_recipe_content(name: Option<&str>) -> Result<String, InitError> {
    let Some(name) = name else {
        return Ok(DEFAULT_RECIPE.to_string());
    };
    if !is_valid_token(name) {
        return Err(InitError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(DEFAULT_RECIPE.replacen(
        &format!("name = \"{TEMPLATE_NAME}\""),
        &format!("name = \"{name}\""),
        1,
    ))
}

/// Generate .gitignore content for pkgrecipe
pub fn generate_gitignore_content() -> String {
    let mut content = String::from(GITIGNORE_MARKER);
    content.push('\n');
    for entry in gitignore_entries() {
        content.push_str(&entry);
        content.push('\n');
    }
    content
}

/// Append pkgrecipe entries to existing .gitignore content
pub fn append_gitignore_entries(existing: &str) -> String {
    if existing.contains(GITIGNORE_MARKER) {
        return existing.to_string();
    }

    let mut result = existing.to_string();
    if !result.is_empty() && !result.ends_with('\n') {
        result.push('\n');
    }
    if !result.is_empty() {
        result.push('\n');
    }
    result.push_str(&generate_gitignore_content());
    result
}

/// Write the recipe and .gitignore into `path`
pub fn init_recipe(path: &Path, options: &InitOptions) -> Result<InitResult, InitError> {
    if !path.is_dir() {
        return Err(InitError::DirectoryNotFound {
            path: path.to_path_buf(),
        });
    }
    let recipe_path = path.join(DEFAULT_RECIPE_FILE);
    if recipe_path.exists() && !options.force {
        return Err(InitError::RecipeExists { path: recipe_path });
    }

    let content = generate_recipe_content(options.name.as_deref())?;
    let recipe = Recipe::from_toml(&content).map_err(|e| InitError::IoError {
        path: recipe_path.clone(),
        error: e.to_string(),
    })?;
    let io_error = |path: &Path, e: std::io::Error| InitError::IoError {
        path: path.to_path_buf(),
        error: e.to_string(),
    };
    std::fs::write(&recipe_path, &content).map_err(|e| io_error(&recipe_path, e))?;

    let gitignore_path = path.join(".gitignore");
    let gitignore_existed = gitignore_path.exists();
    let gitignore = if gitignore_existed {
        let existing =
            std::fs::read_to_string(&gitignore_path).map_err(|e| io_error(&gitignore_path, e))?;
        append_gitignore_entries(&existing)
    } else {
        generate_gitignore_content()
    };
    std::fs::write(&gitignore_path, gitignore).map_err(|e| io_error(&gitignore_path, e))?;

    tracing::info!("Wrote {}", recipe_path.display());
    Ok(InitResult {
        recipe_path,
        name: recipe.package.name,
        gitignore_existed,
    })
}
