//! Recipe (recipe.toml) parsing and validation
//!
//! The recipe is the immutable package descriptor: identity and license
//! metadata, option defaults, requirements, dependency imports and artifact
//! rules. It is loaded once per invocation and passed explicitly to every
//! stage of the pipeline.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::options::{self, OptionValue};
use crate::core::packaging::ArtifactRule;
use crate::core::resolver::{is_valid_token, BuildPolicy, RequirementDecl};
use crate::error::RecipeError;

/// The package recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    /// Package identity and metadata
    pub package: PackageDescriptor,

    /// Recipe-level option defaults
    #[serde(default)]
    pub options: BTreeMap<String, bool>,

    /// Upstream packages, optionally conditional on an option
    #[serde(default)]
    pub requires: Vec<RequirementDecl>,

    /// Files copied out of dependencies into the build tree
    #[serde(default)]
    pub imports: Vec<ArtifactRule>,

    /// Files copied out of the build tree into the package
    #[serde(default)]
    pub artifacts: Vec<ArtifactRule>,
}

/// Package identity and metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageDescriptor {
    /// Package name, also the base link name
    pub name: String,

    /// Package version (semver)
    pub version: String,

    /// Short description
    #[serde(default)]
    pub description: Option<String>,

    /// Author and contact
    #[serde(default)]
    pub author: Option<String>,

    /// License identifier
    #[serde(default)]
    pub license: Option<String>,

    /// Project URL
    #[serde(default)]
    pub url: Option<String>,

    /// Policy handed to the dependency manager for every requirement
    #[serde(default)]
    pub build_policy: BuildPolicy,

    /// Compile-time define enabling the test suite
    #[serde(default)]
    pub testing_define: Option<String>,
}

impl PackageDescriptor {
    /// Define passed to the configure step when testing is on
    ///
    /// Defaults to the upper-cased package name with a `_TESTING` suffix.
    pub fn testing_define(&self) -> String {
        self.testing_define.clone().unwrap_or_else(|| {
            format!(
                "{}_TESTING",
                self.name.to_uppercase().replace(['-', '.', '+'], "_")
            )
        })
    }
}

impl Recipe {
    /// Parse and validate a recipe from TOML text
    pub fn from_toml(content: &str) -> Result<Self, RecipeError> {
        let recipe: Self = toml::from_str(content).map_err(|e| RecipeError::Parse {
            path: Path::new("<recipe>").to_path_buf(),
            error: e.to_string(),
        })?;
        recipe.validate()?;
        Ok(recipe)
    }

    /// Load, parse and validate a recipe file
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        if !path.is_file() {
            return Err(RecipeError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| RecipeError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        let recipe: Self = toml::from_str(&content).map_err(|e| RecipeError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        recipe.validate()?;
        tracing::info!(
            "Loaded recipe {}/{} from {}",
            recipe.package.name,
            recipe.package.version,
            path.display()
        );
        Ok(recipe)
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String, RecipeError> {
        toml::to_string_pretty(self).map_err(|e| RecipeError::Invalid {
            field: "recipe".to_string(),
            message: e.to_string(),
        })
    }

    /// Check every cross-reference eagerly
    ///
    /// Option names used anywhere must be declared, references must be
    /// unique per package name, and artifact patterns must compile.
    pub fn validate(&self) -> Result<(), RecipeError> {
        let invalid = |field: &str, message: String| RecipeError::Invalid {
            field: field.to_string(),
            message,
        };

        if !is_valid_token(&self.package.name) {
            return Err(invalid(
                "package.name",
                format!("'{}' is not a valid package name", self.package.name),
            ));
        }
        semver::Version::parse(&self.package.version).map_err(|e| {
            invalid(
                "package.version",
                format!("'{}' is not a semantic version: {e}", self.package.version),
            )
        })?;

        for name in self.options.keys() {
            options::require_declared(name)
                .map_err(|e| invalid(&format!("options.{name}"), e.to_string()))?;
        }

        let mut seen = HashSet::new();
        for (index, decl) in self.requires.iter().enumerate() {
            if !seen.insert(decl.reference.name.as_str()) {
                return Err(invalid(
                    &format!("requires[{index}]"),
                    format!("'{}' is required more than once", decl.reference.name),
                ));
            }
            if let Some(option) = &decl.when {
                options::require_declared(option)
                    .map_err(|e| invalid(&format!("requires[{index}].when"), e.to_string()))?;
            }
        }

        for (table, rules) in [("imports", &self.imports), ("artifacts", &self.artifacts)] {
            for (index, rule) in rules.iter().enumerate() {
                rule.validate()
                    .map_err(|message| invalid(&format!("{table}[{index}]"), message))?;
            }
        }

        Ok(())
    }

    /// Recipe-level default for an option, if set
    pub fn option_default(&self, name: &str) -> Option<OptionValue> {
        self.options.get(name).copied().map(OptionValue::from)
    }

    /// Whether any requirement (active or not) has this package name
    pub fn declares_requirement(&self, name: &str) -> bool {
        self.requires.iter().any(|decl| decl.reference.name == name)
    }
}
