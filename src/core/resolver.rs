//! Requirement resolution
//!
//! Computes the upstream packages a build needs from the recipe's
//! declarations and the resolved options, and defines the boundary to the
//! dependency manager that fetches them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::options::OptionSet;
use crate::core::recipe::Recipe;
use crate::error::{OptionError, RequirementError};

/// Allowed characters for each reference component
const TOKEN_PATTERN: &str = r"^[A-Za-z0-9_][A-Za-z0-9_.+-]{0,50}$";

/// Check a name/user/channel component
pub fn is_valid_token(token: &str) -> bool {
    Regex::new(TOKEN_PATTERN).is_ok_and(|re| re.is_match(token))
}

/// Reference to an upstream package: `name/version@user/channel`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageReference {
    pub name: String,
    pub version: semver::Version,
    pub user: String,
    pub channel: String,
}

impl PackageReference {
    /// Cache-relative directory of this reference
    pub fn cache_path(&self) -> PathBuf {
        Path::new(&self.name)
            .join(self.version.to_string())
            .join(&self.user)
            .join(&self.channel)
    }
}

impl FromStr for PackageReference {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| RequirementError::InvalidReference {
            reference: s.to_string(),
            reason: reason.to_string(),
        };

        let (name_version, user_channel) = s
            .split_once('@')
            .ok_or_else(|| invalid("expected name/version@user/channel"))?;
        let (name, version) = name_version
            .split_once('/')
            .ok_or_else(|| invalid("expected name/version before '@'"))?;
        let (user, channel) = user_channel
            .split_once('/')
            .ok_or_else(|| invalid("expected user/channel after '@'"))?;

        for (label, token) in [("name", name), ("user", user), ("channel", channel)] {
            if !is_valid_token(token) {
                return Err(invalid(&format!("invalid {label} '{token}'")));
            }
        }
        let version = semver::Version::parse(version)
            .map_err(|e| invalid(&format!("invalid version '{version}': {e}")))?;

        Ok(Self {
            name: name.to_string(),
            version,
            user: user.to_string(),
            channel: channel.to_string(),
        })
    }
}

impl TryFrom<String> for PackageReference {
    type Error = RequirementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PackageReference> for String {
    fn from(value: PackageReference) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}/{}",
            self.name, self.version, self.user, self.channel
        )
    }
}

/// What the dependency manager does when a requirement is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildPolicy {
    /// Fetch, or build from source if no binary exists
    #[default]
    Missing,
    /// Never build from source; absent packages are an error
    Never,
}

impl fmt::Display for BuildPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing"),
            Self::Never => f.write_str("never"),
        }
    }
}

/// Requirement as declared in the recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementDecl {
    /// Upstream package
    pub reference: PackageReference,

    /// Option that must be true for this requirement to apply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,

    /// Options passed to the upstream package
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl RequirementDecl {
    /// Whether this requirement applies under the given options
    ///
    /// An undeclared condition option is an error, never a silent false.
    pub fn is_active(&self, options: &OptionSet) -> Result<bool, OptionError> {
        match &self.when {
            Some(option) => Ok(options.get(option)?.as_bool()),
            None => Ok(true),
        }
    }
}

/// A resolved requirement handed to the dependency manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    pub reference: PackageReference,
    pub options: BTreeMap<String, String>,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference)?;
        for (name, value) in &self.options {
            write!(f, " {}:{name}={value}", self.reference.name)?;
        }
        Ok(())
    }
}

/// Computes requirements from a recipe's declarations
#[derive(Debug)]
pub struct RequirementResolver<'a> {
    recipe: &'a Recipe,
}

impl<'a> RequirementResolver<'a> {
    /// Create a resolver for a recipe
    pub fn new(recipe: &'a Recipe) -> Self {
        Self { recipe }
    }

    /// Resolve the ordered requirement list for an option set
    ///
    /// Unconditional requirements come first, then active conditional ones;
    /// within each group declaration order is kept.
    pub fn resolve(&self, options: &OptionSet) -> Result<Vec<Requirement>, OptionError> {
        let (base, conditional): (Vec<_>, Vec<_>) = self
            .recipe
            .requires
            .iter()
            .partition(|decl| decl.when.is_none());

        let mut resolved = Vec::with_capacity(self.recipe.requires.len());
        for decl in base.into_iter().chain(conditional) {
            if !decl.is_active(options)? {
                tracing::debug!("Skipping inactive requirement {}", decl.reference);
                continue;
            }

            let mut dep_options = decl.options.clone();
            if let Some(overrides) = options.dependency_options(&decl.reference.name) {
                dep_options.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
            }

            resolved.push(Requirement {
                reference: decl.reference.clone(),
                options: dep_options,
            });
        }
        Ok(resolved)
    }
}

/// An installed upstream package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
    /// The requirement that produced this package
    pub reference: PackageReference,
    /// Package root (contains include/, lib/, bin/)
    pub root: PathBuf,
    /// Link names the package exposes
    pub libs: Vec<String>,
}

impl ResolvedDependency {
    pub fn include_dir(&self) -> PathBuf {
        self.root.join("include")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }
}

/// Boundary to the external dependency manager
///
/// Implementations receive every resolved requirement with the recipe's
/// build policy and either return an installed location for each or fail.
/// Failures are surfaced to the caller as-is; nothing here retries.
pub trait DependencyManager {
    fn install(
        &self,
        requirements: &[Requirement],
        policy: BuildPolicy,
    ) -> Result<Vec<ResolvedDependency>, RequirementError>;
}
