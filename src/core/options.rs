//! Option model
//!
//! Declares the recognized build options and resolves their values with
//! priority: CLI > Profile > Recipe > Declared default. Every override is
//! validated against the option's domain when the [`OptionSet`] is built,
//! so a bad value fails before any external process runs.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::core::recipe::Recipe;
use crate::error::OptionError;

/// Name of the option that gates the test step and the test-framework requirement
pub const OPTION_TESTING: &str = "testing";

/// Name of the option that includes debug-symbol files in the package
pub const OPTION_INCLUDE_PDBS: &str = "include_pdbs";

/// Domain shared by all boolean options
pub const BOOL_DOMAIN: &[&str] = &["False", "True"];

/// Static declaration of a recognized option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDeclaration {
    /// Option name
    pub name: &'static str,
    /// Allowed values
    pub domain: &'static [&'static str],
    /// Default value
    pub default: OptionValue,
    /// One-line description
    pub description: &'static str,
}

/// Every option this tool recognizes, in declaration order
pub const OPTION_DECLARATIONS: &[OptionDeclaration] = &[
    OptionDeclaration {
        name: OPTION_INCLUDE_PDBS,
        domain: BOOL_DOMAIN,
        default: OptionValue::False,
        description: "Package separate debug-symbol files (Visual Studio only)",
    },
    OptionDeclaration {
        name: OPTION_TESTING,
        domain: BOOL_DOMAIN,
        default: OptionValue::False,
        description: "Build and run the test suite before packaging",
    },
];

/// Look up an option declaration by name
pub fn declaration(name: &str) -> Option<&'static OptionDeclaration> {
    OPTION_DECLARATIONS.iter().find(|decl| decl.name == name)
}

/// Look up an option declaration, failing on undeclared names
pub fn require_declared(name: &str) -> Result<&'static OptionDeclaration, OptionError> {
    declaration(name).ok_or_else(|| OptionError::Undeclared {
        name: name.to_string(),
    })
}

/// Value of a `{False, True}` option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OptionValue {
    False,
    True,
}

impl OptionValue {
    /// Parse a raw override for the named option
    ///
    /// Accepts the domain members and their lowercase spellings.
    pub fn parse(name: &str, raw: &str) -> Result<Self, OptionError> {
        match raw.trim() {
            "True" | "true" => Ok(Self::True),
            "False" | "false" => Ok(Self::False),
            other => Err(OptionError::InvalidValue {
                name: name.to_string(),
                value: other.to_string(),
                domain: BOOL_DOMAIN.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    pub fn as_bool(self) -> bool {
        matches!(self, Self::True)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::True => "True",
            Self::False => "False",
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option value source for resolution priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSource {
    /// Value from CLI argument (highest priority)
    Cli,
    /// Value from the profile file
    Profile,
    /// Value from the recipe's `[options]` table
    Recipe,
    /// Declared default (lowest priority)
    Default,
}

/// Resolved option value with its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedOption {
    /// The resolved value
    pub value: OptionValue,
    /// Where the value came from
    pub source: OptionSource,
}

/// Resolve one option with priority: CLI > Profile > Recipe > Default
///
/// Each raw override is validated against the declaration, even ones that
/// are shadowed by a higher-priority source.
pub fn resolve_option_value(
    declaration: &OptionDeclaration,
    cli_value: Option<&str>,
    profile_value: Option<&str>,
    recipe_value: Option<OptionValue>,
) -> Result<ResolvedOption, OptionError> {
    let cli = cli_value
        .map(|raw| OptionValue::parse(declaration.name, raw))
        .transpose()?;
    let profile = profile_value
        .map(|raw| OptionValue::parse(declaration.name, raw))
        .transpose()?;

    let resolved = if let Some(value) = cli {
        ResolvedOption {
            value,
            source: OptionSource::Cli,
        }
    } else if let Some(value) = profile {
        ResolvedOption {
            value,
            source: OptionSource::Profile,
        }
    } else if let Some(value) = recipe_value {
        ResolvedOption {
            value,
            source: OptionSource::Recipe,
        }
    } else {
        ResolvedOption {
            value: declaration.default,
            source: OptionSource::Default,
        }
    };
    Ok(resolved)
}

/// Split `name=value` into its parts
pub fn parse_assignment(raw: &str) -> Result<(String, String), OptionError> {
    let malformed = || OptionError::MalformedAssignment {
        raw: raw.to_string(),
    };
    let (name, value) = raw.split_once('=').ok_or_else(malformed)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(malformed());
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Raw option overrides from one source
///
/// Plain `name=value` entries target this package; `pkg:name=value` entries
/// are scoped to a dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    package: BTreeMap<String, String>,
    scoped: BTreeMap<String, BTreeMap<String, String>>,
}

impl OptionOverrides {
    /// Create an empty override set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse CLI-style `name=value` / `pkg:name=value` assignments
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self, OptionError> {
        let pairs = raw
            .iter()
            .map(|item| parse_assignment(item.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_pairs(pairs))
    }

    /// Build from already split key/value pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut overrides = Self::new();
        for (key, value) in pairs {
            match key.split_once(':') {
                Some((scope, name)) => {
                    overrides
                        .scoped
                        .entry(scope.to_string())
                        .or_default()
                        .insert(name.to_string(), value);
                }
                None => {
                    overrides.package.insert(key, value);
                }
            }
        }
        overrides
    }

    /// Overrides targeting this package
    pub fn package(&self) -> &BTreeMap<String, String> {
        &self.package
    }

    /// Overrides scoped to dependencies
    pub fn scoped(&self) -> &BTreeMap<String, BTreeMap<String, String>> {
        &self.scoped
    }

    pub fn is_empty(&self) -> bool {
        self.package.is_empty() && self.scoped.is_empty()
    }
}

/// Resolved, immutable option values for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    include_pdbs: ResolvedOption,
    testing: ResolvedOption,
    dependency_options: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for OptionSet {
    fn default() -> Self {
        let default_of = |name: &str| ResolvedOption {
            value: declaration(name).map_or(OptionValue::False, |decl| decl.default),
            source: OptionSource::Default,
        };
        Self {
            include_pdbs: default_of(OPTION_INCLUDE_PDBS),
            testing: default_of(OPTION_TESTING),
            dependency_options: BTreeMap::new(),
        }
    }
}

impl OptionSet {
    /// Construct directly from values, recorded as CLI-sourced
    pub fn new(include_pdbs: bool, testing: bool) -> Self {
        let cli = |value: bool| ResolvedOption {
            value: value.into(),
            source: OptionSource::Cli,
        };
        Self {
            include_pdbs: cli(include_pdbs),
            testing: cli(testing),
            dependency_options: BTreeMap::new(),
        }
    }

    /// Merge recipe defaults, profile and CLI overrides into a validated set
    ///
    /// Fails on undeclared option names, out-of-domain values, and scoped
    /// overrides that name no requirement of the recipe.
    pub fn resolve(
        recipe: &Recipe,
        cli: &OptionOverrides,
        profile: &OptionOverrides,
    ) -> Result<Self, OptionError> {
        for name in cli.package().keys().chain(profile.package().keys()) {
            require_declared(name)?;
        }

        let resolve_one = |name: &str| -> Result<ResolvedOption, OptionError> {
            let decl = require_declared(name)?;
            resolve_option_value(
                decl,
                cli.package().get(name).map(String::as_str),
                profile.package().get(name).map(String::as_str),
                recipe.option_default(name),
            )
        };

        let include_pdbs = resolve_one(OPTION_INCLUDE_PDBS)?;
        let testing = resolve_one(OPTION_TESTING)?;

        let mut dependency_options: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for scoped in [profile.scoped(), cli.scoped()] {
            for (scope, values) in scoped {
                if !recipe.declares_requirement(scope) {
                    return Err(OptionError::UnknownScope {
                        scope: scope.clone(),
                    });
                }
                dependency_options
                    .entry(scope.clone())
                    .or_default()
                    .extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        let set = Self {
            include_pdbs,
            testing,
            dependency_options,
        };
        tracing::debug!("Resolved options: {}", set.summary());
        Ok(set)
    }

    /// Get an option value by name
    pub fn get(&self, name: &str) -> Result<OptionValue, OptionError> {
        self.resolved(name).map(|resolved| resolved.value)
    }

    /// Get an option value and its source by name
    pub fn resolved(&self, name: &str) -> Result<ResolvedOption, OptionError> {
        match name {
            OPTION_INCLUDE_PDBS => Ok(self.include_pdbs),
            OPTION_TESTING => Ok(self.testing),
            _ => Err(OptionError::Undeclared {
                name: name.to_string(),
            }),
        }
    }

    pub fn testing(&self) -> bool {
        self.testing.value.as_bool()
    }

    pub fn include_pdbs(&self) -> bool {
        self.include_pdbs.value.as_bool()
    }

    /// Dependency option overrides for a requirement name
    pub fn dependency_options(&self, package: &str) -> Option<&BTreeMap<String, String>> {
        self.dependency_options.get(package)
    }

    /// All options in declaration order
    pub fn entries(&self) -> Vec<(&'static str, ResolvedOption)> {
        OPTION_DECLARATIONS
            .iter()
            .filter_map(|decl| self.resolved(decl.name).ok().map(|r| (decl.name, r)))
            .collect()
    }

    /// Options as `name -> value` strings
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries()
            .into_iter()
            .map(|(name, resolved)| (name.to_string(), resolved.value.to_string()))
            .collect()
    }

    fn summary(&self) -> String {
        self.entries()
            .iter()
            .map(|(name, resolved)| format!("{name}={}", resolved.value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
