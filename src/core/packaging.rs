//! Artifact selection and packaging
//!
//! Artifact rules are glob-based copy instructions evaluated in order. The
//! same rule engine copies runtime libraries out of dependencies (imports)
//! and build outputs into the package layout consumed downstream:
//!
//! - `include/` headers, directory structure preserved
//! - `lib/` static libraries and, conditionally, debug symbols, flattened
//! - `package_info.toml` link names, settings and options of the build
//! - `manifest.txt` sha256 of every packaged file

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::config::defaults::{MANIFEST_FILE, PACKAGE_INFO_FILE};
use crate::core::options::{self, OptionSet};
use crate::core::recipe::Recipe;
use crate::core::settings::{BuildType, CompilerName, PlatformSettings};
use crate::error::{OptionError, PackagingError, PkgRecipeError};

fn default_keep_path() -> bool {
    true
}

/// Applicability predicate of a rule; every present field must hold
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleCondition {
    /// Option that must be true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,

    /// Compiler the build must use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<CompilerName>,
}

impl RuleCondition {
    /// Evaluate against settings and options
    ///
    /// The option is looked up even when the compiler predicate already
    /// fails, so an undeclared option is always reported.
    pub fn holds(
        &self,
        settings: &PlatformSettings,
        options: &OptionSet,
    ) -> Result<bool, OptionError> {
        let option_holds = match &self.option {
            Some(name) => options.get(name)?.as_bool(),
            None => true,
        };
        let compiler_holds = self
            .compiler
            .map_or(true, |compiler| compiler == settings.compiler.name);
        Ok(option_holds && compiler_holds)
    }
}

/// One copy instruction: files matching `pattern` under `src` go to `dst`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRule {
    /// Glob matched against paths relative to `src`; `*` crosses directories
    pub pattern: String,

    /// Directory relative to the search root
    #[serde(default)]
    pub src: String,

    /// Destination directory relative to the target root
    pub dst: String,

    /// Keep the matched file's subdirectories (false flattens)
    #[serde(default = "default_keep_path")]
    pub keep_path: bool,

    /// Applicability predicate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<RuleCondition>,

    /// Fail when nothing matches
    #[serde(default)]
    pub required: bool,
}

/// A selected file and where it lands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactCopy {
    /// Absolute source path
    pub source: PathBuf,
    /// Destination relative to the target root
    pub dest: PathBuf,
}

impl ArtifactRule {
    /// Create an unconditional rule
    pub fn new(pattern: &str, src: &str, dst: &str, keep_path: bool) -> Self {
        Self {
            pattern: pattern.to_string(),
            src: src.to_string(),
            dst: dst.to_string(),
            keep_path,
            when: None,
            required: false,
        }
    }

    /// Attach an applicability predicate
    #[must_use]
    pub fn when(mut self, condition: RuleCondition) -> Self {
        self.when = Some(condition);
        self
    }

    /// Mark the rule as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Static checks run when the recipe loads
    pub fn validate(&self) -> Result<(), String> {
        self.compile().map_err(|e| e.to_string())?;
        for (field, value) in [("src", &self.src), ("dst", &self.dst)] {
            if !is_contained(Path::new(value)) {
                return Err(format!("{field} '{value}' must be a relative path inside the root"));
            }
        }
        if let Some(option) = self.when.as_ref().and_then(|c| c.option.as_deref()) {
            options::require_declared(option).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// Whether this rule applies to the current build
    pub fn applies(
        &self,
        settings: &PlatformSettings,
        options: &OptionSet,
    ) -> Result<bool, OptionError> {
        match &self.when {
            Some(condition) => condition.holds(settings, options),
            None => Ok(true),
        }
    }

    fn compile(&self) -> Result<GlobMatcher, PackagingError> {
        GlobBuilder::new(&self.pattern)
            .literal_separator(false)
            .build()
            .map(|glob| glob.compile_matcher())
            .map_err(|e| PackagingError::InvalidPattern {
                pattern: self.pattern.clone(),
                error: e.to_string(),
            })
    }

    /// Directory this rule searches under `root`
    pub fn search_dir(&self, root: &Path) -> PathBuf {
        if self.src.is_empty() {
            root.to_path_buf()
        } else {
            root.join(&self.src)
        }
    }

    /// Find matching files under `root`, in file-name order
    pub fn collect(&self, root: &Path) -> Result<Vec<ArtifactCopy>, PackagingError> {
        let base = self.search_dir(root);
        if !base.is_dir() {
            return Ok(Vec::new());
        }
        let matcher = self.compile()?;
        let dst = Path::new(&self.dst);

        let mut copies = Vec::new();
        for entry in WalkDir::new(&base).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| PackagingError::Io {
                path: base.clone(),
                error: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&base).unwrap_or(entry.path());
            if !matcher.is_match(relative) {
                continue;
            }
            let dest = if self.keep_path {
                dst.join(relative)
            } else {
                dst.join(entry.file_name())
            };
            copies.push(ArtifactCopy {
                source: entry.path().to_path_buf(),
                dest,
            });
        }
        Ok(copies)
    }
}

fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Evaluate rules in order and collect their matches under `root`
///
/// When two matches land on the same destination the later one wins; the
/// collision is logged.
pub fn select_matches(
    rules: &[ArtifactRule],
    root: &Path,
    settings: &PlatformSettings,
    options: &OptionSet,
) -> Result<Vec<ArtifactCopy>, PkgRecipeError> {
    let mut selected = Vec::new();
    let mut destinations: HashMap<PathBuf, PathBuf> = HashMap::new();

    for rule in rules {
        if !rule.applies(settings, options)? {
            tracing::debug!("Rule '{}' -> {} not applicable, skipping", rule.pattern, rule.dst);
            continue;
        }

        let copies = rule.collect(root)?;
        if copies.is_empty() && rule.required {
            return Err(PackagingError::MissingArtifact {
                pattern: rule.pattern.clone(),
                root: rule.search_dir(root),
            }
            .into());
        }
        tracing::debug!("Rule '{}' matched {} file(s)", rule.pattern, copies.len());

        for copy in copies {
            if let Some(previous) = destinations.insert(copy.dest.clone(), copy.source.clone()) {
                if previous != copy.source {
                    tracing::warn!(
                        "{} overwrites {} at {}",
                        copy.source.display(),
                        previous.display(),
                        copy.dest.display()
                    );
                }
            }
            selected.push(copy);
        }
    }
    Ok(selected)
}

/// Link information a consumer needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Libraries to link, in order
    #[serde(default)]
    pub libs: Vec<String>,
}

impl PackageMetadata {
    /// The link name of a single-library package
    pub fn link_name(&self) -> Option<&str> {
        self.libs.first().map(String::as_str)
    }
}

/// Link name for a package under a build type
///
/// Debug builds link `<package>-debug`; every other build type links the
/// base name.
pub fn compute_metadata(package: &str, settings: &PlatformSettings) -> PackageMetadata {
    let link_name = match settings.build_type {
        BuildType::Debug => format!("{package}-debug"),
        BuildType::Release => package.to_string(),
        other @ (BuildType::RelWithDebInfo | BuildType::MinSizeRel) => {
            tracing::debug!("Build type {other} links the release name '{package}'");
            package.to_string()
        }
    };
    PackageMetadata {
        libs: vec![link_name],
    }
}

/// Selects a recipe's artifacts and computes its consumer metadata
#[derive(Debug)]
pub struct PackagingSelector<'a> {
    recipe: &'a Recipe,
}

impl<'a> PackagingSelector<'a> {
    pub fn new(recipe: &'a Recipe) -> Self {
        Self { recipe }
    }

    /// Ordered (source, dest) pairs for the package layout
    pub fn select_artifacts(
        &self,
        build_output_dir: &Path,
        settings: &PlatformSettings,
        options: &OptionSet,
    ) -> Result<Vec<ArtifactCopy>, PkgRecipeError> {
        select_matches(&self.recipe.artifacts, build_output_dir, settings, options)
    }

    pub fn compute_metadata(&self, settings: &PlatformSettings) -> PackageMetadata {
        compute_metadata(&self.recipe.package.name, settings)
    }
}

/// Copy selected files under `target_root`, returning destinations in order
pub fn copy_artifacts(
    copies: &[ArtifactCopy],
    target_root: &Path,
) -> Result<Vec<PathBuf>, PackagingError> {
    let mut written: Vec<PathBuf> = Vec::new();
    for copy in copies {
        let dest = target_root.join(&copy.dest);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| PackagingError::Io {
                path: parent.to_path_buf(),
                error: e.to_string(),
            })?;
        }
        fs::copy(&copy.source, &dest).map_err(|e| PackagingError::Io {
            path: dest.clone(),
            error: e.to_string(),
        })?;
        tracing::debug!("Copied {} -> {}", copy.source.display(), dest.display());
        if !written.contains(&copy.dest) {
            written.push(copy.dest.clone());
        }
    }
    Ok(written)
}

/// Package identity recorded in `package_info.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Contents of `package_info.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// References this package was built against
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub package: PackageSummary,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    #[serde(default)]
    pub cpp_info: PackageMetadata,
}

impl PackageInfo {
    /// Describe a finished build
    pub fn new(
        recipe: &Recipe,
        settings: &PlatformSettings,
        options: &OptionSet,
        requires: Vec<String>,
        metadata: PackageMetadata,
    ) -> Self {
        Self {
            requires,
            package: PackageSummary {
                name: recipe.package.name.clone(),
                version: recipe.package.version.clone(),
                license: recipe.package.license.clone(),
                url: recipe.package.url.clone(),
            },
            settings: settings.to_map(),
            options: options.to_map(),
            cpp_info: metadata,
        }
    }

    /// Read `package_info.toml` from a package root
    pub fn load(package_dir: &Path) -> Result<Self, String> {
        let path = package_dir.join(PACKAGE_INFO_FILE);
        let content = fs::read_to_string(&path).map_err(|e| format!("{}: {e}", path.display()))?;
        toml::from_str(&content).map_err(|e| format!("{}: {e}", path.display()))
    }

    /// Write `package_info.toml` into a package root
    pub fn write(&self, package_dir: &Path) -> Result<PathBuf, PackagingError> {
        let path = package_dir.join(PACKAGE_INFO_FILE);
        let content = toml::to_string_pretty(self).map_err(|e| PackagingError::Serialize {
            error: e.to_string(),
        })?;
        fs::write(&path, content).map_err(|e| PackagingError::Io {
            path: path.clone(),
            error: e.to_string(),
        })?;
        Ok(path)
    }
}

/// Write `manifest.txt`: one `path: sha256` line per file, sorted by path
pub fn write_manifest(package_dir: &Path, files: &[PathBuf]) -> Result<PathBuf, PackagingError> {
    let mut sorted: Vec<&PathBuf> = files.iter().collect();
    sorted.sort();
    sorted.dedup();

    let path = package_dir.join(MANIFEST_FILE);
    let mut out = fs::File::create(&path).map_err(|e| PackagingError::Io {
        path: path.clone(),
        error: e.to_string(),
    })?;
    for file in sorted {
        let full = package_dir.join(file);
        let data = fs::read(&full).map_err(|e| PackagingError::Io {
            path: full.clone(),
            error: e.to_string(),
        })?;
        let digest = hex::encode(Sha256::digest(&data));
        let display = file.to_string_lossy().replace('\\', "/");
        writeln!(out, "{display}: {digest}").map_err(|e| PackagingError::Io {
            path: path.clone(),
            error: e.to_string(),
        })?;
    }
    Ok(path)
}
