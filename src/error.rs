//! Error types for pkgrecipe
//!
//! Domain-specific error types using thiserror. Each enum covers one stage of
//! the pipeline so a caller can tell which step failed without re-running it.

use std::path::PathBuf;
use thiserror::Error;

/// Recipe initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// Directory not found
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// A recipe already exists
    #[error("Recipe already exists: {path}. Use --force to overwrite it")]
    RecipeExists { path: PathBuf },

    /// Package name is not a valid reference token
    #[error("'{name}' is not a valid package name")]
    InvalidName { name: String },

    /// IO error during initialization
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },
}

/// Option and settings errors
///
/// Every variant is raised before any external process starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// Option is not declared
    #[error("Option '{name}' is not declared by this recipe")]
    Undeclared { name: String },

    /// Override value outside the option's domain
    #[error("Option '{name}' has invalid value '{value}': must be one of {domain:?}")]
    InvalidValue {
        name: String,
        value: String,
        domain: Vec<String>,
    },

    /// Override is not of the form name=value
    #[error("Malformed assignment '{raw}': expected name=value")]
    MalformedAssignment { raw: String },

    /// Dependency option scope names no declared requirement
    #[error("Option scope '{scope}' does not name a requirement of this recipe")]
    UnknownScope { scope: String },

    /// Unknown settings key
    #[error("Unknown setting '{key}'")]
    UnknownSetting { key: String },

    /// Settings value outside the setting's domain
    #[error("Setting '{key}' has invalid value '{value}': must be one of {choices:?}")]
    InvalidSetting {
        key: String,
        value: String,
        choices: Vec<String>,
    },

    /// Setting required to evaluate a rule is missing
    #[error("Setting '{key}' is required but not set")]
    MissingSetting { key: String },
}

/// Recipe descriptor errors
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Recipe file not found
    #[error("Recipe not found at '{path}'. Run 'pkgrecipe init' to create one.")]
    NotFound { path: PathBuf },

    /// Recipe or profile file could not be read
    #[error("Failed to read '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Recipe or profile TOML is malformed
    #[error("Failed to parse '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Recipe is well-formed TOML but semantically invalid
    #[error("Invalid recipe field '{field}': {message}")]
    Invalid { field: String, message: String },
}

/// Requirement resolution errors, reported by the dependency manager
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequirementError {
    /// Reference string is malformed
    #[error("Invalid package reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    /// Package is absent from the cache
    #[error("Requirement '{reference}' not found at '{path}' (build policy: {policy})")]
    NotFound {
        reference: String,
        path: PathBuf,
        policy: String,
    },

    /// Package is present but its info file is unreadable
    #[error("Failed to read package info for '{reference}': {error}")]
    PackageInfo { reference: String, error: String },
}

/// Native build errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Configure or compile step exited unsuccessfully
    #[error("{step} step failed ({status}): {command}")]
    StepFailed {
        step: String,
        command: String,
        status: String,
    },

    /// Test step exited unsuccessfully
    #[error("Tests failed ({status}): {command}. Package step skipped")]
    TestFailure { command: String, status: String },

    /// Process could not be started
    #[error("{step} step could not start '{command}': {error}")]
    Spawn {
        step: String,
        command: String,
        error: String,
    },

    /// Native tool not on PATH
    #[error("Build tool not found: {tool}")]
    ToolNotFound { tool: String },
}

/// Packaging errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackagingError {
    /// Glob pattern does not compile
    #[error("Invalid artifact pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },

    /// Required rule matched nothing
    #[error("No artifact matched required pattern '{pattern}' under '{root}'")]
    MissingArtifact { pattern: String, root: PathBuf },

    /// Copy or write failed
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },

    /// Package info could not be serialized
    #[error("Failed to serialize package info: {error}")]
    Serialize { error: String },
}

/// Filesystem errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to copy file
    #[error("Failed to copy '{from}' to '{to}': {error}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to move a directory into place
    #[error("Failed to rename '{from}' to '{to}': {error}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Output directory would clobber sources or another output
    #[error("Refusing to use '{path}': {reason}")]
    UnsafeTarget { path: PathBuf, reason: String },
}

/// Top-level pkgrecipe error type
#[derive(Error, Debug)]
pub enum PkgRecipeError {
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(#[from] InitError),

    /// Option or settings error
    #[error("Configuration error: {0}")]
    Option(#[from] OptionError),

    /// Recipe error
    #[error("Configuration error: {0}")]
    Recipe(#[from] RecipeError),

    /// Requirement resolution error
    #[error("Requirement resolution error: {0}")]
    Requirement(#[from] RequirementError),

    /// Build error
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Packaging error
    #[error("Packaging error: {0}")]
    Packaging(#[from] PackagingError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),
}

impl PkgRecipeError {
    /// True when the failure happened before any external process ran
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Option(_) | Self::Recipe(_))
    }
}
