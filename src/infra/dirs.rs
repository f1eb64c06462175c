//! Platform-specific directory management
//!
//! Provides the package cache and configuration directories.
//!
//! Environment variables can override default directories:
//! - `PKGRECIPE_CACHE_DIR` - Override the package cache root
//! - `PKGRECIPE_CONFIG_DIR` - Override the config directory (profiles)

use std::env;
use std::path::PathBuf;

use crate::config::defaults::DEFAULT_PROFILE_FILE;

/// Environment variable names for directory overrides
pub const ENV_CACHE_DIR: &str = "PKGRECIPE_CACHE_DIR";
pub const ENV_CONFIG_DIR: &str = "PKGRECIPE_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "pkgrecipe";

/// Subdirectory names
const PROFILES_SUBDIR: &str = "profiles";

/// Directory provider for pkgrecipe
#[derive(Debug, Clone)]
pub struct RecipeDirs {
    cache_dir: PathBuf,
    config_dir: PathBuf,
}

impl RecipeDirs {
    /// Create a new `RecipeDirs` instance
    ///
    /// Checks environment variables first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache_dir: Self::resolve_cache_dir(),
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Use explicit directories
    #[must_use]
    pub fn with_dirs(cache_dir: PathBuf, config_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            config_dir,
        }
    }

    /// Root of the installed package cache
    ///
    /// Packages live at `<cache>/<name>/<version>/<user>/<channel>/package`.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone()
    }

    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Directory holding named profiles
    #[must_use]
    pub fn profiles_dir(&self) -> PathBuf {
        self.config_dir.join(PROFILES_SUBDIR)
    }

    /// Profile applied when `--profile` is not given
    #[must_use]
    pub fn default_profile_path(&self) -> PathBuf {
        self.profiles_dir().join(DEFAULT_PROFILE_FILE)
    }

    /// Resolve a `--profile` argument: an existing path, or a name under the
    /// profiles directory
    #[must_use]
    pub fn profile_path(&self, profile: &str) -> PathBuf {
        let as_path = PathBuf::from(profile);
        if as_path.is_file() || as_path.extension().is_some() || as_path.components().count() > 1 {
            as_path
        } else {
            self.profiles_dir().join(format!("{profile}.toml"))
        }
    }

    fn resolve_cache_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CACHE_DIR) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| h.join(format!(".{APP_NAME}")).join("data"))
            .unwrap_or_else(|| PathBuf::from(".").join(format!(".{APP_NAME}")).join("data"))
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for RecipeDirs {
    fn default() -> Self {
        Self::new()
    }
}
