//! Build profiles
//!
//! A profile is a named set of settings and option values sitting between
//! the recipe and the command line in the resolution order. Settings keys
//! that contain a dot must be quoted in TOML:
//!
//! ```toml
//! [settings]
//! os = "Windows"
//! compiler = "Visual Studio"
//! "compiler.version" = "15"
//!
//! [options]
//! include_pdbs = true
//! "gtest:shared" = "False"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::options::{self, OptionOverrides, OptionValue};
use crate::error::{OptionError, RecipeError};

/// Settings and option values loaded from a profile file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub settings: BTreeMap<String, toml::Value>,

    #[serde(default)]
    pub options: BTreeMap<String, toml::Value>,
}

impl Profile {
    /// Parse a profile from TOML text
    pub fn from_toml(content: &str) -> Result<Self, RecipeError> {
        toml::from_str(content).map_err(|e| RecipeError::Parse {
            path: Path::new("<profile>").to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load a profile file
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let content = std::fs::read_to_string(path).map_err(|e| RecipeError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        let profile = toml::from_str(&content).map_err(|e| RecipeError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        tracing::debug!("Loaded profile from {}", path.display());
        Ok(profile)
    }

    /// Load a profile if the file exists, otherwise an empty one
    pub fn load_or_default(path: &Path) -> Result<Self, RecipeError> {
        if path.is_file() {
            Self::load(path)
        } else {
            tracing::debug!("No profile at {}, using host defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Settings as strings; numbers are accepted for versions
    pub fn settings_map(&self) -> Result<BTreeMap<String, String>, OptionError> {
        self.settings
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Float(f) => f.to_string(),
                    other => {
                        return Err(OptionError::InvalidSetting {
                            key: key.clone(),
                            value: other.to_string(),
                            choices: Vec::new(),
                        })
                    }
                };
                Ok((key.clone(), value))
            })
            .collect()
    }

    /// Options as overrides; booleans map onto the `{False, True}` domain
    pub fn option_overrides(&self) -> Result<OptionOverrides, OptionError> {
        let pairs = self
            .options
            .iter()
            .map(|(name, value)| {
                let raw = match value {
                    toml::Value::Boolean(b) => OptionValue::from(*b).to_string(),
                    toml::Value::String(s) => s.clone(),
                    other => {
                        return Err(OptionError::InvalidValue {
                            name: name.clone(),
                            value: other.to_string(),
                            domain: options::BOOL_DOMAIN.iter().map(ToString::to_string).collect(),
                        })
                    }
                };
                Ok((name.clone(), raw))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(OptionOverrides::from_pairs(pairs))
    }
}
