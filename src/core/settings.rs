//! Platform settings
//!
//! The `{os, compiler, build_type, arch}` tuple a build targets. Settings are
//! supplied by the caller (CLI `-s key=value`, profile file) over host
//! defaults and are never derived from options.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OptionError;

/// Settings keys accepted in profiles and on the command line
pub const SETTING_KEYS: &[&str] = &["os", "compiler", "compiler.version", "build_type", "arch"];

/// Generates a closed string enum with `as_str`, `FromStr` and `Display`
macro_rules! setting_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $key:literal {
            $( $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// All accepted spellings
            pub const CHOICES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = OptionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(OptionError::InvalidSetting {
                        key: $key.to_string(),
                        value: other.to_string(),
                        choices: Self::CHOICES.iter().map(ToString::to_string).collect(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

setting_enum! {
    /// Target operating system
    Os, "os" {
        Windows => "Windows",
        Linux => "Linux",
        Macos => "Macos",
        FreeBsd => "FreeBSD",
    }
}

setting_enum! {
    /// Compiler family
    CompilerName, "compiler" {
        Gcc => "gcc",
        Clang => "clang",
        AppleClang => "apple-clang",
        VisualStudio => "Visual Studio",
    }
}

setting_enum! {
    /// Build configuration
    BuildType, "build_type" {
        Debug => "Debug",
        Release => "Release",
        RelWithDebInfo => "RelWithDebInfo",
        MinSizeRel => "MinSizeRel",
    }
}

setting_enum! {
    /// Target architecture
    Arch, "arch" {
        X86 => "x86",
        X86_64 => "x86_64",
        Armv7 => "armv7",
        Armv8 => "armv8",
    }
}

impl Os {
    /// The operating system this binary runs on
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::Macos,
            "freebsd" => Self::FreeBsd,
            _ => Self::Linux,
        }
    }
}

impl Arch {
    /// The architecture this binary runs on
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "x86" => Self::X86,
            "arm" => Self::Armv7,
            "aarch64" => Self::Armv8,
            _ => Self::X86_64,
        }
    }
}

impl CompilerName {
    /// Conventional compiler for an operating system
    pub fn default_for(os: Os) -> Self {
        match os {
            Os::Windows => Self::VisualStudio,
            Os::Macos => Self::AppleClang,
            Os::FreeBsd => Self::Clang,
            Os::Linux => Self::Gcc,
        }
    }
}

/// Compiler identity and version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compiler {
    pub name: CompilerName,
    pub version: Option<String>,
}

/// Settings tuple for one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSettings {
    pub os: Os,
    pub compiler: Compiler,
    pub build_type: BuildType,
    pub arch: Arch,
}

impl PlatformSettings {
    /// Settings describing the host, as a default profile would
    pub fn host_default() -> Self {
        let os = Os::host();
        Self {
            os,
            compiler: Compiler {
                name: CompilerName::default_for(os),
                version: None,
            },
            build_type: BuildType::Release,
            arch: Arch::host(),
        }
    }

    /// Apply profile values, then CLI values, over host defaults
    ///
    /// Changing the compiler without giving a version drops the host
    /// compiler's version.
    pub fn resolve(
        cli: &[(String, String)],
        profile: &BTreeMap<String, String>,
    ) -> Result<Self, OptionError> {
        let mut settings = Self::host_default();
        for (key, value) in profile.iter().chain(cli.iter().map(|(k, v)| (k, v))) {
            settings.apply(key, value)?;
        }
        tracing::debug!("Resolved settings: {settings}");
        Ok(settings)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), OptionError> {
        match key {
            "os" => self.os = value.parse()?,
            "compiler" => {
                let name: CompilerName = value.parse()?;
                if name != self.compiler.name {
                    self.compiler = Compiler {
                        name,
                        version: None,
                    };
                }
            }
            "compiler.version" => {
                if value.is_empty() {
                    return Err(OptionError::MissingSetting {
                        key: key.to_string(),
                    });
                }
                self.compiler.version = Some(value.to_string());
            }
            "build_type" => self.build_type = value.parse()?,
            "arch" => self.arch = value.parse()?,
            _ => {
                return Err(OptionError::UnknownSetting {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Compiler version, failing when a rule needs it and it is unset
    pub fn compiler_version(&self) -> Result<&str, OptionError> {
        self.compiler
            .version
            .as_deref()
            .ok_or_else(|| OptionError::MissingSetting {
                key: "compiler.version".to_string(),
            })
    }

    /// Settings as `key -> value` strings
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("os".to_string(), self.os.to_string());
        map.insert("compiler".to_string(), self.compiler.name.to_string());
        if let Some(version) = &self.compiler.version {
            map.insert("compiler.version".to_string(), version.clone());
        }
        map.insert("build_type".to_string(), self.build_type.to_string());
        map.insert("arch".to_string(), self.arch.to_string());
        map
    }
}

impl fmt::Display for PlatformSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "os={} compiler={}", self.os, self.compiler.name)?;
        if let Some(version) = &self.compiler.version {
            write!(f, " compiler.version={version}")?;
        }
        write!(f, " build_type={} arch={}", self.build_type, self.arch)
    }
}
