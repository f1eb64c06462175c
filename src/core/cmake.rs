//! CMake command-line dialect
//!
//! Translates platform settings and options into argument tokens for the
//! configure, build and test steps. Arguments are kept as separate tokens
//! and never joined into a shell string.

use std::path::Path;

use crate::core::settings::{Arch, CompilerName, Os, PlatformSettings};
use crate::error::OptionError;

/// Prefix for settings defines passed to the configure step
pub const DEFINE_PREFIX: &str = "RECIPE";

/// Visual Studio product year for a compiler major version
fn visual_studio_year(major: &str) -> Option<&'static str> {
    match major {
        "12" => Some("2013"),
        "14" => Some("2015"),
        "15" => Some("2017"),
        "16" => Some("2019"),
        "17" => Some("2022"),
        _ => None,
    }
}

/// Whether the generator builds several configurations from one tree
///
/// Multi-config generators take the build type at build/test time
/// (`--config`), single-config ones at configure time
/// (`CMAKE_BUILD_TYPE`).
pub fn is_multi_config(settings: &PlatformSettings) -> bool {
    settings.compiler.name == CompilerName::VisualStudio
}

/// CMake generator name for the settings
pub fn generator(settings: &PlatformSettings) -> Result<String, OptionError> {
    if settings.compiler.name == CompilerName::VisualStudio {
        let version = settings.compiler_version()?;
        let major = version.split('.').next().unwrap_or(version);
        let mut name = match visual_studio_year(major) {
            Some(year) => format!("Visual Studio {major} {year}"),
            None => format!("Visual Studio {major}"),
        };
        match settings.arch {
            Arch::X86_64 => name.push_str(" Win64"),
            Arch::Armv7 => name.push_str(" ARM"),
            Arch::X86 | Arch::Armv8 => {}
        }
        return Ok(name);
    }

    Ok(match settings.os {
        Os::Windows => "MinGW Makefiles".to_string(),
        Os::Linux | Os::Macos | Os::FreeBsd => "Unix Makefiles".to_string(),
    })
}

/// Architecture flag for GCC-compatible compilers
fn arch_flag(settings: &PlatformSettings) -> Option<&'static str> {
    if settings.compiler.name == CompilerName::VisualStudio {
        return None;
    }
    match settings.arch {
        Arch::X86 => Some("-m32"),
        Arch::X86_64 => Some("-m64"),
        Arch::Armv7 | Arch::Armv8 => None,
    }
}

/// Arguments for the configure step
pub fn configure_args(
    settings: &PlatformSettings,
    source_dir: &Path,
    testing_define: Option<&str>,
) -> Result<Vec<String>, OptionError> {
    let mut args = vec![
        source_dir.display().to_string(),
        "-G".to_string(),
        generator(settings)?,
    ];

    if !is_multi_config(settings) {
        args.push(format!("-DCMAKE_BUILD_TYPE={}", settings.build_type));
    }

    args.push(format!("-D{DEFINE_PREFIX}_COMPILER={}", settings.compiler.name));
    if let Some(version) = &settings.compiler.version {
        args.push(format!("-D{DEFINE_PREFIX}_COMPILER_VERSION={version}"));
    }
    if let Some(flag) = arch_flag(settings) {
        args.push(format!("-D{DEFINE_PREFIX}_CXX_FLAGS={flag}"));
        args.push(format!("-D{DEFINE_PREFIX}_SHARED_LINKER_FLAGS={flag}"));
        args.push(format!("-D{DEFINE_PREFIX}_C_FLAGS={flag}"));
    }
    args.push("-Wno-dev".to_string());

    if let Some(define) = testing_define {
        args.push(format!("-D{define}=1"));
    }
    Ok(args)
}

/// Arguments for the build step
pub fn build_args(settings: &PlatformSettings, jobs: Option<usize>) -> Vec<String> {
    let mut args = vec!["--build".to_string(), ".".to_string()];
    if is_multi_config(settings) {
        args.push("--config".to_string());
        args.push(settings.build_type.to_string());
    }
    if let Some(jobs) = jobs {
        args.push("--parallel".to_string());
        args.push(jobs.to_string());
    }
    args
}

/// Arguments for the test step
pub fn test_args(settings: &PlatformSettings) -> Vec<String> {
    vec![
        "-C".to_string(),
        settings.build_type.to_string(),
        "--output-on-failure".to_string(),
    ]
}
