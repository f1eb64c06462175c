//! Default configuration values

/// Recipe file name looked up in the working directory
pub const DEFAULT_RECIPE_FILE: &str = "recipe.toml";

/// Build directory, relative to the recipe directory
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Package directory, relative to the recipe directory
pub const DEFAULT_PACKAGE_DIR: &str = "package";

/// Configure/build tool
pub const DEFAULT_CMAKE: &str = "cmake";

/// Test runner
pub const DEFAULT_CTEST: &str = "ctest";

/// Dependency build info written into the build directory
pub const BUILDINFO_FILE: &str = "buildinfo.cmake";

/// Consumer metadata written into the package directory
pub const PACKAGE_INFO_FILE: &str = "package_info.toml";

/// Checksum manifest written into the package directory
pub const MANIFEST_FILE: &str = "manifest.txt";

/// Entries never exported into the build directory
pub const EXPORT_EXCLUDES: &[&str] = &[".git"];

/// Default profile file name under the config directory
pub const DEFAULT_PROFILE_FILE: &str = "default.toml";

/// Recipe written by `pkgrecipe init`
pub const DEFAULT_RECIPE: &str = r#"[package]
name = "oomuse-flags"
version = "0.1.0"
description = "Command-line flag parsing for C++"
author = "Eric W. Barndollar (eric@EricWBarndollar.com)"
license = "Apache-2.0"
url = "https://github.com/lindurion/oomuse-flags"
build_policy = "missing"

[options]
include_pdbs = false
testing = false

[[requires]]
reference = "oomuse-core/0.1.1@lindurion/stable"

# gtest in shared mode produces warnings; link it statically so warnings
# can be treated as errors.
[[requires]]
reference = "gtest/1.8.0@lasote/stable"
when = "testing"
options = { shared = "False" }

[[imports]]
pattern = "*.dll"
src = "bin"
dst = "bin"

[[imports]]
pattern = "*.dylib*"
src = "lib"
dst = "bin"

[[artifacts]]
pattern = "*.h"
src = "include"
dst = "include"
keep_path = true
required = true

[[artifacts]]
pattern = "*.a"
dst = "lib"
keep_path = false

[[artifacts]]
pattern = "*.lib"
dst = "lib"
keep_path = false

[[artifacts]]
pattern = "*.pdb"
dst = "lib"
keep_path = false
when = { compiler = "Visual Studio", option = "include_pdbs" }
"#;
