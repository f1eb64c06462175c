//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use assert_fs::TempDir;

/// Settings that pin a Linux/gcc host regardless of the machine running tests
pub const GCC_SETTINGS: &[&str] = &[
    "-s",
    "os=Linux",
    "-s",
    "compiler=gcc",
    "-s",
    "compiler.version=9",
    "-s",
    "arch=x86_64",
];

/// Settings for a 64-bit Visual Studio 2017 build
pub const VISUAL_STUDIO_SETTINGS: &[&str] = &[
    "-s",
    "os=Windows",
    "-s",
    "compiler=Visual Studio",
    "-s",
    "compiler.version=15",
    "-s",
    "arch=x86_64",
];

/// Test project context
///
/// Creates a temporary recipe directory plus a separate home holding the
/// package cache, profiles and the call log of fake native tools.
pub struct TestProject {
    /// Recipe directory
    pub dir: TempDir,
    /// Cache, config and tool scripts live here, outside the export tree
    pub home: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            home: TempDir::new().expect("Failed to create temp home"),
        }
    }

    /// Create a project with the built-in recipe and its sources
    pub fn with_sources() -> Self {
        let project = Self::new();
        project.create_file("recipe.toml", pkgrecipe::config::defaults::DEFAULT_RECIPE);
        project.create_file("CMakeLists.txt", "project(oomuse-flags CXX)\n");
        project.create_file("include/oomuse/flags/flags.h", "#pragma once\n");
        project.create_file("src/oomuse/flags/flags.cpp", "#include \"oomuse/flags/flags.h\"\n");
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.home.path().join("cache")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home.path().join("config")
    }

    /// File the fake tools append their command lines to
    pub fn call_log(&self) -> PathBuf {
        self.home.path().join("calls.log")
    }

    /// Lines recorded by the fake tools, empty if none ran
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.call_log())
            .unwrap_or_default()
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        write(&self.dir.path().join(name), content);
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Put a package into the local cache with a runtime library
    pub fn install_dependency(&self, reference: &str, libs: &[&str]) {
        let (name_version, user_channel) = reference.split_once('@').expect("reference has '@'");
        let (name, version) = name_version.split_once('/').expect("reference has name/version");
        let (user, channel) = user_channel.split_once('/').expect("reference has user/channel");
        let root = self
            .cache_dir()
            .join(name)
            .join(version)
            .join(user)
            .join(channel)
            .join("package");

        let libs_toml = libs
            .iter()
            .map(|lib| format!("\"{lib}\""))
            .collect::<Vec<_>>()
            .join(", ");
        write(&root.join("package_info.toml"), &format!("[cpp_info]\nlibs = [{libs_toml}]\n"));
        write(&root.join(format!("include/{name}/{name}.h")), "#pragma once\n");
        write(&root.join(format!("lib/lib{name}.a")), "archive");
        write(&root.join(format!("bin/{name}.dll")), "dll");
    }

    /// Write a fake tool that logs its arguments and exits with `code`
    ///
    /// The fake cmake produces library and debug-symbol files on `--build`.
    #[cfg(unix)]
    pub fn fake_tool(&self, name: &str, code: i32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let build_outputs = if name == "cmake" {
            "if [ \"$1\" = \"--build\" ]; then\n\
             \x20 mkdir -p out Release\n\
             \x20 echo archive > out/liboomuse-flags.a\n\
             \x20 echo import > Release/oomuse-flags.lib\n\
             \x20 echo symbols > Release/oomuse-flags.pdb\n\
             fi\n"
        } else {
            ""
        };
        let script = format!(
            "#!/bin/sh\necho \"{name} $*\" >> \"{}\"\n{build_outputs}exit {code}\n",
            self.call_log().display()
        );
        let path = self.home.path().join("bin").join(name);
        write(&path, &script);
        let mut permissions = std::fs::metadata(&path).expect("tool exists").permissions();
        permissions.set_mode(0o755);
        std::fs::set_permissions(&path, permissions).expect("Failed to make tool executable");
        path
    }

    /// Command for the pkgrecipe binary, isolated from the user's home
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pkgrecipe"));
        cmd.current_dir(self.path())
            .env("PKGRECIPE_CACHE_DIR", self.cache_dir())
            .env("PKGRECIPE_CONFIG_DIR", self.config_dir())
            .env_remove("PKGRECIPE_CMAKE")
            .env_remove("PKGRECIPE_CTEST")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run pkgrecipe with arguments
    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to execute pkgrecipe")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

/// Stdout and stderr of a run, for assertion messages
pub fn describe(output: &Output) -> String {
    format!(
        "status: {}\nstdout:\n{}\nstderr:\n{}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}
