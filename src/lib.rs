//! pkgrecipe - Declarative package-build recipes
//!
//! This library evaluates a package recipe: it resolves the upstream
//! packages a build needs, drives CMake and CTest with flags derived from
//! options and platform settings, gates packaging on the test suite, and
//! selects the artifacts a downstream consumer links against.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Recipe evaluation logic
//! - [`infra`] - Infrastructure layer (filesystem, package cache, processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
