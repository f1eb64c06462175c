//! Core business logic module
//!
//! This module contains the recipe evaluation logic for pkgrecipe.
//! Process execution and the package cache live in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`recipe`] - Recipe (recipe.toml) parsing and validation
//! - [`profile`] - Settings and option profiles
//! - [`options`] - Option declarations and resolution
//! - [`settings`] - Platform settings
//! - [`resolver`] - Requirement resolution
//! - [`cmake`] - CMake command-line dialect
//! - [`builder`] - Build orchestration logic
//! - [`packaging`] - Artifact selection and package metadata
//! - [`generator`] - Dependency build info for CMake
//! - [`pipeline`] - End-to-end build pipeline
//! - [`init`] - Recipe initialization logic

pub mod builder;
pub mod cmake;
pub mod generator;
pub mod init;
pub mod options;
pub mod packaging;
pub mod pipeline;
pub mod profile;
pub mod recipe;
pub mod resolver;
pub mod settings;
