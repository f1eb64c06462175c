//! External process execution
//!
//! Runs native tool commands with inherited stdio, blocking until each
//! exits.

use std::path::PathBuf;
use std::process::Command;

use crate::core::builder::{CommandRunner, CommandSpec, StepExit, Tools};
use crate::error::BuildError;

/// Runs commands as child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &CommandSpec) -> std::io::Result<StepExit> {
        tracing::debug!("Running in {}: {}", command.cwd.display(), command.display_line());
        let status = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&command.cwd)
            .status()?;
        Ok(status.code().map_or(StepExit::Terminated, StepExit::Code))
    }
}

/// Find a tool on PATH, or check an explicit path
pub fn locate_tool(program: &str) -> Result<PathBuf, BuildError> {
    which::which(program).map_err(|_| BuildError::ToolNotFound {
        tool: program.to_string(),
    })
}

/// Check that every tool a build needs is available
///
/// `ctest` is only needed when the test step runs.
pub fn check_tools(tools: &Tools, testing: bool) -> Result<(), BuildError> {
    let cmake = locate_tool(&tools.cmake)?;
    tracing::debug!("Using cmake at {}", cmake.display());
    if testing {
        let ctest = locate_tool(&tools.ctest)?;
        tracing::debug!("Using ctest at {}", ctest.display());
    }
    Ok(())
}
