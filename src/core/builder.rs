//! Build orchestration logic
//!
//! Plans and runs one native build: configure, build, and, when testing is
//! on, a test run that gates packaging. Steps run strictly in sequence and
//! the first unsuccessful step ends the build.
//!
//! ```text
//! Configuring -> Building -> (Testing | skip) -> Ready
//!      \______________\___________\__________-> Failed
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::defaults::{DEFAULT_CMAKE, DEFAULT_CTEST};
use crate::core::cmake;
use crate::core::options::OptionSet;
use crate::core::settings::PlatformSettings;
use crate::error::{BuildError, OptionError};

/// Kind of a build step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Configure,
    Build,
    Test,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configure => f.write_str("Configure"),
            Self::Build => f.write_str("Build"),
            Self::Test => f.write_str("Test"),
        }
    }
}

/// An external command as a program plus argument tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    /// Human-readable command line for logs and errors
    pub fn display_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|token| {
                if token.is_empty() || token.contains(char::is_whitespace) {
                    format!("\"{token}\"")
                } else {
                    token.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One step of a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildStep {
    pub kind: StepKind,
    pub command: CommandSpec,
}

/// Ordered commands for one build attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInvocation {
    steps: Vec<BuildStep>,
}

impl BuildInvocation {
    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }

    pub fn has_test_step(&self) -> bool {
        self.steps.iter().any(|step| step.kind == StepKind::Test)
    }
}

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuildState {
    Configuring,
    Building,
    Testing,
    Ready,
    Failed,
}

impl BuildState {
    fn running(kind: StepKind) -> Self {
        match kind {
            StepKind::Configure => Self::Configuring,
            StepKind::Build => Self::Building,
            StepKind::Test => Self::Testing,
        }
    }
}

/// How an external process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepExit {
    /// Exited with a status code
    Code(i32),
    /// Killed before exiting (no status code)
    Terminated,
}

impl StepExit {
    pub fn success(self) -> bool {
        self == Self::Code(0)
    }
}

impl fmt::Display for StepExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "exit code {code}"),
            Self::Terminated => f.write_str("terminated by signal"),
        }
    }
}

/// Runs external commands, blocking until each exits
pub trait CommandRunner {
    fn run(&self, command: &CommandSpec) -> std::io::Result<StepExit>;
}

/// Native tool programs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
    pub cmake: String,
    pub ctest: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            cmake: DEFAULT_CMAKE.to_string(),
            ctest: DEFAULT_CTEST.to_string(),
        }
    }
}

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    /// Final state, always [`BuildState::Ready`]
    pub state: BuildState,
    /// Steps that ran, in order
    pub steps_run: Vec<StepKind>,
    /// Directory holding the build outputs
    pub output_dir: PathBuf,
}

/// Build orchestrator
#[derive(Debug, Clone, Default)]
pub struct BuildOrchestrator {
    tools: Tools,
    testing_define: String,
    jobs: Option<usize>,
}

impl BuildOrchestrator {
    /// Create an orchestrator passing `testing_define` when testing is on
    pub fn new(testing_define: &str) -> Self {
        Self {
            testing_define: testing_define.to_string(),
            ..Self::default()
        }
    }

    /// Set the tool programs
    #[must_use]
    pub fn with_tools(mut self, tools: Tools) -> Self {
        self.tools = tools;
        self
    }

    /// Set the number of parallel jobs forwarded to the build step
    #[must_use]
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    /// Plan the commands for a build in `working_dir`
    ///
    /// The test step is present if and only if testing is on.
    pub fn plan(
        &self,
        options: &OptionSet,
        settings: &PlatformSettings,
        working_dir: &Path,
    ) -> Result<BuildInvocation, OptionError> {
        let command = |program: &str, args: Vec<String>| CommandSpec {
            program: program.to_string(),
            args,
            cwd: working_dir.to_path_buf(),
        };

        let testing_define = options.testing().then_some(self.testing_define.as_str());
        let mut steps = vec![
            BuildStep {
                kind: StepKind::Configure,
                command: command(
                    &self.tools.cmake,
                    cmake::configure_args(settings, working_dir, testing_define)?,
                ),
            },
            BuildStep {
                kind: StepKind::Build,
                command: command(&self.tools.cmake, cmake::build_args(settings, self.jobs)),
            },
        ];
        if options.testing() {
            steps.push(BuildStep {
                kind: StepKind::Test,
                command: command(&self.tools.ctest, cmake::test_args(settings)),
            });
        }
        Ok(BuildInvocation { steps })
    }

    /// Run a planned invocation step by step
    ///
    /// Stops at the first step that fails to start or exits unsuccessfully.
    /// A failed test step yields [`BuildError::TestFailure`].
    pub fn execute<R: CommandRunner + ?Sized>(
        &self,
        invocation: &BuildInvocation,
        runner: &R,
    ) -> Result<BuildResult, BuildError> {
        let mut steps_run = Vec::with_capacity(invocation.steps.len());
        let mut output_dir = PathBuf::new();

        for step in &invocation.steps {
            let state = BuildState::running(step.kind);
            let line = step.command.display_line();
            tracing::info!("{state:?}: {line}");

            let exit = runner.run(&step.command).map_err(|e| {
                tracing::debug!("{:?} -> {:?}", state, BuildState::Failed);
                BuildError::Spawn {
                    step: step.kind.to_string(),
                    command: line.clone(),
                    error: e.to_string(),
                }
            })?;
            steps_run.push(step.kind);

            if !exit.success() {
                tracing::debug!("{:?} -> {:?} ({exit})", state, BuildState::Failed);
                return Err(match step.kind {
                    StepKind::Test => BuildError::TestFailure {
                        command: line,
                        status: exit.to_string(),
                    },
                    StepKind::Configure | StepKind::Build => BuildError::StepFailed {
                        step: step.kind.to_string(),
                        command: line,
                        status: exit.to_string(),
                    },
                });
            }
            output_dir.clone_from(&step.command.cwd);
        }

        tracing::debug!("Build -> {:?}", BuildState::Ready);
        Ok(BuildResult {
            state: BuildState::Ready,
            steps_run,
            output_dir,
        })
    }

    /// Plan and run a build in `working_dir`
    pub fn build<R: CommandRunner + ?Sized>(
        &self,
        options: &OptionSet,
        settings: &PlatformSettings,
        working_dir: &Path,
        runner: &R,
    ) -> Result<BuildResult, crate::error::PkgRecipeError> {
        let invocation = self.plan(options, settings, working_dir)?;
        Ok(self.execute(&invocation, runner)?)
    }
}
