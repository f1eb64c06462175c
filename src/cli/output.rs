//! Output formatting
//!
//! This module provides formatted status messages, JSON output for
//! scripting, and error display.

use anyhow::Result;
use serde::Serialize;

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// How command results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Print nothing but errors
    pub quiet: bool,
    /// Print machine-readable JSON instead of text
    pub json: bool,
    /// Verbosity count from `-v`
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Whether human-readable text should be printed
    pub fn shows_text(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Log level filter for the tracing subscriber
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }

    /// Print a plain line
    pub fn print_line(&self, message: &str) {
        if self.shows_text() {
            println!("{message}");
        }
    }

    /// Print a success message
    pub fn print_success(&self, message: &str) {
        if self.shows_text() {
            println!("{} {message}", status::SUCCESS);
        }
    }

    /// Print an indented detail line
    pub fn print_detail(&self, message: &str) {
        if self.shows_text() {
            println!("  {message}");
        }
    }

    /// Print an informational message
    pub fn print_info(&self, message: &str) {
        if self.shows_text() {
            println!("{} {message}", status::INFO);
        }
    }

    /// Print a warning to stderr
    pub fn print_warning(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {message}", status::WARNING);
        }
    }

    /// Print a value as pretty JSON when JSON output is on
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(())
    }
}

/// Render an error and its causes
pub fn format_error(error: &anyhow::Error) -> String {
    let mut message = format!("{} Error: {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        message.push_str(&format!("\n  caused by: {cause}"));
    }
    message
}

/// Print an error and its causes to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{}", format_error(error));
}
