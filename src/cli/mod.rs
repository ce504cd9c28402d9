//! CLI module for smokegen
//!
//! This module provides the command-line front end that stands in for the
//! upload endpoint: it reads files, validates them as uploads, runs the
//! pipeline and prints one JSON reply per file.
//!
//! ## Commands
//!
//! - `check <file>...` - Generate and run smoke tests for each file
//!
//! ## Debug flags
//!
//! - `--extract <file>` - Print the extracted code blocks
//! - `--emit-tests <file>` - Print the synthesized test modules
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::config::RunnerConfig;
use crate::version::SMOKEGEN_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// At least one submission failed or was rejected
    pub const FAILURE: ExitCode = ExitCode(1);
    /// The run's environment broke (working context, interpreter)
    pub const ENVIRONMENT: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create an environment error (exit code 2).
    pub fn environment(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::ENVIRONMENT)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Generate and run smoke tests for the functions in uploaded Python files
#[derive(Parser, Debug)]
#[command(name = "smokegen")]
#[command(version = SMOKEGEN_VERSION)]
#[command(about = "Generate and run smoke tests for the functions in Python files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    // Debug/development flags
    /// Print extracted code blocks (debug)
    #[arg(long = "extract", value_name = "FILE")]
    pub extract_file: Option<PathBuf>,

    /// Print synthesized test modules (debug)
    #[arg(long = "emit-tests", value_name = "FILE", conflicts_with = "extract_file")]
    pub emit_tests_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate and run smoke tests, printing one JSON reply per file
    Check {
        /// Files to check (.py or .txt)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
        /// Python interpreter (overrides SMOKEGEN_PYTHON)
        #[arg(long, value_name = "PATH")]
        python: Option<PathBuf>,
        /// Per-test time limit in seconds, 0 disables it (overrides SMOKEGEN_TIMEOUT_SECS)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Verbose progress on stderr
        #[arg(short, long)]
        verbose: bool,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    // Handle debug flags first
    if let Some(file) = cli.extract_file {
        return commands::extract_file(&file);
    }
    if let Some(file) = cli.emit_tests_file {
        return commands::emit_tests(&file);
    }

    match cli.command {
        Some(Command::Check {
            files,
            python,
            timeout,
            verbose,
        }) => {
            let config = resolve_config(RunnerConfig::from_env(), python, timeout);
            commands::check_files(&files, config, verbose)
        }
        // No command and no debug flag - show help
        None => Err(CliError::failure("Usage: smokegen check <FILE>...  (see --help)")),
    }
}

/// Apply command-line overrides on top of an environment-derived config.
fn resolve_config(mut config: RunnerConfig, python: Option<PathBuf>, timeout: Option<u64>) -> RunnerConfig {
    if let Some(python) = python {
        config = config.with_interpreter(python);
    }
    if let Some(secs) = timeout {
        config = config.with_timeout_secs(secs);
    }
    config
}

// ============================================================================
// Tests
// ============================================================================
