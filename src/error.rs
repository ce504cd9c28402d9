//! Environment-level errors.
//!
//! Per-artifact problems are contained as failing outcomes. Only failures of the
//! run's environment (working context, interpreter) escalate to the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Unrecoverable failure of a run's environment
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("failed to create working context: {0}")]
    CreateContext(#[source] io::Error),

    #[error("failed to stage artifact '{path}': {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start interpreter '{interpreter}': {source}")]
    Interpreter {
        interpreter: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove working context: {0}")]
    Teardown(#[source] io::Error),
}

pub type EnvironmentResult<T> = Result<T, EnvironmentError>;
