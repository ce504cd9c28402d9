//! Isolated runner
//!
//! Executes one run's artifacts inside a freshly created working context.
//!
//! ## Guarantees
//!
//! - Every artifact is staged before the first one runs.
//! - Artifacts run sequentially in artifact order, and a failing artifact never
//!   stops the remaining ones.
//! - Exactly one outcome is produced per artifact, in the same order.
//! - The working context is removed when the run ends, including early exits on
//!   environment errors.
//!
//! ## I/O Boundaries
//!
//! Execution of a staged module goes through the [`Evaluator`] trait;
//! progress goes through the [`TestReporter`] trait.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod evaluator;
pub mod reporter;

use std::path::PathBuf;
use std::time::Duration;

use crate::backend::{TestArtifact, WorkingContext};
use crate::config::RunnerConfig;
use crate::error::{EnvironmentError, EnvironmentResult};
use crate::report::{Failure, FailureKind, Outcome, TestResult};

pub use evaluator::{Evaluator, PythonEvaluator};
pub use reporter::{ConsoleReporter, RecordingReporter, SilentReporter, TestReporter};

/// Run all artifacts in a fresh working context and collect their outcomes.
#[tracing::instrument(skip_all, fields(artifact_count = artifacts.len()))]
pub async fn run<E, R>(
    artifacts: &[TestArtifact],
    config: &RunnerConfig,
    evaluator: &E,
    reporter: &mut R,
) -> EnvironmentResult<Vec<Outcome>>
where
    E: Evaluator,
    R: TestReporter + Send,
{
    let context = match &config.context_root {
        Some(root) => WorkingContext::create_in(root, &config.context_prefix),
        None => WorkingContext::create(&config.context_prefix),
    }
    .map_err(EnvironmentError::CreateContext)?;

    let scripts = stage_all(&context, artifacts)?;

    let mut outcomes = Vec::with_capacity(artifacts.len());
    for (artifact, script) in artifacts.iter().zip(&scripts) {
        reporter.on_test_start(artifact);

        let result = match (script, &artifact.body) {
            (Some(script), _) => evaluator.evaluate(artifact, script, context.path()).await?,
            (None, Err(e)) => TestResult::Failed(Duration::ZERO, Failure::new(FailureKind::Synthesis, e.to_string())),
            (None, Ok(_)) => TestResult::Failed(
                Duration::ZERO,
                Failure::new(FailureKind::Synthesis, "artifact was not staged"),
            ),
        };

        let outcome = Outcome::new(artifact.name.clone(), result);
        if let Some(failure) = outcome.failure() {
            tracing::debug!(test = %outcome.name, kind = %failure.kind, "artifact failed");
        }
        reporter.on_test_complete(&outcome);
        outcomes.push(outcome);
    }

    context.close().map_err(EnvironmentError::Teardown)?;
    Ok(outcomes)
}

fn stage_all(context: &WorkingContext, artifacts: &[TestArtifact]) -> EnvironmentResult<Vec<Option<PathBuf>>> {
    artifacts
        .iter()
        .map(|artifact| {
            context.stage(artifact).map_err(|source| EnvironmentError::Stage {
                path: context.path().join(artifact.module_file_name()),
                source,
            })
        })
        .collect()
}
