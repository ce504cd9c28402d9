//! Submission pipeline
//!
//! `Received → Extracted → Synthesized → Executed → Reported`, strictly linear.
//! A submission without code blocks goes straight to `Reported` with a vacuous
//! pass and never touches the filesystem.

use std::fmt;
use std::time::Instant;

use crate::backend::synthesize;
use crate::config::RunnerConfig;
use crate::error::EnvironmentResult;
use crate::frontend::extract;
use crate::report::{Report, TestSummary, aggregate};
use crate::runner::{self, Evaluator, PythonEvaluator, SilentReporter, TestReporter};

/// Pipeline stage, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Received,
    Extracted,
    Synthesized,
    Executed,
    Reported,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Extracted => "extracted",
            Stage::Synthesized => "synthesized",
            Stage::Executed => "executed",
            Stage::Reported => "reported",
        };
        f.write_str(name)
    }
}

/// Forward-only stage tracker
#[derive(Debug)]
struct StageTracker {
    current: Stage,
}

impl StageTracker {
    fn new() -> Self {
        tracing::debug!(stage = %Stage::Received, "pipeline stage");
        Self {
            current: Stage::Received,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.current, "pipeline stage moved backwards: {} -> {}", self.current, next);
        self.current = next;
        tracing::debug!(stage = %next, "pipeline stage");
    }
}

/// Extract, synthesize, execute and aggregate one submission at a time.
///
/// Cloning is cheap; each call to [`Pipeline::run`] owns its own blocks,
/// artifacts and working context, so clones may run concurrently.
#[derive(Debug, Clone)]
pub struct Pipeline<E = PythonEvaluator> {
    config: RunnerConfig,
    evaluator: E,
}

impl Pipeline<PythonEvaluator> {
    /// Pipeline executing artifacts with the configured Python interpreter.
    pub fn new(config: RunnerConfig) -> Self {
        let evaluator = PythonEvaluator::new(&config);
        Self { config, evaluator }
    }
}

impl<E: Evaluator> Pipeline<E> {
    /// Pipeline with a custom evaluator.
    pub fn with_evaluator(config: RunnerConfig, evaluator: E) -> Self {
        Self { config, evaluator }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Run one submission without progress output.
    pub async fn run(&self, source: &str) -> EnvironmentResult<Report> {
        self.run_with_reporter(source, &mut SilentReporter).await
    }

    /// Run one submission, reporting progress to `reporter`.
    ///
    /// Only environment failures are returned as errors; everything that goes
    /// wrong with individual artifacts ends up in the report.
    #[tracing::instrument(skip_all, fields(source_len = source.len()))]
    pub async fn run_with_reporter<R>(&self, source: &str, reporter: &mut R) -> EnvironmentResult<Report>
    where
        R: TestReporter + Send,
    {
        let start = Instant::now();
        let mut stage = StageTracker::new();

        let blocks = extract(source);
        stage.advance(Stage::Extracted);
        reporter.on_collection_complete(blocks.len());

        if blocks.is_empty() {
            stage.advance(Stage::Reported);
            return Ok(Report::vacuous());
        }

        let artifacts = synthesize(&blocks);
        stage.advance(Stage::Synthesized);

        let outcomes = runner::run(&artifacts, &self.config, &self.evaluator, reporter).await?;
        stage.advance(Stage::Executed);

        let report = aggregate(&outcomes);
        reporter.on_run_complete(&TestSummary::from_outcomes(&outcomes, start.elapsed()));
        stage.advance(Stage::Reported);

        tracing::info!(
            tests = outcomes.len(),
            failed = report.failed_names.len(),
            "submission evaluated"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TestArtifact;
    use crate::report::{Failure, FailureKind, Status, TestResult};
    use crate::runner::RecordingReporter;
    use std::future::Future;
    use std::path::Path;
    use std::time::Duration;

    /// Fails every artifact whose module raises explicitly.
    #[derive(Debug, Clone, Default)]
    struct RaiseDetector;

    impl Evaluator for RaiseDetector {
        fn evaluate(
            &self,
            _artifact: &TestArtifact,
            script: &Path,
            _workdir: &Path,
        ) -> impl Future<Output = EnvironmentResult<TestResult>> + Send {
            let body = std::fs::read_to_string(script).unwrap_or_default();
            async move {
                if body.contains("raise ") {
                    Ok(TestResult::Failed(
                        Duration::ZERO,
                        Failure::new(FailureKind::Raised, "ValueError"),
                    ))
                } else {
                    Ok(TestResult::Passed(Duration::ZERO))
                }
            }
        }
    }

    fn pipeline() -> Pipeline<RaiseDetector> {
        Pipeline::with_evaluator(RunnerConfig::default(), RaiseDetector)
    }

    #[tokio::test]
    async fn test_empty_source_is_vacuous_pass() {
        let mut reporter = RecordingReporter::default();
        let report = pipeline().run_with_reporter("", &mut reporter).await.unwrap();
        assert_eq!(report, Report::vacuous());
        assert_eq!(reporter.collected, Some(0));
        assert!(reporter.summary.is_none());
    }

    #[tokio::test]
    async fn test_failing_names_reported_in_order() {
        let source = "def ok():\n    pass\n\ndef bad():\n    raise ValueError\n\ndef worse():\n    raise ValueError\n";
        let report = pipeline().run(source).await.unwrap();
        assert_eq!(report.status, Status::Fail);
        assert_eq!(report.failed_names, ["TestFunction_1", "TestFunction_2"]);
    }

    #[tokio::test]
    async fn test_summary_reported() {
        let mut reporter = RecordingReporter::default();
        pipeline()
            .run_with_reporter("def a():\n    pass\ndef b():\n    raise ValueError\n", &mut reporter)
            .await
            .unwrap();
        let summary = reporter.summary.unwrap();
        assert_eq!((summary.total, summary.passed, summary.failed), (2, 1, 1));
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::Received < Stage::Extracted);
        assert!(Stage::Executed < Stage::Reported);
        assert_eq!(Stage::Synthesized.to_string(), "synthesized");
    }
}
