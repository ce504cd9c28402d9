//! Progress reporting for pipeline runs.
//!
//! Reporting is separated from execution so the CLI can print pytest-style
//! progress while library callers stay silent. Stdout is reserved for replies,
//! so the console reporter writes to stderr.

use crate::backend::TestArtifact;
use crate::report::{Outcome, TestResult, TestSummary};

/// Trait for reporting test execution results.
pub trait TestReporter {
    /// Called once the artifacts of a run are known
    fn on_collection_complete(&mut self, _test_count: usize) {}

    /// Called when an artifact starts
    fn on_test_start(&mut self, _artifact: &TestArtifact) {}

    /// Called when an artifact completes
    fn on_test_complete(&mut self, outcome: &Outcome);

    /// Called when all artifacts have completed
    fn on_run_complete(&mut self, _summary: &TestSummary) {}
}

/// Reporter that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl TestReporter for SilentReporter {
    fn on_test_complete(&mut self, _outcome: &Outcome) {}
}

/// Default console reporter (pytest-style)
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    /// Label printed in front of every line (usually the submitted file name)
    pub label: String,
}

impl ConsoleReporter {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl TestReporter for ConsoleReporter {
    fn on_collection_complete(&mut self, test_count: usize) {
        if test_count == 0 {
            eprintln!("{}: no functions collected", self.label);
        } else {
            eprintln!("{}: collected {} item(s)", self.label, test_count);
        }
    }

    fn on_test_complete(&mut self, outcome: &Outcome) {
        let status = match &outcome.result {
            TestResult::Passed(_) => "\x1b[32mPASSED\x1b[0m",
            TestResult::Failed(..) => "\x1b[31mFAILED\x1b[0m",
        };
        eprintln!(
            "{}::{} {} ({}ms)",
            self.label,
            outcome.name,
            status,
            outcome.result.duration().as_millis()
        );

        // Print failure details
        if let Some(failure) = outcome.failure() {
            eprintln!("    \x1b[31m{}\x1b[0m", failure);
        }
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("\x1b[32m{} passed\x1b[0m", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("\x1b[31m{} failed\x1b[0m", summary.failed));
        }
        if parts.is_empty() {
            return;
        }

        eprintln!(
            "====== {}: {} in {:.2}s ======",
            self.label,
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
    }
}

/// Reporter that records every event, for inspecting runs in tests.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub collected: Option<usize>,
    pub started: Vec<String>,
    pub completed: Vec<Outcome>,
    pub summary: Option<TestSummary>,
}

impl TestReporter for RecordingReporter {
    fn on_collection_complete(&mut self, test_count: usize) {
        self.collected = Some(test_count);
    }

    fn on_test_start(&mut self, artifact: &TestArtifact) {
        self.started.push(artifact.name.clone());
    }

    fn on_test_complete(&mut self, outcome: &Outcome) {
        self.completed.push(outcome.clone());
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        self.summary = Some(summary.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::report::{Failure, FailureKind};

    #[test]
    fn test_console_reporter_handles_every_event() {
        let outcomes = [
            Outcome::new("TestFunction_0", TestResult::Passed(Duration::from_millis(3))),
            Outcome::new(
                "TestFunction_1",
                TestResult::Failed(Duration::from_millis(4), Failure::new(FailureKind::Aborted, "exit status: 0")),
            ),
        ];
        let mut reporter = ConsoleReporter::new("upload.py");
        assert_eq!(reporter.label, "upload.py");

        reporter.on_collection_complete(outcomes.len());
        for outcome in &outcomes {
            reporter.on_test_complete(outcome);
        }
        reporter.on_run_complete(&TestSummary::from_outcomes(&outcomes, Duration::from_millis(7)));
    }
}
