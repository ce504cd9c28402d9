//! Outcomes, reports and the result aggregator.
//!
//! [`aggregate`] is a pure reduction: a run fails as soon as one outcome failed,
//! and the failing names keep artifact order.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Why an artifact did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The block could not be embedded into a loadable module
    Synthesis,
    /// The module did not load (syntax or indentation error, failed import)
    Load,
    /// The call returned something other than `None`
    Assertion,
    /// The call raised
    Raised,
    /// The watchdog killed the artifact
    TimedOut,
    /// The interpreter exited before the test reported a result
    Aborted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Synthesis => "synthesis error",
            FailureKind::Load => "load error",
            FailureKind::Assertion => "assertion failed",
            FailureKind::Raised => "raised",
            FailureKind::TimedOut => "timed out",
            FailureKind::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// Failure description attached to a failed outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
}

impl Failure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

/// Result of running a single artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed(Duration),
    Failed(Duration, Failure),
}

impl TestResult {
    pub fn duration(&self) -> Duration {
        match self {
            TestResult::Passed(d) | TestResult::Failed(d, _) => *d,
        }
    }
}

/// Outcome of executing one test artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub name: String,
    pub result: TestResult,
}

impl Outcome {
    pub fn new(name: impl Into<String>, result: TestResult) -> Self {
        Self {
            name: name.into(),
            result,
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self.result, TestResult::Passed(_))
    }

    /// Failure description, `None` when the outcome passed.
    pub fn failure(&self) -> Option<&Failure> {
        match &self.result {
            TestResult::Passed(_) => None,
            TestResult::Failed(_, failure) => Some(failure),
        }
    }

    pub fn detail(&self) -> Option<&str> {
        self.failure().map(|f| f.detail.as_str())
    }
}

/// Overall status of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
}

/// Aggregated result for one submission.
///
/// `status` is `Pass` iff `failed_names` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub status: Status,
    #[serde(rename = "failed_tests", default, skip_serializing_if = "Vec::is_empty")]
    pub failed_names: Vec<String>,
}

impl Report {
    /// Report for a submission without any code blocks.
    pub fn vacuous() -> Self {
        Self {
            status: Status::Pass,
            failed_names: Vec::new(),
        }
    }

    pub fn is_pass(&self) -> bool {
        self.status == Status::Pass
    }
}

/// Reduce outcomes into a report.
pub fn aggregate(outcomes: &[Outcome]) -> Report {
    let failed_names: Vec<String> = outcomes
        .iter()
        .filter(|o| !o.passed())
        .map(|o| o.name.clone())
        .collect();

    let status = if failed_names.is_empty() { Status::Pass } else { Status::Fail };
    Report { status, failed_names }
}

/// Summary of a run, for reporters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl TestSummary {
    pub fn from_outcomes(outcomes: &[Outcome], duration: Duration) -> Self {
        let passed = outcomes.iter().filter(|o| o.passed()).count();
        Self {
            total: outcomes.len(),
            passed,
            failed: outcomes.len() - passed,
            duration,
        }
    }
}
