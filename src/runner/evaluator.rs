//! Artifact evaluation boundary
//!
//! The runner stages artifacts and hands each staged module to an [`Evaluator`].
//! Swapping the evaluator changes how generated code is executed (another
//! interpreter, a container, a mock in tests) without touching staging,
//! ordering or aggregation.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::process::Command;

use crate::backend::TestArtifact;
use crate::config::RunnerConfig;
use crate::error::{EnvironmentError, EnvironmentResult};
use crate::report::{Failure, FailureKind, TestResult};

/// Fallback `PATH` when the parent process has none
const DEFAULT_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// Execute one staged artifact and capture its result.
///
/// Implementations must report per-artifact problems as `TestResult::Failed` and
/// reserve `Err` for failures of the environment itself.
pub trait Evaluator: Send + Sync {
    fn evaluate(
        &self,
        artifact: &TestArtifact,
        script: &Path,
        workdir: &Path,
    ) -> impl Future<Output = EnvironmentResult<TestResult>> + Send;
}

// ============================================================================
// Python interpreter
// ============================================================================

/// Runs staged `unittest` modules with a Python interpreter in a child process.
///
/// The child gets a cleared environment (only `PATH` and `PYTHONIOENCODING`),
/// no stdin, and the working context as its current directory. It is killed when
/// the watchdog fires.
#[derive(Debug, Clone)]
pub struct PythonEvaluator {
    interpreter: PathBuf,
    timeout: Option<Duration>,
}

impl PythonEvaluator {
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            timeout: config.timeout,
        }
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// Is the configured interpreter runnable at all?
    pub async fn is_available(&self) -> bool {
        Command::new(&self.interpreter)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn interpreter_error(&self, source: std::io::Error) -> EnvironmentError {
        EnvironmentError::Interpreter {
            interpreter: self.interpreter.clone(),
            source,
        }
    }
}

impl Evaluator for PythonEvaluator {
    fn evaluate(
        &self,
        artifact: &TestArtifact,
        script: &Path,
        workdir: &Path,
    ) -> impl Future<Output = EnvironmentResult<TestResult>> + Send {
        async move {
            let start = Instant::now();
            let path_env = std::env::var("PATH").unwrap_or_else(|_| DEFAULT_PATH.to_string());

            let child = Command::new(&self.interpreter)
                .arg("-B")
                .arg(script)
                .current_dir(workdir)
                .env_clear()
                .env("PATH", &path_env)
                .env("PYTHONIOENCODING", "utf-8")
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| self.interpreter_error(e))?;

            // On timeout the child is dropped here and killed
            let output = match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                    Ok(output) => output,
                    Err(_) => {
                        tracing::warn!(
                            test = %artifact.name,
                            "artifact exceeded {:.1}s, killed",
                            limit.as_secs_f64()
                        );
                        return Ok(TestResult::Failed(
                            start.elapsed(),
                            Failure::new(
                                FailureKind::TimedOut,
                                format!("exceeded {:.1}s time limit", limit.as_secs_f64()),
                            ),
                        ));
                    }
                },
                None => child.wait_with_output().await,
            }
            .map_err(|e| self.interpreter_error(e))?;

            let duration = start.elapsed();
            let stderr = String::from_utf8_lossy(&output.stderr);
            Ok(classify(output.status, &stderr, duration))
        }
    }
}

// ============================================================================
// Output classification
// ============================================================================

/// Turn an interpreter exit status and its stderr into a test result.
///
/// - exit 0 with unittest's `Ran 1 test` and a bare `OK` line → passed
/// - `FAIL:` header from unittest → assertion failure
/// - `ERROR:` header from unittest → the call raised
/// - non-zero exit with an exception line → the module never reached the test
///   (load error)
/// - anything else → the process went away before unittest reported a result
///   (aborted)
pub fn classify(status: ExitStatus, stderr: &str, duration: Duration) -> TestResult {
    if status.success() && reported_ok(stderr) {
        return TestResult::Passed(duration);
    }

    let has_header = |prefix: &str| stderr.lines().any(|l| l.starts_with(prefix));
    let exception = exception_line(stderr);

    let failure = if has_header("FAIL: ") {
        Failure::new(FailureKind::Assertion, exception.unwrap_or_else(|| stderr.trim().to_string()))
    } else if has_header("ERROR: ") {
        Failure::new(FailureKind::Raised, exception.unwrap_or_else(|| stderr.trim().to_string()))
    } else {
        match exception {
            Some(exception) if !status.success() => Failure::new(FailureKind::Load, exception),
            _ => Failure::new(
                FailureKind::Aborted,
                format!("interpreter exited with {} before the test reported a result", status),
            ),
        }
    };

    TestResult::Failed(duration, failure)
}

/// Did unittest finish exactly one test without failures or skips?
fn reported_ok(stderr: &str) -> bool {
    let mut ran_one = false;
    let mut ok = false;
    for line in stderr.lines() {
        let line = line.trim_end();
        ran_one |= line.starts_with("Ran 1 test ");
        ok |= line == "OK";
    }
    ran_one && ok
}

/// The final exception line of the last traceback in `stderr`.
///
/// Without a traceback (syntax errors are reported without one) the last
/// unindented line is used.
fn exception_line(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr.lines().collect();
    let is_exception = |l: &&&str| !l.trim().is_empty() && !l.starts_with(char::is_whitespace);

    let last_traceback = lines.iter().rposition(|l| l.starts_with("Traceback (most recent call last):"));
    let found = match last_traceback {
        Some(pos) => lines[pos + 1..].iter().find(is_exception),
        None => lines
            .iter()
            .rev()
            .filter(is_exception)
            .find(|l| !l.starts_with("Ran ") && !l.starts_with("FAILED") && !l.starts_with("---")),
    };
    found.map(|l| l.trim_end().to_string())
}
