//! Runner configuration
//!
//! Resolution order: defaults, then environment (`SMOKEGEN_PYTHON`,
//! `SMOKEGEN_TIMEOUT_SECS`), then command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use crate::backend::workspace::DEFAULT_PREFIX;

/// Environment variable naming the Python interpreter
pub const PYTHON_ENV: &str = "SMOKEGEN_PYTHON";
/// Environment variable holding the per-artifact timeout in seconds (`0` disables it)
pub const TIMEOUT_ENV: &str = "SMOKEGEN_TIMEOUT_SECS";

/// Default per-artifact timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the isolated runner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Interpreter used to execute artifacts
    pub interpreter: PathBuf,
    /// Upper bound on one artifact's execution time (`None` = unbounded)
    pub timeout: Option<Duration>,
    /// Directory under which working contexts are created (`None` = system temp dir)
    pub context_root: Option<PathBuf>,
    /// Name prefix of working context directories
    pub context_prefix: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from("python3"),
            timeout: Some(DEFAULT_TIMEOUT),
            context_root: None,
            context_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl RunnerConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the known variables.
    ///
    /// Unparseable timeouts are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(python) = lookup(PYTHON_ENV).filter(|v| !v.trim().is_empty()) {
            config.interpreter = PathBuf::from(python.trim());
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config = config.with_timeout_secs(secs),
                Err(_) => tracing::warn!("Ignoring invalid {}={:?}", TIMEOUT_ENV, raw),
            }
        }

        config
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Set the timeout in whole seconds; `0` disables the watchdog
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the directory under which working contexts are created
    pub fn with_context_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.context_root = Some(root.into());
        self
    }
}
