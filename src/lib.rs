#![forbid(unsafe_code)]
//! Smokegen: smoke-test synthesis and isolated execution for uploaded Python sources
//!
//! A submission flows through four stages:
//!
//! 1. **Extraction** (`frontend`): split source text into function-like blocks
//! 2. **Synthesis** (`backend`): wrap each block in a standalone `unittest` module
//! 3. **Execution** (`runner`): run the modules in a disposable working context
//! 4. **Aggregation** (`report`): reduce outcomes to a pass/fail report
//!
//! `pipeline` drives the stages; `submission` validates uploads and defines the
//! JSON reply; `cli` is the command-line front end.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `runner` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Generated code**: The synthesizer emits Python as *string literals*; nothing in those strings is executed by
//!   this crate.

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod frontend;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod submission;
pub mod version;

pub use backend::{TestArtifact, WorkingContext, synthesize};
pub use config::RunnerConfig;
pub use error::EnvironmentError;
pub use frontend::{CodeBlock, extract};
pub use pipeline::Pipeline;
pub use report::{Outcome, Report, Status, aggregate};
pub use runner::{Evaluator, PythonEvaluator};
pub use submission::{Rejection, Reply, Upload};
