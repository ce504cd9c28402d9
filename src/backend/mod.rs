//! Smokegen Backend
//!
//! This module turns code blocks into executable test artifacts and stages
//! them on disk.
//!
//! The pipeline is:
//! 1. Code blocks from the frontend → `synthesize` → one `unittest` module per block
//! 2. A fresh `WorkingContext` per run receives the modules
//! 3. The runner executes them and the context is removed
//!
//! ## Module Organization
//!
//! - `synthesizer.rs` - Test artifact generation
//! - `workspace.rs` - Disposable per-run working directories

pub mod synthesizer;
pub mod workspace;

pub use synthesizer::{SynthesisError, TestArtifact, module_file_name, synthesize, test_name};
pub use workspace::WorkingContext;
