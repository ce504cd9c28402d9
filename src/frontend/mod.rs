//! Smokegen Frontend
//!
//! This module turns raw source text into code blocks:
//! - `extractor`: line-oriented split of source into function-like units
//!
//! The split is a lexical heuristic, not a grammar-aware parse. See the
//! `extractor` module docs for the cases it misclassifies.

pub mod extractor;

pub use extractor::{CodeBlock, DEF_KEYWORD, extract, is_definition_line};
