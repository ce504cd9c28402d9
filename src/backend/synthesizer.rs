//! Test synthesis: wrap each extracted block in a standalone `unittest` module.
//!
//! Every artifact embeds the block inside a zero-argument `test_function()` that
//! calls the block's function and returns its result. The generated test case
//! asserts that result is `None`: a bare definition without an explicit return
//! must load, run without raising and implicitly yield `None`. A block raising
//! `unittest.SkipTest` is re-raised as `RuntimeError` so it cannot count as a pass.
//!
//! Generated module layout:
//!
//! ```text
//! import unittest
//!
//!
//! def test_function():
//!     <block, re-indented>
//!     return <name>()
//!
//!
//! class TestFunction_<i>(unittest.TestCase):
//!     def test_generated_code(self):
//!         try:
//!             result = test_function()
//!         except unittest.SkipTest as skip:
//!             raise RuntimeError('block raised SkipTest: %s' % skip) from None
//!         self.assertIsNone(result)
//!
//!
//! if __name__ == '__main__':
//!     unittest.main()
//! ```

use thiserror::Error;

use crate::frontend::CodeBlock;

/// Indentation used inside generated modules.
const INDENT: &str = "    ";

/// Errors that prevent a block from being embedded into a loadable module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("line {line}: definition has no function name")]
    MissingFunctionName { line: usize },

    #[error("line {line}: source contains a NUL byte")]
    NulByte { line: usize },
}

/// A synthesized, independently executable wrapper around one code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestArtifact {
    /// Index of the wrapped block
    pub index: usize,
    /// Unique test name within a run (`TestFunction_<index>`)
    pub name: String,
    /// Generated module source, or the reason it could not be generated
    pub body: Result<String, SynthesisError>,
}

impl TestArtifact {
    /// File name the artifact is staged under inside a working context.
    pub fn module_file_name(&self) -> String {
        module_file_name(self.index)
    }
}

/// Deterministic test name for the block at `index`.
pub fn test_name(index: usize) -> String {
    format!("TestFunction_{index}")
}

/// Deterministic module file name for the block at `index`.
pub fn module_file_name(index: usize) -> String {
    format!("generated_tests_{index}.py")
}

/// Produce one artifact per block, preserving order.
#[tracing::instrument(skip_all, fields(block_count = blocks.len()))]
pub fn synthesize(blocks: &[CodeBlock]) -> Vec<TestArtifact> {
    blocks
        .iter()
        .map(|block| {
            let body = render_module(block);
            if let Err(e) = &body {
                tracing::debug!(index = block.index, error = %e, "block cannot be synthesized");
            }
            TestArtifact {
                index: block.index,
                name: test_name(block.index),
                body,
            }
        })
        .collect()
}

fn render_module(block: &CodeBlock) -> Result<String, SynthesisError> {
    if let Some(offset) = block.lines().position(|l| l.contains('\0')) {
        return Err(SynthesisError::NulByte {
            line: block.start_line + offset,
        });
    }
    let function_name = block
        .function_name()
        .ok_or(SynthesisError::MissingFunctionName { line: block.start_line })?;

    let mut out = String::new();
    out.push_str("import unittest\n\n\n");
    out.push_str("def test_function():\n");
    for line in reindent(block) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&format!("{INDENT}return {function_name}()\n\n\n"));
    out.push_str(&format!("class {}(unittest.TestCase):\n", test_name(block.index)));
    out.push_str(&format!("{INDENT}def test_generated_code(self):\n"));
    out.push_str(&format!("{INDENT}{INDENT}try:\n"));
    out.push_str(&format!("{INDENT}{INDENT}{INDENT}result = test_function()\n"));
    out.push_str(&format!("{INDENT}{INDENT}except unittest.SkipTest as skip:\n"));
    out.push_str(&format!(
        "{INDENT}{INDENT}{INDENT}raise RuntimeError('block raised SkipTest: %s' % skip) from None\n"
    ));
    out.push_str(&format!("{INDENT}{INDENT}self.assertIsNone(result)\n\n\n"));
    out.push_str("if __name__ == '__main__':\n");
    out.push_str(&format!("{INDENT}unittest.main()\n"));
    Ok(out)
}

/// Shift the block so its definition line sits one level inside `test_function`.
///
/// The definition line's own indentation is removed from every line that starts
/// with it; blank lines stay blank.
fn reindent(block: &CodeBlock) -> Vec<String> {
    let base = block.indent();
    block
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{INDENT}{}", line.strip_prefix(base).unwrap_or(line))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::extract;

    #[test]
    fn test_names_follow_block_order() {
        let artifacts = synthesize(&extract("def a():\n    pass\ndef b():\n    pass\ndef c():\n    pass\n"));
        let names: Vec<_> = artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["TestFunction_0", "TestFunction_1", "TestFunction_2"]);
        assert_eq!(artifacts[2].module_file_name(), "generated_tests_2.py");
    }

    #[test]
    fn test_body_calls_block_and_asserts_none() {
        let artifacts = synthesize(&extract("def f():\n    pass\n"));
        let body = artifacts[0].body.as_ref().unwrap();
        assert!(body.contains("def test_function():\n    def f():\n        pass\n    return f()\n"));
        assert!(body.contains("class TestFunction_0(unittest.TestCase):"));
        assert!(body.contains("self.assertIsNone(result)"));
        assert!(body.contains("except unittest.SkipTest as skip:"));
        assert!(body.ends_with("unittest.main()\n"));
    }

    #[test]
    fn test_nested_block_is_dedented() {
        let artifacts = synthesize(&extract("class A:\n    def m():\n        return None\n"));
        let body = artifacts[0].body.as_ref().unwrap();
        assert!(body.contains("\n    def m():\n        return None\n    return m()\n"));
    }

    #[test]
    fn test_blank_lines_inside_block_are_emptied() {
        let artifacts = synthesize(&extract("def f():\n    x = 1\n   \n    return None\n"));
        let body = artifacts[0].body.as_ref().unwrap();
        assert!(body.contains("        x = 1\n\n        return None\n"));
    }

    #[test]
    fn test_missing_function_name_is_a_synthesis_error() {
        let artifacts = synthesize(&extract("def f():\n    pass\ndef ():\n    pass\n"));
        assert!(artifacts[0].body.is_ok());
        assert_eq!(
            artifacts[1].body,
            Err(SynthesisError::MissingFunctionName { line: 3 })
        );
    }

    #[test]
    fn test_nul_byte_is_a_synthesis_error() {
        let artifacts = synthesize(&extract("def f():\n    s = '\0'\n"));
        assert_eq!(artifacts[0].body, Err(SynthesisError::NulByte { line: 2 }));
    }

    #[test]
    fn test_empty_block_list() {
        assert!(synthesize(&[]).is_empty());
    }
}
