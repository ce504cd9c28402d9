//! Property-based tests for smokegen
//!
//! These tests use proptest to verify the extraction, synthesis and aggregation
//! invariants across randomly generated inputs.

use std::time::Duration;

use proptest::prelude::*;
use smokegen::backend::synthesize;
use smokegen::frontend::{extract, is_definition_line};
use smokegen::report::{Failure, FailureKind, Outcome, Status, TestResult, aggregate};

/// One source line: a definition (possibly indented), body code, a comment or blank.
fn source_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "(    )?def [a-z_][a-z0-9_]{0,8}\\(\\):",
        "    [a-z_ =+0-9()'#]{0,24}",
        "[a-z_ =+0-9()'#]{0,24}",
        Just(String::new()),
    ]
}

fn source_text() -> impl Strategy<Value = String> {
    (prop::collection::vec(source_line(), 0..40), any::<bool>()).prop_map(|(lines, trailing_newline)| {
        let mut text = lines.join("\n");
        if trailing_newline {
            text.push('\n');
        }
        text
    })
}

// =============================================================================
// Extraction Properties
// =============================================================================

proptest! {
    /// Property: every definition line opens exactly one block
    #[test]
    fn block_count_matches_definition_lines(source in source_text()) {
        let defs = source.lines().filter(|l| is_definition_line(l)).count();
        prop_assert_eq!(extract(&source).len(), defs);
    }

    /// Property: blocks are contiguous, ordered, and cover everything from the first definition on
    #[test]
    fn blocks_reconstruct_source_tail(source in source_text()) {
        let lines: Vec<&str> = source.lines().collect();
        let blocks = extract(&source);

        let first_def = lines.iter().position(|l| is_definition_line(l));
        let expected: Vec<&str> = match first_def {
            Some(pos) => lines[pos..].to_vec(),
            None => Vec::new(),
        };
        let covered: Vec<&str> = blocks.iter().flat_map(|b| b.lines()).collect();
        prop_assert_eq!(covered, expected);

        for (i, block) in blocks.iter().enumerate() {
            prop_assert_eq!(block.index, i);
            prop_assert!(is_definition_line(block.definition_line()));
            prop_assert_eq!(lines[block.start_line - 1], block.definition_line());
            // Only the first line of a block is a definition line
            prop_assert!(block.lines().skip(1).all(|l| !is_definition_line(l)));
        }
    }

    /// Property: extraction is deterministic
    #[test]
    fn extraction_is_deterministic(source in source_text()) {
        prop_assert_eq!(extract(&source), extract(&source));
    }

    /// Property: one uniquely named artifact per block, in block order
    #[test]
    fn one_artifact_per_block(source in source_text()) {
        let blocks = extract(&source);
        let artifacts = synthesize(&blocks);
        prop_assert_eq!(artifacts.len(), blocks.len());

        let mut names: Vec<&str> = artifacts.iter().map(|a| a.name.as_str()).collect();
        for (artifact, block) in artifacts.iter().zip(&blocks) {
            prop_assert_eq!(artifact.index, block.index);
            prop_assert_eq!(&artifact.name, &format!("TestFunction_{}", block.index));
        }
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(names.len(), blocks.len());
    }
}

// =============================================================================
// Aggregation Properties
// =============================================================================

fn outcomes() -> impl Strategy<Value = Vec<Outcome>> {
    prop::collection::vec(any::<bool>(), 0..30).prop_map(|flags| {
        flags
            .into_iter()
            .enumerate()
            .map(|(i, passed)| {
                let result = if passed {
                    TestResult::Passed(Duration::ZERO)
                } else {
                    TestResult::Failed(Duration::ZERO, Failure::new(FailureKind::Raised, "boom"))
                };
                Outcome::new(format!("TestFunction_{i}"), result)
            })
            .collect()
    })
}

proptest! {
    /// Property: status is pass iff no name failed
    #[test]
    fn status_pass_iff_no_failures(outcomes in outcomes()) {
        let report = aggregate(&outcomes);
        prop_assert_eq!(report.status == Status::Pass, report.failed_names.is_empty());
        prop_assert_eq!(report.failed_names.is_empty(), outcomes.iter().all(|o| o.passed()));
    }

    /// Property: failed names are exactly the failing outcomes, in order
    #[test]
    fn failed_names_preserve_order(outcomes in outcomes()) {
        let report = aggregate(&outcomes);
        let expected: Vec<String> = outcomes.iter().filter(|o| !o.passed()).map(|o| o.name.clone()).collect();
        prop_assert_eq!(report.failed_names, expected);
    }
}
