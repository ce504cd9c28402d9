//! Unit extraction: split raw source text into function-like blocks.
//!
//! ## Algorithm
//!
//! A single top-to-bottom scan over the lines of the source with one piece of
//! state: whether a block is currently open. A line whose trimmed content starts
//! with [`DEF_KEYWORD`] closes the open block (if any) and opens a new one. Every
//! other line is appended to the open block, or dropped when no block is open yet.
//!
//! ## Limitations
//!
//! The split is lexical and indentation-agnostic. It does not check that a block is
//! syntactically complete, methods nested in a class open their own block, and a
//! `def ` appearing at the start of a line inside a multi-line string is treated as
//! a definition. Decorator lines are not definition lines, so a decorator stays at
//! the end of the preceding block (which then fails to load) and the decorated
//! function is extracted bare. Those blocks are handed on as-is and fail later when
//! they cannot be loaded or called.

/// Prefix (after leading whitespace) that marks a definition line.
pub const DEF_KEYWORD: &str = "def ";

/// One extracted function-like unit of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// 0-based position in extraction order
    pub index: usize,
    /// 1-based line number of the definition line in the source
    pub start_line: usize,
    /// Verbatim lines of the block, joined with `\n` (definition line first)
    pub text: String,
}

impl CodeBlock {
    /// Iterate over the block's lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    /// Number of source lines covered by this block.
    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    /// The line that opened this block.
    pub fn definition_line(&self) -> &str {
        self.lines().next().unwrap_or_default()
    }

    /// Leading whitespace of the definition line.
    pub fn indent(&self) -> &str {
        let line = self.definition_line();
        &line[..line.len() - line.trim_start().len()]
    }

    /// Identifier following `def `, if the definition line carries a valid one.
    pub fn function_name(&self) -> Option<&str> {
        let rest = self.definition_line().trim_start().strip_prefix(DEF_KEYWORD)?.trim_start();
        let end = rest
            .char_indices()
            .find(|(_, c)| !is_identifier_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let name = &rest[..end];
        match name.chars().next() {
            Some(first) if first.is_alphabetic() || first == '_' => Some(name),
            _ => None,
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Does this line open a new block?
pub fn is_definition_line(line: &str) -> bool {
    line.trim_start().starts_with(DEF_KEYWORD)
}

/// Split source text into an ordered sequence of code blocks.
///
/// Source without any definition line yields an empty vector.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn extract(source: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(usize, Vec<&str>)> = None;

    for (line_no, line) in source.lines().enumerate() {
        if is_definition_line(line) {
            if let Some((start, lines)) = current.take() {
                blocks.push(close_block(blocks.len(), start, &lines));
            }
            current = Some((line_no + 1, vec![line]));
        } else if let Some((_, lines)) = current.as_mut() {
            lines.push(line);
        }
    }

    if let Some((start, lines)) = current {
        blocks.push(close_block(blocks.len(), start, &lines));
    }

    tracing::debug!(blocks = blocks.len(), "extracted code blocks");
    blocks
}

fn close_block(index: usize, start_line: usize, lines: &[&str]) -> CodeBlock {
    CodeBlock {
        index,
        start_line,
        text: lines.join("\n"),
    }
}
