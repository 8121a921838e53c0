// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the sigil template engine.
//!
//! Failures are grouped by the stage that produces them:
//!
//! - [`ParseError`]: the template source is structurally invalid
//! - [`CompileError`]: a node tree cannot be lowered (only reachable for
//!   trees that did not come from the parser)
//! - [`RenderError`]: the data handed to a render call does not fit the template
//!
//! [`SigilError`] wraps all of them together with configuration, cache and
//! data-conversion failures.
//!
//! # Source Context
//!
//! Parse errors include a [`SourceContext`] so they can be displayed with the
//! offending line and a caret pointing at the directive.

use crate::ast::BlockKind;
use std::fmt;
use thiserror::Error;

/// Source context for enhanced error messages.
///
/// Captures a snippet of source code around an error location,
/// enabling rich error messages with line numbers and visual indicators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    /// All lines from the source text.
    pub lines: Vec<String>,
    /// The line number where the error occurred (1-indexed).
    pub error_line: usize,
    /// The column number where the error occurred (1-indexed).
    pub error_column: usize,
    /// First line number of the snippet (1-indexed).
    pub snippet_start: usize,
    /// Last line number of the snippet (1-indexed).
    pub snippet_end: usize,
}

impl SourceContext {
    /// Creates a source context from source text and error location.
    ///
    /// Captures up to 2 lines before and after the error line.
    pub fn from_source(source: &str, line: usize, column: usize) -> Self {
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        let snippet_start = line.saturating_sub(2).max(1);
        let snippet_end = (line + 2).min(lines.len()).max(snippet_start);

        Self {
            lines,
            error_line: line,
            error_column: column,
            snippet_start,
            snippet_end,
        }
    }

    /// Formats the snippet with line numbers and a caret under the error column.
    ///
    /// ```text
    ///    1 | <ul>
    ///    2 |   @for{item items}
    ///      |   ^
    ///    3 | </ul>
    /// ```
    pub fn format_snippet(&self) -> String {
        let mut result = String::new();

        for line_num in self.snippet_start..=self.snippet_end {
            let Some(line) = self.lines.get(line_num - 1) else {
                break;
            };

            result.push_str(&format!("{:4} | {}\n", line_num, line));

            if line_num == self.error_line {
                result.push_str(&format!(
                    "     | {}^\n",
                    " ".repeat(self.error_column.saturating_sub(1))
                ));
            }
        }

        result
    }
}

impl fmt::Display for SourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_snippet())
    }
}

/// Helper struct for displaying optional source context.
pub struct OptSourceContextDisplay<'a>(pub &'a Option<SourceContext>);

impl fmt::Display for OptSourceContextDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ctx) => write!(f, "\n{}", ctx),
            None => Ok(()),
        }
    }
}

/// Helper trait for formatting optional source context.
pub trait AsDisplay<'a> {
    /// Wraps self for Display formatting.
    fn as_display(&'a self) -> OptSourceContextDisplay<'a>;
}

impl<'a> AsDisplay<'a> for Option<SourceContext> {
    fn as_display(&'a self) -> OptSourceContextDisplay<'a> {
        OptSourceContextDisplay(self)
    }
}

/// The structural problem found while parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// End of input reached while a block was still open.
    #[error("unclosed {} block", .0.opener())]
    UnclosedBlock(BlockKind),

    /// `@else` with no open conditional as the innermost block.
    #[error("@else without @if")]
    DanglingElse,

    /// A second `@else` for the same conditional.
    #[error("multiple @else for @if")]
    DuplicateElse,

    /// A closer with no open block, or a closer of the wrong kind.
    #[error("{}", dangling_end_message(.closer, .open))]
    DanglingEnd {
        /// The closing directive that was found.
        closer: BlockKind,
        /// The innermost open block, if any.
        open: Option<BlockKind>,
    },

    /// A `@for` body without exactly one ` in ` separator.
    #[error("invalid @for syntax '{0}', expected @for{{item in items}}")]
    InvalidIterationSyntax(String),

    /// Opening one more block would exceed the nesting ceiling.
    #[error("maximum nesting depth of {0} exceeded")]
    MaxNestingExceeded(usize),
}

fn dangling_end_message(closer: &BlockKind, open: &Option<BlockKind>) -> String {
    match open {
        Some(open) => format!(
            "{} does not match the open {} block",
            closer.closer(),
            open.opener()
        ),
        None => format!("{} without {}", closer.closer(), closer.opener()),
    }
}

/// A template source that failed to parse.
///
/// No partial node tree survives a parse error; the template is rejected whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}, column {column}{}", source_context.as_display())]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Byte offset of the offending directive.
    pub offset: usize,
    /// 1-indexed line of the offending directive.
    pub line: usize,
    /// 1-indexed column of the offending directive.
    pub column: usize,
    /// Source snippet for display.
    pub source_context: Option<SourceContext>,
}

impl ParseError {
    /// Builds an error for the directive starting at byte `offset` of `source`.
    pub fn at(kind: ParseErrorKind, source: &str, offset: usize) -> Self {
        let (line, column) = line_and_column(source, offset);
        Self {
            kind,
            offset,
            line,
            column,
            source_context: Some(SourceContext::from_source(source, line, column)),
        }
    }
}

/// Converts a byte offset into a 1-indexed (line, column) pair.
fn line_and_column(source: &str, offset: usize) -> (usize, usize) {
    let prefix = source.get(..offset).unwrap_or(source);
    let line = prefix.matches('\n').count() + 1;
    let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = prefix[line_start..].chars().count() + 1;
    (line, column)
}

/// A node tree that cannot be lowered into a render function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A serialized node carried a tag outside the known node kinds.
    #[error("unknown node type '{0}'")]
    UnknownNodeType(String),

    /// A serialized node tree was malformed.
    #[error("invalid node tree: {0}")]
    InvalidNodeTree(String),

    /// A hand-built tree nests deeper than the configured ceiling.
    #[error("node tree nests {depth} blocks deep, maximum is {limit}")]
    NestingTooDeep {
        /// Actual nesting depth of the tree.
        depth: usize,
        /// Configured ceiling.
        limit: usize,
    },
}

/// A render call that failed.
///
/// Rendering is fail-fast: any output accumulated before the failure is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The data supplied a key the template never consumes.
    #[error("unexpected key '{0}' in data")]
    UnexpectedKey(String),

    /// A placeholder without a default had no value.
    #[error("missing required key '{0}'")]
    MissingKey(String),

    /// An uninvoked nested template that needs data was passed as a value.
    #[error("nested template for '{0}' requires data")]
    NestedTemplateNeedsData(String),

    /// An iteration source was not an array.
    #[error("'{key}' is not iterable (found {found})")]
    NotIterable {
        /// The collection key.
        key: String,
        /// Type name of the value found instead.
        found: &'static str,
    },
}

/// The main error type for sigil operations.
#[derive(Error, Debug)]
pub enum SigilError {
    /// Template parsing failed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Node tree lowering failed.
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Rendering failed.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Engine configuration is invalid.
    #[error("Config error: {0}")]
    Config(String),

    /// Cache operation failed.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Data could not be converted into a render mapping.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Convenience type alias for Results with [`SigilError`].
pub type Result<T> = std::result::Result<T, SigilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_column() {
        let source = "first\nsecond @if{x}\nthird";
        assert_eq!(line_and_column(source, 0), (1, 1));
        assert_eq!(line_and_column(source, 13), (2, 8));
    }

    #[test]
    fn test_snippet_points_at_column() {
        let source = "a\n  @endif\nb";
        let err = ParseError::at(
            ParseErrorKind::DanglingEnd {
                closer: BlockKind::Conditional,
                open: None,
            },
            source,
            4,
        );

        assert_eq!(err.line, 2);
        assert_eq!(err.column, 3);
        let snippet = err.source_context.as_ref().unwrap().format_snippet();
        assert!(snippet.contains("   2 |   @endif\n     |   ^\n"));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ParseErrorKind::UnclosedBlock(BlockKind::Conditional).to_string(),
            "unclosed @if block"
        );
        assert_eq!(
            ParseErrorKind::DanglingEnd {
                closer: BlockKind::Iteration,
                open: Some(BlockKind::Conditional),
            }
            .to_string(),
            "@endfor does not match the open @if block"
        );
        assert_eq!(
            ParseErrorKind::DanglingEnd {
                closer: BlockKind::Conditional,
                open: None,
            }
            .to_string(),
            "@endif without @if"
        );
        assert_eq!(
            RenderError::UnexpectedKey("extra".into()).to_string(),
            "unexpected key 'extra' in data"
        );
    }
}
