// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Template parser.
//!
//! Turns template source into a balanced [`Node`] tree in a single left to
//! right pass over the directives:
//!
//! | Directive   | Form                                  |
//! |-------------|---------------------------------------|
//! | Placeholder | `@{key}` or `@{key=default}`          |
//! | Conditional | `@if{key}` ... [`@else` ...] `@endif` |
//! | Iteration   | `@for{item in items}` ... `@endfor`   |
//!
//! Directive bodies cannot contain `{` or `}`. An `@` that does not start a
//! complete directive is kept as literal text.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sigil::Parser;
//!
//! let nodes = Parser::new().parse("Hello, @{name=Guest}!")?;
//! assert_eq!(nodes.len(), 3);
//! ```

use crate::ast::{BlockKind, Node};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{ParseError, ParseErrorKind};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Groups: 1 = if|for, 2 = block body, 3 = else, 4 = endif|endfor, 5 = placeholder body.
    static ref DIRECTIVE_RE: Regex =
        Regex::new(r"@(if|for)\{([^{}]*)\}|@(else)|@(endif|endfor)|@\{([^{}]*)\}").unwrap();
}

/// Separator between the iterator name and the collection key in `@for`.
const ITERATION_SEPARATOR: &str = " in ";

/// Template parser with a configurable nesting ceiling.
#[derive(Debug, Clone)]
pub struct Parser {
    max_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// A block that has been opened but not yet closed.
struct OpenBlock {
    frame: Frame,
    /// Byte offset of the opening directive, for error reporting.
    offset: usize,
}

enum Frame {
    Conditional {
        condition_key: String,
        true_branch: Vec<Node>,
        false_branch: Option<Vec<Node>>,
    },
    Iteration {
        iterator_name: String,
        collection_key: String,
        body: Vec<Node>,
    },
}

impl Frame {
    fn kind(&self) -> BlockKind {
        match self {
            Frame::Conditional { .. } => BlockKind::Conditional,
            Frame::Iteration { .. } => BlockKind::Iteration,
        }
    }

    /// The list that text and directives are currently appended to.
    fn active(&mut self) -> &mut Vec<Node> {
        match self {
            Frame::Conditional {
                false_branch: Some(branch),
                ..
            } => branch,
            Frame::Conditional { true_branch, .. } => true_branch,
            Frame::Iteration { body, .. } => body,
        }
    }

    fn into_node(self) -> Node {
        match self {
            Frame::Conditional {
                condition_key,
                true_branch,
                false_branch,
            } => Node::Conditional {
                condition_key,
                true_branch,
                false_branch,
            },
            Frame::Iteration {
                iterator_name,
                collection_key,
                body,
            } => Node::Iteration {
                iterator_name,
                collection_key,
                body,
            },
        }
    }
}

fn active<'a>(root: &'a mut Vec<Node>, stack: &'a mut [OpenBlock]) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some(open) => open.frame.active(),
        None => root,
    }
}

impl Parser {
    /// Creates a parser with the default nesting ceiling of 50.
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Creates a parser that allows at most `max_depth` simultaneously open blocks.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// The nesting ceiling.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Parses template source into a node tree.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for unbalanced or malformed blocks, or when
    /// nesting exceeds the ceiling. No partial tree is returned.
    pub fn parse(&self, source: &str) -> Result<Vec<Node>, ParseError> {
        let mut root: Vec<Node> = Vec::new();
        let mut stack: Vec<OpenBlock> = Vec::new();
        let mut last = 0;

        for caps in DIRECTIVE_RE.captures_iter(source) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let start = whole.start();

            if start > last {
                active(&mut root, &mut stack).push(Node::literal(&source[last..start]));
            }

            if let Some(keyword) = caps.get(1) {
                let content = caps.get(2).map_or("", |m| m.as_str()).trim();

                if stack.len() >= self.max_depth {
                    return Err(ParseError::at(
                        ParseErrorKind::MaxNestingExceeded(self.max_depth),
                        source,
                        start,
                    ));
                }

                let frame = if keyword.as_str() == "if" {
                    Frame::Conditional {
                        condition_key: content.to_string(),
                        true_branch: Vec::new(),
                        false_branch: None,
                    }
                } else {
                    let (iterator_name, collection_key) =
                        parse_iteration(content).ok_or_else(|| {
                            ParseError::at(
                                ParseErrorKind::InvalidIterationSyntax(content.to_string()),
                                source,
                                start,
                            )
                        })?;
                    Frame::Iteration {
                        iterator_name,
                        collection_key,
                        body: Vec::new(),
                    }
                };

                stack.push(OpenBlock {
                    frame,
                    offset: start,
                });
            } else if caps.get(3).is_some() {
                match stack.last_mut() {
                    Some(OpenBlock {
                        frame: Frame::Conditional { false_branch, .. },
                        ..
                    }) => {
                        if false_branch.is_some() {
                            return Err(ParseError::at(
                                ParseErrorKind::DuplicateElse,
                                source,
                                start,
                            ));
                        }
                        *false_branch = Some(Vec::new());
                    }
                    _ => {
                        return Err(ParseError::at(
                            ParseErrorKind::DanglingElse,
                            source,
                            start,
                        ));
                    }
                }
            } else if let Some(end) = caps.get(4) {
                let closer = if end.as_str() == "endif" {
                    BlockKind::Conditional
                } else {
                    BlockKind::Iteration
                };

                match stack.pop() {
                    Some(open) if open.frame.kind() == closer => {
                        let node = open.frame.into_node();
                        active(&mut root, &mut stack).push(node);
                    }
                    open => {
                        return Err(ParseError::at(
                            ParseErrorKind::DanglingEnd {
                                closer,
                                open: open.map(|o| o.frame.kind()),
                            },
                            source,
                            start,
                        ));
                    }
                }
            } else if let Some(body) = caps.get(5) {
                active(&mut root, &mut stack).push(parse_placeholder(body.as_str()));
            }

            last = whole.end();
        }

        if last < source.len() {
            active(&mut root, &mut stack).push(Node::literal(&source[last..]));
        }

        if let Some(open) = stack.last() {
            return Err(ParseError::at(
                ParseErrorKind::UnclosedBlock(open.frame.kind()),
                source,
                open.offset,
            ));
        }

        tracing::debug!(nodes = root.len(), "parsed template");
        Ok(root)
    }
}

/// Splits `key=default` on the first `=`; both sides are trimmed.
fn parse_placeholder(content: &str) -> Node {
    match content.split_once('=') {
        Some((key, default)) => Node::placeholder_with_default(key.trim(), default.trim()),
        None => Node::placeholder(content.trim()),
    }
}

/// Splits `item in items` into `(item, items)`.
///
/// Exactly one separator is required and neither side may be empty.
fn parse_iteration(content: &str) -> Option<(String, String)> {
    let mut parts = content.split(ITERATION_SEPARATOR);
    let iterator_name = parts.next()?.trim();
    let collection_key = parts.next()?.trim();
    if parts.next().is_some() || iterator_name.is_empty() || collection_key.is_empty() {
        return None;
    }
    Some((iterator_name.to_string(), collection_key.to_string()))
}
