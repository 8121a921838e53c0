// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Abstract Syntax Tree (AST) types for sigil templates.
//!
//! The parser produces a `Vec<Node>` which the compiler consumes once and
//! then drops; compiled render functions keep only what they need.
//!
//! # Node Types
//!
//! The node set is closed:
//! - [`Node::Literal`]: text copied verbatim
//! - [`Node::Placeholder`]: `@{key}` or `@{key=default}`
//! - [`Node::Conditional`]: `@if{key}` ... `@else` ... `@endif`
//! - [`Node::Iteration`]: `@for{item in items}` ... `@endfor`

use crate::error::CompileError;
use serde::{Deserialize, Serialize};

/// AST node types representing template structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// Plain text between directives.
    Literal {
        /// The text, preserving whitespace.
        value: String,
    },
    /// A value substitution.
    Placeholder {
        /// Data key to look up.
        key: String,
        /// Literal fallback used when the key is absent or null.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
    },
    /// A branch on the truthiness of a data key.
    Conditional {
        /// Data key whose truthiness selects the branch.
        condition_key: String,
        /// Nodes rendered when the condition is truthy.
        true_branch: Vec<Node>,
        /// Nodes rendered when the condition is falsy (from `@else`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        false_branch: Option<Vec<Node>>,
    },
    /// A body repeated once per element of a collection.
    Iteration {
        /// Name bound to the current element inside the body.
        iterator_name: String,
        /// Data key holding the collection.
        collection_key: String,
        /// Nodes rendered for each element.
        body: Vec<Node>,
    },
}

impl Node {
    /// Creates a literal node.
    pub fn literal(value: impl Into<String>) -> Self {
        Node::Literal {
            value: value.into(),
        }
    }

    /// Creates a placeholder node without a default.
    pub fn placeholder(key: impl Into<String>) -> Self {
        Node::Placeholder {
            key: key.into(),
            default_value: None,
        }
    }

    /// Creates a placeholder node with a literal default.
    pub fn placeholder_with_default(key: impl Into<String>, default: impl Into<String>) -> Self {
        Node::Placeholder {
            key: key.into(),
            default_value: Some(default.into()),
        }
    }
}

/// The two kinds of block directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// `@if` ... `@endif`
    Conditional,
    /// `@for` ... `@endfor`
    Iteration,
}

impl BlockKind {
    /// The opening directive name.
    pub fn opener(self) -> &'static str {
        match self {
            BlockKind::Conditional => "@if",
            BlockKind::Iteration => "@for",
        }
    }

    /// The closing directive name.
    pub fn closer(self) -> &'static str {
        match self {
            BlockKind::Conditional => "@endif",
            BlockKind::Iteration => "@endfor",
        }
    }
}

/// Loads a node tree from its JSON form.
///
/// This is the only path by which a tree can contain a tag the compiler does
/// not know, so it is where [`CompileError::UnknownNodeType`] originates.
pub fn nodes_from_json(text: &str) -> Result<Vec<Node>, CompileError> {
    serde_json::from_str(text).map_err(|e| {
        let message = e.to_string();
        match unknown_variant(&message) {
            Some(tag) => CompileError::UnknownNodeType(tag.to_string()),
            None => CompileError::InvalidNodeTree(message),
        }
    })
}

/// Dumps a node tree as pretty-printed JSON.
pub fn nodes_to_json(nodes: &[Node]) -> String {
    // Node contains only strings, vectors and options, which always serialize.
    serde_json::to_string_pretty(nodes).unwrap_or_default()
}

/// Extracts the tag from serde's "unknown variant `x`" message.
fn unknown_variant(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("unknown variant `")?;
    rest.split('`').next()
}
