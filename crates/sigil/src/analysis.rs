// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Static analysis of node trees.
//!
//! These walks run once per compile and feed the compiler (key sets for
//! closed-world validation) and [`CompiledTemplate`](crate::CompiledTemplate)
//! metadata (`requires_data`, `declared_keys`).

use crate::ast::Node;
use std::collections::BTreeSet;

/// Every data key the nodes can consume.
///
/// Includes placeholder keys, condition keys and collection keys, recursing
/// into branches and bodies. An iteration's own iterator name is bound per
/// element rather than read from data, so it is removed from its body's keys.
pub fn collect_keys(nodes: &[Node]) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    extend_keys(nodes, &mut keys);
    keys
}

fn extend_keys(nodes: &[Node], keys: &mut BTreeSet<String>) {
    for node in nodes {
        match node {
            Node::Literal { .. } => {}
            Node::Placeholder { key, .. } => {
                keys.insert(key.clone());
            }
            Node::Conditional {
                condition_key,
                true_branch,
                false_branch,
            } => {
                keys.insert(condition_key.clone());
                extend_keys(true_branch, keys);
                if let Some(false_branch) = false_branch {
                    extend_keys(false_branch, keys);
                }
            }
            Node::Iteration {
                iterator_name,
                collection_key,
                body,
            } => {
                keys.insert(collection_key.clone());
                let mut body_keys = collect_keys(body);
                body_keys.remove(iterator_name);
                keys.extend(body_keys);
            }
        }
    }
}

/// True if rendering with empty data could not succeed on its own.
///
/// That is the case when the tree contains a placeholder without a default
/// or any conditional, at any depth.
pub fn requires_data(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Literal { .. } => false,
        Node::Placeholder { default_value, .. } => default_value.is_none(),
        Node::Conditional { .. } => true,
        Node::Iteration { body, .. } => requires_data(body),
    })
}

/// Maximum number of nested conditional/iteration blocks.
pub fn nesting_depth(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            Node::Literal { .. } | Node::Placeholder { .. } => 0,
            Node::Conditional {
                true_branch,
                false_branch,
                ..
            } => {
                let false_depth = false_branch.as_deref().map_or(0, nesting_depth);
                1 + nesting_depth(true_branch).max(false_depth)
            }
            Node::Iteration { body, .. } => 1 + nesting_depth(body),
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn nodes(source: &str) -> Vec<Node> {
        Parser::new().parse(source).unwrap()
    }

    fn keys(source: &str) -> Vec<String> {
        collect_keys(&nodes(source)).into_iter().collect()
    }

    #[test]
    fn test_collect_keys() {
        assert_eq!(keys("Static"), Vec::<String>::new());
        assert_eq!(keys("@{b} @{a=1} @{b}"), vec!["a", "b"]);
        assert_eq!(
            keys("@if{show}@{name}@else@{other}@endif"),
            vec!["name", "other", "show"]
        );
    }

    #[test]
    fn test_iterator_name_is_not_a_key() {
        assert_eq!(keys("@for{n in nums}@{n}@{sep}@endfor"), vec!["nums", "sep"]);
    }

    #[test]
    fn test_iterator_name_outside_loop_is_a_key() {
        assert_eq!(keys("@{n}@for{n in nums}@{n}@endfor"), vec!["n", "nums"]);
    }

    #[test]
    fn test_requires_data() {
        assert!(!requires_data(&nodes("Static content")));
        assert!(!requires_data(&nodes("Hello, @{name=Guest}!")));
        assert!(requires_data(&nodes("Hello, @{name}!")));
        assert!(requires_data(&nodes("@if{x}@endif")));
        assert!(requires_data(&nodes("@for{n in nums}@{n}@endfor")));
        assert!(!requires_data(&nodes("@for{n in nums}-@endfor")));
    }

    #[test]
    fn test_nesting_depth() {
        assert_eq!(nesting_depth(&nodes("plain @{x}")), 0);
        assert_eq!(nesting_depth(&nodes("@if{a}@else@for{x in xs}@endfor@endif")), 2);
        assert_eq!(
            nesting_depth(&nodes("@if{a}@endif@for{x in xs}@if{b}@if{c}@endif@endif@endfor")),
            3
        );
    }
}
