// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Node tree to render function lowering.
//!
//! Every node becomes a boxed closure, and every conditional branch and
//! iteration body becomes a nested block of closures. All of this happens
//! once, at compile time: a render call only walks the prebuilt closures,
//! so its cost is linear in the size of the output.
//!
//! # Key Validation
//!
//! Each block carries the set of keys it accepts and rejects any other key
//! visible in its scope before emitting anything. The top-level set is every
//! key the template can consume. How nested blocks derive their set depends on
//! [`KeyValidation`]:
//!
//! - `Inherited`: a branch accepts everything its enclosing scopes accept,
//!   plus what it declares itself.
//! - `Local`: a branch accepts only what it declares itself, plus the keys
//!   its enclosing blocks branch or iterate on.
//!
//! An iteration body always accepts its own iterator name.

use crate::analysis::{collect_keys, nesting_depth};
use crate::ast::Node;
use crate::config::{EngineConfig, KeyValidation, DEFAULT_MAX_DEPTH};
use crate::error::{CompileError, RenderError};
use crate::helpers::Helpers;
use crate::runtime::{emit_placeholder, resolve_collection, Scope};
use crate::safe_string::SafeString;
use crate::value::{Data, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A compiled template body: `(data, helpers) -> SafeString`.
///
/// Render functions hold no mutable state and can be called concurrently
/// from any number of threads.
pub type RenderFunction =
    Arc<dyn Fn(&Data, &Helpers) -> Result<SafeString, RenderError> + Send + Sync>;

/// One precompiled instruction, or a whole precompiled block.
type Step = Box<dyn Fn(&Scope<'_>, &Helpers, &mut String) -> Result<(), RenderError> + Send + Sync>;

/// Lowers node trees into render functions.
#[derive(Debug, Clone)]
pub struct Compiler {
    key_validation: KeyValidation,
    max_depth: usize,
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            key_validation: KeyValidation::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Compiler {
    /// Creates a compiler from engine settings.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            key_validation: config.key_validation,
            max_depth: config.max_depth,
        }
    }

    /// The key validation scope used for nested blocks.
    pub fn key_validation(&self) -> KeyValidation {
        self.key_validation
    }

    /// Compiles a node tree with no inherited keys.
    pub fn compile(&self, nodes: &[Node]) -> Result<RenderFunction, CompileError> {
        self.compile_scoped(nodes, &BTreeSet::new())
    }

    /// Compiles a node tree that also accepts `inherited` keys at render time.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::NestingTooDeep`] for trees nested deeper than
    /// the configured ceiling. Trees produced by the parser never are.
    pub fn compile_scoped(
        &self,
        nodes: &[Node],
        inherited: &BTreeSet<String>,
    ) -> Result<RenderFunction, CompileError> {
        let depth = nesting_depth(nodes);
        if depth > self.max_depth {
            return Err(CompileError::NestingTooDeep {
                depth,
                limit: self.max_depth,
            });
        }

        let block = self.lower_block(nodes, inherited, inherited);
        tracing::debug!(nodes = nodes.len(), depth, "compiled template");

        Ok(Arc::new(
            move |data: &Data, helpers: &Helpers| -> Result<SafeString, RenderError> {
                let mut out = String::new();
                block(&Scope::Root(data), helpers, &mut out)?;
                Ok(helpers.safe_string(out))
            },
        ))
    }

    /// Lowers a node list into a block that validates its scope, then runs
    /// its steps in document order.
    fn lower_block(
        &self,
        nodes: &[Node],
        inherited: &BTreeSet<String>,
        exempt: &BTreeSet<String>,
    ) -> Step {
        let local = collect_keys(nodes);
        let base = match self.key_validation {
            KeyValidation::Inherited => inherited,
            KeyValidation::Local => exempt,
        };
        let valid: BTreeSet<String> = base.union(&local).cloned().collect();

        let steps: Vec<Step> = nodes
            .iter()
            .map(|node| self.lower_node(node, &valid, exempt))
            .collect();

        Box::new(
            move |scope: &Scope<'_>, helpers: &Helpers, out: &mut String| -> Result<(), RenderError> {
                scope.validate(&valid)?;
                for step in &steps {
                    step(scope, helpers, out)?;
                }
                Ok(())
            },
        )
    }

    fn lower_node(&self, node: &Node, valid: &BTreeSet<String>, exempt: &BTreeSet<String>) -> Step {
        match node {
            Node::Literal { value } => {
                let value = value.clone();
                Box::new(
                    move |_: &Scope<'_>, _: &Helpers, out: &mut String| -> Result<(), RenderError> {
                        out.push_str(&value);
                        Ok(())
                    },
                )
            }

            Node::Placeholder { key, default_value } => {
                let key = key.clone();
                let default_value = default_value.clone();
                Box::new(
                    move |scope: &Scope<'_>, helpers: &Helpers, out: &mut String| -> Result<(), RenderError> {
                        emit_placeholder(scope, &key, default_value.as_deref(), helpers, out)
                    },
                )
            }

            Node::Conditional {
                condition_key,
                true_branch,
                false_branch,
            } => {
                let mut branch_exempt = exempt.clone();
                branch_exempt.insert(condition_key.clone());

                let on_true = self.lower_block(true_branch, valid, &branch_exempt);
                let on_false = false_branch
                    .as_deref()
                    .map(|branch| self.lower_block(branch, valid, &branch_exempt));
                let key = condition_key.clone();

                Box::new(
                    move |scope: &Scope<'_>, helpers: &Helpers, out: &mut String| -> Result<(), RenderError> {
                        if scope.lookup(&key).is_some_and(Value::is_truthy) {
                            on_true(scope, helpers, out)
                        } else if let Some(on_false) = &on_false {
                            on_false(scope, helpers, out)
                        } else {
                            Ok(())
                        }
                    },
                )
            }

            Node::Iteration {
                iterator_name,
                collection_key,
                body,
            } => {
                let mut body_valid = valid.clone();
                body_valid.insert(iterator_name.clone());
                let mut body_exempt = exempt.clone();
                body_exempt.insert(collection_key.clone());
                body_exempt.insert(iterator_name.clone());

                let body = self.lower_block(body, &body_valid, &body_exempt);
                let iterator_name = iterator_name.clone();
                let collection_key = collection_key.clone();

                Box::new(
                    move |scope: &Scope<'_>, helpers: &Helpers, out: &mut String| -> Result<(), RenderError> {
                        for item in resolve_collection(scope, &collection_key)? {
                            let bound = Scope::Bound {
                                name: &iterator_name,
                                value: item,
                                parent: scope,
                            };
                            body(&bound, helpers, out)?;
                        }
                        Ok(())
                    },
                )
            }
        }
    }
}
