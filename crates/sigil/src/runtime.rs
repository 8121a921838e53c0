// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Render-time evaluation used by compiled render functions.
//!
//! A [`Scope`] is the data view a compiled block renders against: the
//! caller's [`Data`] at the root, plus one link per enclosing iteration that
//! binds the iterator name to the current element. Links live on the stack
//! of the render call, so binding an element never copies the data.

use crate::error::RenderError;
use crate::helpers::Helpers;
use crate::value::{Data, Value};
use std::collections::BTreeSet;

/// The data view of a single render call.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// The caller-supplied mapping.
    Root(&'a Data),
    /// An iterator name bound to one element, shadowing `parent`.
    Bound {
        /// The iterator name.
        name: &'a str,
        /// The current element.
        value: &'a Value,
        /// The enclosing scope.
        parent: &'a Scope<'a>,
    },
}

impl<'a> Scope<'a> {
    /// Looks up a key, innermost binding first.
    pub fn lookup(&self, key: &str) -> Option<&'a Value> {
        let mut scope = *self;
        loop {
            match scope {
                Scope::Root(data) => return data.get(key),
                Scope::Bound {
                    name,
                    value,
                    parent,
                } => {
                    if name == key {
                        return Some(value);
                    }
                    scope = *parent;
                }
            }
        }
    }

    /// Like [`lookup`](Self::lookup), but treats an explicit null as absent.
    pub fn lookup_present(&self, key: &str) -> Option<&'a Value> {
        self.lookup(key).filter(|v| !v.is_null())
    }

    /// Rejects the first key visible in this scope that is not in `valid`.
    pub fn validate(&self, valid: &BTreeSet<String>) -> Result<(), RenderError> {
        let mut scope = *self;
        loop {
            match scope {
                Scope::Root(data) => {
                    return match data.keys().find(|key| !valid.contains(*key)) {
                        Some(key) => Err(RenderError::UnexpectedKey(key.to_string())),
                        None => Ok(()),
                    };
                }
                Scope::Bound { name, parent, .. } => {
                    if !valid.contains(name) {
                        return Err(RenderError::UnexpectedKey(name.to_string()));
                    }
                    scope = *parent;
                }
            }
        }
    }
}

/// Appends a placeholder's output.
///
/// Absent or null values fall back to the default, which is escaped like
/// any other emitted text.
pub fn emit_placeholder(
    scope: &Scope<'_>,
    key: &str,
    default_value: Option<&str>,
    helpers: &Helpers,
    out: &mut String,
) -> Result<(), RenderError> {
    match scope.lookup_present(key) {
        Some(value) => emit_value(key, value, helpers, out),
        None => match default_value {
            Some(default) => {
                out.push_str(&helpers.escape(default));
                Ok(())
            }
            None => Err(RenderError::MissingKey(key.to_string())),
        },
    }
}

/// Appends one value, applying the safe-value and nested-template rules.
pub fn emit_value(
    key: &str,
    value: &Value,
    helpers: &Helpers,
    out: &mut String,
) -> Result<(), RenderError> {
    match value {
        Value::Safe(safe) => out.push_str(safe.as_str()),
        Value::Template(template) => {
            if template.requires_data() {
                return Err(RenderError::NestedTemplateNeedsData(key.to_string()));
            }
            tracing::trace!(key, "rendering nested template with empty data");
            let rendered = template.render(&Data::new())?;
            out.push_str(rendered.as_str());
        }
        Value::String(s) => out.push_str(&helpers.escape(s)),
        other => out.push_str(&helpers.escape(&other.to_string())),
    }
    Ok(())
}

/// Resolves an iteration source to its elements.
pub fn resolve_collection<'a>(scope: &Scope<'a>, key: &str) -> Result<&'a [Value], RenderError> {
    match scope.lookup(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(RenderError::NotIterable {
            key: key.to_string(),
            found: other.type_name(),
        }),
        None => Err(RenderError::NotIterable {
            key: key.to_string(),
            found: "undefined",
        }),
    }
}
