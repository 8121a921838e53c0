// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Render-time helpers: the escape function and the SafeString constructor.

use crate::safe_string::SafeString;
use std::fmt;
use std::sync::Arc;

/// Escape function applied to every emitted value that is not already safe.
pub type EscapeFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Constructor used to wrap the final output of every render call.
pub type SafeStringCtor = fn(String) -> SafeString;

/// The helper bundle passed to every render function.
///
/// An engine owns exactly one bundle and hands clones of it to every
/// template it creates, so all templates in a composition agree on escaping
/// and produce the same [`SafeString`] type.
#[derive(Clone)]
pub struct Helpers {
    escape: EscapeFn,
    safe_string: SafeStringCtor,
}

impl Helpers {
    /// Builds a bundle around a custom escape function.
    pub fn new<F>(escape: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            escape: Arc::new(escape),
            safe_string: wrap_safe,
        }
    }

    /// HTML escaping (the default).
    pub fn html() -> Self {
        Self::new(escape_html)
    }

    /// No escaping at all, for plain-text targets.
    pub fn raw() -> Self {
        Self::new(str::to_string)
    }

    /// Escapes a value.
    pub fn escape(&self, value: &str) -> String {
        (self.escape)(value)
    }

    /// Wraps output as a [`SafeString`].
    pub fn safe_string(&self, value: String) -> SafeString {
        (self.safe_string)(value)
    }

    /// Address of the shared escape function. Equal for clones of one bundle.
    pub(crate) fn escape_id(&self) -> usize {
        Arc::as_ptr(&self.escape) as *const () as usize
    }
}

impl Default for Helpers {
    fn default() -> Self {
        Self::html()
    }
}

impl fmt::Debug for Helpers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Helpers").finish_non_exhaustive()
    }
}

fn wrap_safe(value: String) -> SafeString {
    SafeString::new(value)
}

/// Replaces `& < > " '` with their HTML entities.
///
/// Works in a single pass, which gives the same result as replacing `&`
/// first and never double-escapes the entities it introduces.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
