// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Pre-escaped string marker.

use serde::{Serialize, Serializer};
use std::fmt;

/// A string that is already safe to emit and must not be escaped again.
///
/// Every render call returns one of these. When a `SafeString` is passed back
/// in as data (wrapped in [`Value::Safe`](crate::Value::Safe)) it is emitted
/// verbatim. Only this type suppresses escaping: a map that happens to look
/// like a `SafeString` is escaped like any other value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SafeString(String);

impl SafeString {
    /// Marks `value` as pre-escaped.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the raw text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Length of the raw text in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the raw text is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SafeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SafeString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SafeString> for String {
    fn from(value: SafeString) -> Self {
        value.0
    }
}

impl Serialize for SafeString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
