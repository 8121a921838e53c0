// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `render`: Render a template file with JSON data
//! - `check`: Parse and compile template files
//! - `inspect`: Show what a template consumes

/// Template check command.
pub mod check;
/// Template inspection command.
pub mod inspect;
/// Template render command.
pub mod render;

use anyhow::Context;
use std::fs;
use std::path::Path;

/// Reads a template file.
pub(crate) fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read template {}", path.display()))
}
