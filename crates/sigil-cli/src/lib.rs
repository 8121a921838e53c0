// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! Sigil CLI library.
//!
//! This crate provides the command-line interface for the sigil template
//! engine. It is primarily used through the `sigil` binary:
//!
//! ```bash
//! sigil render page.tpl --data page.json --partial header=header.tpl
//! sigil check templates/*.tpl
//! sigil inspect page.tpl --ast
//! ```
//!
//! # Configuration
//!
//! Engine settings are read from `sigil.toml` in the current directory, or
//! from the file passed with `--config`.

/// CLI commands (render, check, inspect).
pub mod commands;
/// Configuration from `sigil.toml`.
pub mod config;
