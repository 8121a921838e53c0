// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # Sigil
//!
//! Directive-based text templates compiled into reusable render functions.
//!
//! A template is literal text with four kinds of directives:
//!
//! | Directive   | Form                                     |
//! |-------------|------------------------------------------|
//! | Placeholder | `@{key}` or `@{key=default}`             |
//! | Conditional | `@if{key}` ... `@else` ... `@endif`      |
//! | Iteration   | `@for{item in items}` ... `@endfor`      |
//!
//! Directive bodies cannot contain `{` or `}`.
//!
//! Templates are parsed and compiled once. Rendering validates the data
//! against the keys the template can consume, escapes every substituted
//! value that is not a [`SafeString`], and fails fast on the first error.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sigil::{Data, Engine};
//!
//! let engine = Engine::new();
//! let header = engine.create_template("<header>@{content}</header>")?;
//! let page = engine.create_template("@{header} <main>@{body}</main>")?;
//!
//! let html = page.render(
//!     &Data::new()
//!         .with("header", header.render(&Data::new().with("content", "Welcome"))?)
//!         .with("body", "Main content"),
//! )?;
//! assert_eq!(html.as_str(), "<header>Welcome</header> <main>Main content</main>");
//! ```

/// Node tree types.
pub mod ast;
/// Template parser.
pub mod parser;
/// Static analysis of node trees.
pub mod analysis;
/// Node tree to render function lowering.
pub mod compiler;
/// Render-time evaluation.
pub mod runtime;
/// Compiled templates.
pub mod template;
/// Render-time data values.
pub mod value;
/// Pre-escaped strings.
pub mod safe_string;
/// Escaping and SafeString construction.
pub mod helpers;
/// Main template engine.
pub mod engine;
/// Compiled template caching.
pub mod cache;
/// Engine configuration.
pub mod config;
/// Error types and reporting.
pub mod error;
/// Stateful components.
pub mod component;

pub use ast::{nodes_from_json, nodes_to_json, BlockKind, Node};
pub use cache::{cache_key, MemoryCache, TemplateCache};
pub use compiler::{Compiler, RenderFunction};
pub use config::{EngineConfig, EscapePolicy, KeyValidation, DEFAULT_MAX_DEPTH};
pub use engine::Engine;
pub use error::{
    CompileError, ParseError, ParseErrorKind, RenderError, Result, SigilError, SourceContext,
};
pub use helpers::{escape_html, Helpers};
pub use parser::Parser;
pub use safe_string::SafeString;
pub use template::CompiledTemplate;
pub use value::{Data, Value};
