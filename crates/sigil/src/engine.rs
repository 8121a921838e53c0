// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Sigil template engine for compiling and rendering templates.
//!
//! This module provides the core [`Engine`] type that wires the parser,
//! the compiler and the render-time helpers together.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sigil::{Data, Engine};
//!
//! let engine = Engine::new();
//! let greeting = engine.create_template("Hello, @{name=Guest}!")?;
//!
//! assert_eq!(greeting.render_empty()?.as_str(), "Hello, Guest!");
//! assert_eq!(
//!     greeting.render(&Data::new().with("name", "Ada"))?.as_str(),
//!     "Hello, Ada!"
//! );
//! ```
//!
//! # Architecture
//!
//! - **Parser**: converts template source into a node tree
//! - **Compiler**: lowers the node tree into a render function
//! - **Helpers**: escaping and the shared SafeString constructor
//! - **Cache**: optionally stores compiled templates for reuse
//!
//! # Thread Safety
//!
//! The engine is `Send + Sync`. Templates it creates can be rendered from
//! any number of threads at once.

use crate::analysis::{collect_keys, requires_data};
use crate::ast::Node;
use crate::cache::{cache_key, MemoryCache, TemplateCache};
use crate::compiler::{Compiler, RenderFunction};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::helpers::Helpers;
use crate::parser::Parser;
use crate::safe_string::SafeString;
use crate::template::CompiledTemplate;
use crate::value::Data;

/// The main template engine.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    parser: Parser,
    compiler: Compiler,
    helpers: Helpers,
    custom_helpers: bool,
    cache: Option<Box<dyn TemplateCache>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with the default configuration and no cache.
    pub fn new() -> Self {
        Self::from_valid_config(EngineConfig::default(), None)
    }

    /// Creates an engine from a configuration.
    ///
    /// A memory cache is attached when `cache_capacity` is set.
    ///
    /// # Errors
    ///
    /// Returns [`SigilError::Config`](crate::SigilError::Config) if the
    /// configuration is invalid.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let cache = match config.cache_capacity {
            Some(capacity) => Some(Box::new(MemoryCache::new(capacity)?) as Box<dyn TemplateCache>),
            None => None,
        };
        Ok(Self::from_valid_config(config, cache))
    }

    /// Creates an engine with an in-memory LRU cache.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of compiled templates to keep
    pub fn with_memory_cache(capacity: usize) -> Result<Self> {
        Self::with_config(EngineConfig {
            cache_capacity: Some(capacity),
            ..EngineConfig::default()
        })
    }

    fn from_valid_config(config: EngineConfig, cache: Option<Box<dyn TemplateCache>>) -> Self {
        Self {
            parser: Parser::with_max_depth(config.max_depth),
            compiler: Compiler::new(&config),
            helpers: config.escape.helpers(),
            custom_helpers: false,
            cache,
            config,
        }
    }

    /// Replaces the cache.
    ///
    /// A cache may be shared between engines. Entries are keyed by each
    /// engine's settings, so an engine only sees its own compilations.
    pub fn with_cache(mut self, cache: Box<dyn TemplateCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replaces the helper bundle, e.g. to install a custom escape function.
    ///
    /// Only templates created afterwards use the new helpers. An attached
    /// cache is detached, since its entries carry the previous helpers;
    /// call [`with_cache`](Self::with_cache) afterwards to attach one again.
    pub fn with_helpers(mut self, helpers: Helpers) -> Self {
        if self.cache.take().is_some() {
            tracing::debug!("cache detached after helpers were replaced");
        }
        self.helpers = helpers;
        self.custom_helpers = true;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The helper bundle shared by every template this engine creates.
    pub fn helpers(&self) -> &Helpers {
        &self.helpers
    }

    /// The attached cache, if any.
    pub fn cache(&self) -> Option<&dyn TemplateCache> {
        self.cache.as_deref()
    }

    /// Parses a template source into a node tree.
    pub fn parse(&self, source: &str) -> Result<Vec<Node>> {
        Ok(self.parser.parse(source)?)
    }

    /// Parses and compiles a template source into a bare render function.
    ///
    /// The function must be called with a helper bundle; use
    /// [`create_template`](Self::create_template) to get one that carries
    /// the engine's helpers and metadata.
    pub fn compile(&self, source: &str) -> Result<RenderFunction> {
        let nodes = self.parse(source)?;
        Ok(self.compiler.compile(&nodes)?)
    }

    /// Compiles an already parsed or deserialized node tree.
    pub fn compile_nodes(&self, nodes: &[Node], source: impl Into<String>) -> Result<CompiledTemplate> {
        let render = self.compiler.compile(nodes)?;
        Ok(CompiledTemplate::new(
            render,
            requires_data(nodes),
            collect_keys(nodes),
            source,
            self.helpers.clone(),
        ))
    }

    /// Parses and compiles a template source, with metadata.
    ///
    /// Consults the cache first when one is attached.
    pub fn create_template(&self, source: &str) -> Result<CompiledTemplate> {
        let Some(cache) = &self.cache else {
            return self.build_template(source);
        };

        let key = cache_key(&self.settings_fingerprint(), source);
        if let Some(template) = cache.get(&key)? {
            tracing::debug!(key = %key, "template cache hit");
            return Ok(template);
        }

        tracing::debug!(key = %key, "template cache miss");
        let template = self.build_template(source)?;
        cache.set(&key, template.clone())?;
        Ok(template)
    }

    /// Everything besides the source that shapes a compiled template.
    fn settings_fingerprint(&self) -> String {
        let escape = if self.custom_helpers {
            format!("custom@{:x}", self.helpers.escape_id())
        } else {
            format!("{:?}", self.config.escape)
        };
        format!(
            "escape={escape};validation={:?};max_depth={}",
            self.compiler.key_validation(),
            self.parser.max_depth()
        )
    }

    fn build_template(&self, source: &str) -> Result<CompiledTemplate> {
        let nodes = self.parse(source)?;
        self.compile_nodes(&nodes, source)
    }

    /// Creates a template and renders it once.
    pub fn render(&self, source: &str, data: &Data) -> Result<SafeString> {
        let template = self.create_template(source)?;
        Ok(template.render(data)?)
    }

    /// Checks if a source has a cached compilation.
    pub fn cache_contains(&self, source: &str) -> bool {
        self.cache.as_ref().is_some_and(|cache| {
            cache.contains_key(&cache_key(&self.settings_fingerprint(), source))
        })
    }

    /// Drops every cached compilation.
    pub fn clear_cache(&self) -> Result<()> {
        match &self.cache {
            Some(cache) => cache.clear(),
            None => Ok(()),
        }
    }
}
