// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Compiled templates.

use crate::compiler::RenderFunction;
use crate::error::RenderError;
use crate::helpers::Helpers;
use crate::safe_string::SafeString;
use crate::value::Data;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A template ready to render, together with its static metadata.
///
/// Cloning is cheap: clones share the compiled closures. A template can be
/// rendered from many threads at once and passed as a [`Value`](crate::Value)
/// to compose it into another template.
#[derive(Clone)]
pub struct CompiledTemplate {
    inner: Arc<TemplateInner>,
}

struct TemplateInner {
    render: RenderFunction,
    requires_data: bool,
    declared_keys: BTreeSet<String>,
    source: String,
    helpers: Helpers,
}

impl CompiledTemplate {
    pub(crate) fn new(
        render: RenderFunction,
        requires_data: bool,
        declared_keys: BTreeSet<String>,
        source: impl Into<String>,
        helpers: Helpers,
    ) -> Self {
        Self {
            inner: Arc::new(TemplateInner {
                render,
                requires_data,
                declared_keys,
                source: source.into(),
                helpers,
            }),
        }
    }

    /// Renders with the given data, using the helpers of the engine that
    /// created this template.
    pub fn render(&self, data: &Data) -> Result<SafeString, RenderError> {
        (self.inner.render)(data, &self.inner.helpers)
    }

    /// Renders with an empty mapping.
    pub fn render_empty(&self) -> Result<SafeString, RenderError> {
        self.render(&Data::new())
    }

    /// Whether rendering with an empty mapping needs data to succeed.
    ///
    /// An uninvoked template that requires data cannot be embedded as a
    /// value; see [`RenderError::NestedTemplateNeedsData`].
    pub fn requires_data(&self) -> bool {
        self.inner.requires_data
    }

    /// Every key this template accepts at the top level.
    pub fn declared_keys(&self) -> &BTreeSet<String> {
        &self.inner.declared_keys
    }

    /// The source text this template was compiled from.
    pub fn source(&self) -> &str {
        &self.inner.source
    }

    /// The underlying render function.
    pub fn render_function(&self) -> RenderFunction {
        Arc::clone(&self.inner.render)
    }

    /// True if both handles share the same compilation.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("source", &self.inner.source)
            .field("requires_data", &self.inner.requires_data)
            .field("declared_keys", &self.inner.declared_keys)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{collect_keys, requires_data};
    use crate::compiler::Compiler;
    use crate::parser::Parser;

    fn template(source: &str, helpers: Helpers) -> CompiledTemplate {
        let nodes = Parser::new().parse(source).unwrap();
        let render = Compiler::default().compile(&nodes).unwrap();
        CompiledTemplate::new(
            render,
            requires_data(&nodes),
            collect_keys(&nodes),
            source,
            helpers,
        )
    }

    #[test]
    fn test_metadata() {
        let t = template("@{greeting=Hi}, @{name}", Helpers::html());
        assert!(t.requires_data());
        assert_eq!(
            t.declared_keys().iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["greeting", "name"]
        );
        assert_eq!(t.source(), "@{greeting=Hi}, @{name}");
    }

    #[test]
    fn test_uses_captured_helpers() {
        let data = Data::new().with("v", "<x>");
        assert_eq!(
            template("@{v}", Helpers::html()).render(&data).unwrap().as_str(),
            "&lt;x&gt;"
        );
        assert_eq!(
            template("@{v}", Helpers::raw()).render(&data).unwrap().as_str(),
            "<x>"
        );
    }

    #[test]
    fn test_clones_share_compilation() {
        let t = template("static", Helpers::html());
        let clone = t.clone();
        let other = template("static", Helpers::html());

        assert!(CompiledTemplate::ptr_eq(&t, &clone));
        assert!(!CompiledTemplate::ptr_eq(&t, &other));
        assert_eq!(clone.render_empty().unwrap().as_str(), "static");
    }

    #[test]
    fn test_render_function_matches_render() {
        let t = template("[@{x}]", Helpers::html());
        let data = Data::new().with("x", 7);
        let f = t.render_function();
        assert_eq!(f(&data, &Helpers::html()).unwrap(), t.render(&data).unwrap());
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledTemplate>();
    }
}
