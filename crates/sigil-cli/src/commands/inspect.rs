// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Inspect command for showing what a template consumes.

use super::read_source;
use sigil::analysis::nesting_depth;
use sigil::{nodes_to_json, Engine};
use std::fmt::Write;
use std::path::Path;

/// Describes a template source: its keys, whether it needs data, its
/// nesting depth and optionally its node tree.
pub fn describe(engine: &Engine, source: &str, ast: bool) -> anyhow::Result<String> {
    let nodes = engine.parse(source)?;
    let template = engine.compile_nodes(&nodes, source)?;

    let keys: Vec<&str> = template.declared_keys().iter().map(String::as_str).collect();
    let mut out = String::new();
    writeln!(out, "keys: {}", keys.join(", "))?;
    writeln!(out, "requires data: {}", template.requires_data())?;
    writeln!(out, "nesting depth: {}", nesting_depth(&nodes))?;
    if ast {
        writeln!(out, "{}", nodes_to_json(&nodes))?;
    }
    Ok(out)
}

/// Runs the inspect command.
pub fn run(engine: &Engine, template: &Path, ast: bool) -> anyhow::Result<()> {
    let source = read_source(template)?;
    print!("{}", describe(engine, &source, ast)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let out = describe(&Engine::new(), "@if{a}@{b=x}@endif", false).unwrap();
        assert_eq!(out, "keys: a, b\nrequires data: true\nnesting depth: 1\n");
    }

    #[test]
    fn test_describe_with_ast() {
        let out = describe(&Engine::new(), "hi", true).unwrap();
        assert!(out.contains("requires data: false"));
        assert!(out.contains("\"type\": \"literal\""));
    }
}
