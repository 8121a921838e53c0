// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Render command for producing output from a template file.

use super::read_source;
use anyhow::{bail, Context};
use sigil::{Data, Engine, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// A `name=path` partial given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partial {
    /// Data key the partial is passed under.
    pub name: String,
    /// Template file.
    pub path: PathBuf,
}

impl Partial {
    /// Parses `name=path`.
    pub fn parse(arg: &str) -> anyhow::Result<Self> {
        match arg.split_once('=') {
            Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => Ok(Self {
                name: name.trim().to_string(),
                path: PathBuf::from(path.trim()),
            }),
            _ => bail!("invalid partial '{arg}', expected name=path"),
        }
    }
}

/// Loads a JSON object as render data.
pub fn load_data(path: &Path) -> anyhow::Result<Data> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read data file {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    Ok(Data::from_json(json)?)
}

/// Renders `template` with `data`, passing each partial as an uninvoked
/// nested template.
///
/// A partial that itself needs data fails the render: partials are
/// rendered with empty data.
pub fn render_file(
    engine: &Engine,
    template: &Path,
    mut data: Data,
    partials: &[Partial],
) -> anyhow::Result<String> {
    for partial in partials {
        let source = read_source(&partial.path)?;
        let compiled = engine
            .create_template(&source)
            .with_context(|| format!("failed to compile partial {}", partial.path.display()))?;
        if data
            .insert(partial.name.clone(), Value::Template(compiled))
            .is_some()
        {
            tracing::warn!(name = %partial.name, "partial replaces a data value");
        }
    }

    let source = read_source(template)?;
    let compiled = engine
        .create_template(&source)
        .with_context(|| format!("failed to compile {}", template.display()))?;
    let output = compiled
        .render(&data)
        .with_context(|| format!("failed to render {}", template.display()))?;
    Ok(output.into_string())
}

/// Runs the render command, writing to `output` or stdout.
pub fn run(
    engine: &Engine,
    template: &Path,
    data: Option<&Path>,
    partials: &[String],
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let data = match data {
        Some(path) => load_data(path)?,
        None => Data::new(),
    };
    let partials = partials
        .iter()
        .map(|arg| Partial::parse(arg))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let rendered = render_file(engine, template, data, &partials)?;

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("cannot write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = rendered.len(), "wrote output");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_parse() {
        assert_eq!(
            Partial::parse("header = parts/header.tpl").unwrap(),
            Partial {
                name: "header".into(),
                path: PathBuf::from("parts/header.tpl"),
            }
        );
        assert!(Partial::parse("header").is_err());
        assert!(Partial::parse("=file").is_err());
        assert!(Partial::parse("name=").is_err());
    }
}
