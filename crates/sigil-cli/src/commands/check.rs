// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Check command for validating template files without rendering them.

use super::read_source;
use console::style;
use sigil::Engine;
use std::path::{Path, PathBuf};

/// Outcome of checking one file.
#[derive(Debug)]
pub struct CheckReport {
    /// The checked file.
    pub path: PathBuf,
    /// `Ok` with the number of declared keys, or the failure.
    pub result: anyhow::Result<usize>,
}

impl CheckReport {
    /// Whether the file parsed and compiled.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Parses and compiles one template file.
pub fn check_file(engine: &Engine, path: &Path) -> CheckReport {
    let result = read_source(path).and_then(|source| {
        let template = engine.create_template(&source)?;
        Ok(template.declared_keys().len())
    });
    CheckReport {
        path: path.to_path_buf(),
        result,
    }
}

/// Checks every file, in order.
pub fn check_files(engine: &Engine, paths: &[PathBuf]) -> Vec<CheckReport> {
    paths.iter().map(|path| check_file(engine, path)).collect()
}

/// Runs the check command. Fails if any file fails.
pub fn run(engine: &Engine, paths: &[PathBuf]) -> anyhow::Result<()> {
    let reports = check_files(engine, paths);

    for report in &reports {
        match &report.result {
            Ok(keys) => println!(
                "{} {} ({} keys)",
                style("ok").green(),
                report.path.display(),
                keys
            ),
            Err(e) => println!(
                "{} {}\n{:#}",
                style("error").red().bold(),
                report.path.display(),
                e
            ),
        }
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} templates failed", failed, reports.len());
    }
    Ok(())
}
