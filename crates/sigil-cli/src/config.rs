// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI configuration.
//!
//! Configuration is loaded from `sigil.toml` in the current directory, or
//! from the file given with `--config`.
//!
//! # Example Configuration
//!
//! ```toml
//! [engine]
//! max_depth = 50
//! key_validation = "inherited"
//! escape = "html"
//! ```

use anyhow::Context;
use serde::Deserialize;
use sigil::{Engine, EngineConfig};
use std::fs;
use std::path::Path;

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "sigil.toml";

/// Main configuration structure loaded from `sigil.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Config {
    /// Loads the configuration.
    ///
    /// With an explicit path the file must exist. Without one,
    /// `sigil.toml` is used if present and defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load_or_default(Path::new(DEFAULT_CONFIG_FILE)),
        }
    }

    /// Loads `path`, or returns the defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Loads and validates a configuration file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Parses and validates TOML configuration text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Builds an engine from the `[engine]` table.
    pub fn engine(&self) -> anyhow::Result<Engine> {
        Ok(Engine::with_config(self.engine.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil::{EscapePolicy, KeyValidation};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_engine_table() {
        let config = Config::from_toml_str(
            r#"
[engine]
key_validation = "local"
escape = "raw"
"#,
        )
        .unwrap();
        assert_eq!(config.engine.key_validation, KeyValidation::Local);
        assert_eq!(config.engine.escape, EscapePolicy::Raw);
        assert_eq!(config.engine.max_depth, 50);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_toml_str("[engine]\nmax_depth = 0").is_err());
        assert!(Config::from_toml_str("[engine]\nescape = 1").is_err());
    }

    #[test]
    fn test_missing_default_file_is_not_an_error() {
        let config = Config::load_or_default(Path::new("definitely/not/here/sigil.toml")).unwrap();
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(Config::load(Some(Path::new("definitely/not/here.toml"))).is_err());
    }
}
