// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Engine configuration.
//!
//! # Example Configuration
//!
//! ```toml
//! max_depth = 50
//! key_validation = "inherited"   # or "local"
//! escape = "html"                # or "raw"
//! cache_capacity = 128
//! ```

use crate::error::{Result, SigilError};
use crate::helpers::Helpers;
use serde::{Deserialize, Serialize};

/// Default ceiling on simultaneously open blocks.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// How render-time key validation is scoped inside nested blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyValidation {
    /// A branch accepts every key that is valid in any enclosing scope.
    #[default]
    Inherited,
    /// A branch accepts only the keys it declares itself, plus the keys its
    /// enclosing blocks branch or iterate on.
    Local,
}

/// Escaping applied to substituted values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapePolicy {
    /// Escape `& < > " '` as HTML entities.
    #[default]
    Html,
    /// Emit values unchanged.
    Raw,
}

impl EscapePolicy {
    /// Builds the helper bundle for this policy.
    pub fn helpers(self) -> Helpers {
        match self {
            EscapePolicy::Html => Helpers::html(),
            EscapePolicy::Raw => Helpers::raw(),
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of simultaneously open blocks (default: 50).
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Key validation scope for nested blocks (default: inherited).
    #[serde(default)]
    pub key_validation: KeyValidation,
    /// Value escaping (default: html).
    #[serde(default)]
    pub escape: EscapePolicy,
    /// Capacity of the compiled-template cache; no cache when unset.
    #[serde(default)]
    pub cache_capacity: Option<usize>,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            key_validation: KeyValidation::default(),
            escape: EscapePolicy::default(),
            cache_capacity: None,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SigilError::Config`] if the TOML is malformed or the values
    /// are out of range.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| SigilError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(SigilError::Config(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.cache_capacity == Some(0) {
            return Err(SigilError::Config(
                "cache_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_depth, 50);
    }

    #[test]
    fn test_full_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
max_depth = 8
key_validation = "local"
escape = "raw"
cache_capacity = 16
"#,
        )
        .unwrap();

        assert_eq!(config.max_depth, 8);
        assert_eq!(config.key_validation, KeyValidation::Local);
        assert_eq!(config.escape, EscapePolicy::Raw);
        assert_eq!(config.cache_capacity, Some(16));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_toml_str("max_depth = 0"),
            Err(SigilError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("cache_capacity = 0"),
            Err(SigilError::Config(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str(r#"escape = "xml""#),
            Err(SigilError::Config(_))
        ));
    }
}
