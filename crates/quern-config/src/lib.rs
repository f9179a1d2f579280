//! Configuration for the quern expression compiler.
//!
//! Every field has a serde default, so an empty TOML document yields
//! `Config::default()`.

use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub diagnostics: DiagnosticsConfig,
    pub index: IndexConfig,
    pub eval: EvalConfig,
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&text)
    }
}

///
/// DiagnosticsConfig
///
/// Controls the optimization-note log kept by the compile context.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Collect optimization notes.
    pub enabled: bool,

    /// Mirror every note to `tracing` at debug level.
    pub log: bool,

    /// Record node replacements.
    pub rewrites: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log: false,
            rewrites: false,
        }
    }
}

///
/// IndexConfig
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Run index-accessibility analysis when a collaborator is supplied.
    pub enabled: bool,

    /// Reorder conjunction operands by ascending selectivity.
    pub reorder: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reorder: true,
        }
    }
}

///
/// EvalConfig
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Combine relevance scores in connectives. When off, every boolean is plain.
    pub scoring: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { scoring: true }
    }
}

///
/// TESTS
///
