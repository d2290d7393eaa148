//! Optional TOML configuration
//!
//! Lookup: `--config <FILE>`, then `$KOINLY2IRPF_CONFIG`, then
//! `<config_home>/koinly2irpf/config.toml`. Only an explicitly named file is
//! required to exist.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ConversionError;
use crate::models::ValueBasis;

pub const CONFIG_ENV_VAR: &str = "KOINLY2IRPF_CONFIG";
const CONFIG_DIR_NAME: &str = "koinly2irpf";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub output: OutputConfig,
    pub classification: ClassificationConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub delimiter: char,
    /// "market" or "cost"; `--value` overrides it
    pub value: ValueBasis,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            delimiter: ',',
            value: ValueBasis::Market,
        }
    }
}

impl OutputConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() && !self.delimiter.is_ascii_alphanumeric() {
            Ok(self.delimiter as u8)
        } else {
            Err(ConversionError::Config(format!(
                "invalid CSV delimiter '{}': must be a single ASCII punctuation or whitespace character",
                self.delimiter
            ))
            .into())
        }
    }
}

/// Entries appended after the built-in tables
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClassificationConfig {
    pub extra_exchanges: Vec<TableEntry>,
    pub extra_networks: Vec<TableEntry>,
    pub extra_wallets: Vec<TableEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TableEntry {
    pub fragment: String,
    pub name: String,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config TOML")?;
        config.output.delimiter_byte()?;
        for entry in config
            .classification
            .extra_exchanges
            .iter()
            .chain(&config.classification.extra_networks)
            .chain(&config.classification.extra_wallets)
        {
            if entry.fragment.trim().is_empty() || entry.name.trim().is_empty() {
                return Err(ConversionError::Config(
                    "table entries need a non-empty fragment and name".to_string(),
                )
                .into());
            }
        }
        Ok(config)
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Resolve and load the configuration. `explicit` comes from `--config`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading config from {}", path.display());
            return Self::load_file(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            if !env_path.is_empty() {
                info!("Loading config from ${} = {}", CONFIG_ENV_VAR, env_path);
                return Self::load_file(env_path);
            }
        }

        match default_config_path() {
            Some(path) if path.is_file() => {
                info!("Loading config from {}", path.display());
                Self::load_file(path)
            }
            _ => {
                debug!("No config file found, using built-in defaults");
                Ok(Config::default())
            }
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
}
