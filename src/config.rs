//! Layered configuration.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`TASKDECK_*`, `__` separates sections)
//! 2. Project-level `.taskdeck/config.toml`
//! 3. User-level `<config dir>/taskdeck/config.toml`
//! 4. Built-in defaults
//!
//! `TASKDECK_STORAGE__DIR=/tmp/deck` maps to `storage.dir`.

use crate::engine::pipeline::{BucketOrder, SortDirection};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_DIR: &str = ".taskdeck";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding the database file.
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_DIR),
        }
    }
}

/// Defaults for `list` when flags are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub bucket_order: BucketOrder,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeckConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

impl DeckConfig {
    /// Loads configuration from all sources.
    ///
    /// # Errors
    /// Returns `ConfigError` if a source is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Builds the provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(DEFAULT_DIR).join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("TASKDECK_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("taskdeck").join("config.toml"))
    }
}
