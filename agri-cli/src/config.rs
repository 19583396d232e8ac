//! Engine configuration file
//!
//! ```toml
//! [source]
//! kind = "fixture"
//! path = "fixtures/signals.json"
//!
//! [simulator]
//! interval_ms = 5000
//! seed = 42
//!
//! [[categories]]
//! name = "water"
//! commodity_keywords = ["water"]
//! headline_keywords = ["aquifer", "well", "water rights"]
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use agri_core::{Category, CategoryError, CategoryTable};
use agri_feed::SourceConfig;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub simulator: SimulatorSettings,
    /// Added to the built-in table; same-named entries replace built-ins
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimulatorSettings {
    /// Tick interval; falls back to the page/dashboard default when unset
    #[serde(default)]
    pub interval_ms: Option<u64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl EngineConfig {
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("Invalid engine config")?;
        if config.simulator.interval_ms == Some(0) {
            bail!("simulator.interval_ms must be at least 1");
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&raw)
    }

    /// Built-in categories merged with the configured ones
    pub fn category_table(&self) -> Result<CategoryTable, CategoryError> {
        let mut table = CategoryTable::builtin();
        table.extend(self.categories.iter().cloned())?;
        Ok(table)
    }
}
