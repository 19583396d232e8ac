//! Fixture sources
//!
//! A fixture is a JSON array of signal records, either read from disk on
//! every fetch or held in memory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use agri_core::Signal;

use crate::{SignalSource, SourceError};

/// Parse a JSON array of signals
pub fn parse_signals(json: &str) -> Result<Vec<Signal>, SourceError> {
    Ok(serde_json::from_str(json)?)
}

/// Signals read from a JSON file
#[derive(Debug, Clone)]
pub struct FixtureSource {
    path: PathBuf,
}

impl FixtureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SignalSource for FixtureSource {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn fetch_all(&self) -> Result<Vec<Signal>, SourceError> {
        debug!("Reading fixture: {}", self.path.display());
        let json = tokio::fs::read_to_string(&self.path).await?;
        let signals = parse_signals(&json)?;
        debug!("Fixture {} holds {} signals", self.path.display(), signals.len());
        Ok(signals)
    }
}

/// Signals held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    signals: Vec<Signal>,
}

impl StaticSource {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self { signals }
    }
}

#[async_trait]
impl SignalSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_all(&self) -> Result<Vec<Signal>, SourceError> {
        Ok(self.signals.clone())
    }
}
