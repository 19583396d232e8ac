//! Signal source abstraction
//!
//! The store only depends on "produces a sequence of Signal records, or
//! fails". Which backing source is used is an explicit [`SourceConfig`]
//! value, never a global toggle.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use agri_core::{Alpha, Signal, SignalId};

use crate::{FixtureSource, LiveSignalSource, RemoteConfig, RemoteSource};

/// Errors from reading a backing source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Failed to read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Max retries ({0}) exceeded")]
    MaxRetries(u32),
}

/// Anything that can produce the working set of signals
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Fetch the complete working set
    async fn fetch_all(&self) -> Result<Vec<Signal>, SourceError>;

    /// Fetch a single record; `Ok(None)` if the source has no such id
    async fn fetch_by_id(&self, id: &SignalId) -> Result<Option<Signal>, SourceError> {
        let all = self.fetch_all().await?;
        Ok(all.into_iter().find(|s| &s.id == id))
    }

    /// Fetch the trade thesis of one record; built from the record itself
    /// unless the source serves it separately
    async fn fetch_alpha(&self, id: &SignalId) -> Result<Option<Alpha>, SourceError> {
        Ok(self.fetch_by_id(id).await?.as_ref().map(Alpha::from))
    }
}

/// Thread-safe reference to a signal source
pub type SharedSource = Arc<dyn SignalSource>;

/// Which backing source to read from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// JSON array of signals on disk
    Fixture { path: PathBuf },
    /// The signals HTTP API
    Remote(RemoteConfig),
    /// Generated live feed with mock prices
    Generated,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Fixture {
            path: PathBuf::from("fixtures/signals.json"),
        }
    }
}

/// Build the source described by a config
pub fn create_source(config: &SourceConfig) -> Result<SharedSource, SourceError> {
    let source: SharedSource = match config {
        SourceConfig::Fixture { path } => Arc::new(FixtureSource::new(path.clone())),
        SourceConfig::Remote(remote) => Arc::new(RemoteSource::new(remote.clone())?),
        SourceConfig::Generated => Arc::new(LiveSignalSource::new()),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_shapes() {
        let fixture: SourceConfig =
            serde_json::from_str(r#"{"kind": "fixture", "path": "data/s.json"}"#).unwrap();
        assert_eq!(
            fixture,
            SourceConfig::Fixture {
                path: PathBuf::from("data/s.json")
            }
        );

        let remote: SourceConfig =
            serde_json::from_str(r#"{"kind": "remote", "base_url": "http://localhost:8000/api"}"#)
                .unwrap();
        match remote {
            SourceConfig::Remote(cfg) => {
                assert_eq!(cfg.base_url, "http://localhost:8000/api");
                assert_eq!(cfg.limit, 10);
            }
            other => panic!("unexpected config: {:?}", other),
        }

        let generated: SourceConfig = serde_json::from_str(r#"{"kind": "generated"}"#).unwrap();
        assert_eq!(generated, SourceConfig::Generated);
    }

    #[test]
    fn test_create_each_source() {
        for config in [
            SourceConfig::default(),
            SourceConfig::Remote(RemoteConfig::default()),
            SourceConfig::Generated,
        ] {
            let source = create_source(&config).unwrap();
            assert!(!source.name().is_empty());
        }
    }
}
