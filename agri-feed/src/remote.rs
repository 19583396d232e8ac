//! Remote signals API client
//!
//! `GET {base}/signals/latest?limit=N` for the working set and
//! `GET {base}/signals/{id}` for a single record, with its alpha under
//! `GET {base}/signals/{id}/alpha`. Transport failures are
//! retried with linear back-off; HTTP error statuses are not.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use agri_core::{Alpha, Signal, SignalId};

use crate::{SignalSource, SourceError};

/// Remote API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// API root, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// How many latest signals to request
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after a transport failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url() -> String {
    "https://api.agrisignals.com/api".to_string()
}

fn default_limit() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    2
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            limit: default_limit(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Back-off step between retries
const RETRY_BACKOFF_MS: u64 = 250;

/// Signals served by the HTTP API
pub struct RemoteSource {
    client: Client,
    config: RemoteConfig,
}

impl RemoteSource {
    pub fn new(config: RemoteConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::ClientBuild(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    pub fn latest_url(&self) -> String {
        format!("{}/signals/latest?limit={}", self.base(), self.config.limit)
    }

    pub fn signal_url(&self, id: &SignalId) -> String {
        format!("{}/signals/{}", self.base(), id)
    }

    pub fn alpha_url(&self, id: &SignalId) -> String {
        format!("{}/alpha", self.signal_url(id))
    }

    /// GET a single JSON document; `Ok(None)` on 404
    async fn get_optional<T>(&self, url: &str) -> Result<Option<T>, SourceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.get_with_retry(url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn get_with_retry(&self, url: &str) -> Result<Response, SourceError> {
        let attempts = self.config.max_retries + 1;

        for attempt in 1..=attempts {
            debug!("GET {} (attempt {}/{})", url, attempt, attempts);

            match self.client.get(url).send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < attempts => {
                    warn!("Request to {} failed: {} - retrying", url, e);
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64))
                        .await;
                }
                Err(e) => {
                    warn!("Request to {} failed: {}", url, e);
                }
            }
        }

        Err(SourceError::MaxRetries(self.config.max_retries))
    }
}

#[async_trait]
impl SignalSource for RemoteSource {
    fn name(&self) -> &str {
        "remote"
    }

    async fn fetch_all(&self) -> Result<Vec<Signal>, SourceError> {
        let response = self.get_with_retry(&self.latest_url()).await?;

        if !response.status().is_success() {
            warn!("Signals API returned status: {}", response.status());
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_by_id(&self, id: &SignalId) -> Result<Option<Signal>, SourceError> {
        self.get_optional(&self.signal_url(id)).await
    }

    async fn fetch_alpha(&self, id: &SignalId) -> Result<Option<Alpha>, SourceError> {
        self.get_optional(&self.alpha_url(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RemoteConfig::default();
        assert!(config.base_url.starts_with("https://"));
        assert_eq!(config.limit, 10);
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_urls() {
        let source = RemoteSource::new(RemoteConfig {
            base_url: "http://localhost:8000/api/".to_string(),
            limit: 25,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            source.latest_url(),
            "http://localhost:8000/api/signals/latest?limit=25"
        );
        assert_eq!(
            source.signal_url(&SignalId::from("live-2")),
            "http://localhost:8000/api/signals/live-2"
        );
        assert_eq!(
            source.signal_url(&SignalId::Num(4)),
            "http://localhost:8000/api/signals/4"
        );
        assert_eq!(
            source.alpha_url(&SignalId::Num(4)),
            "http://localhost:8000/api/signals/4/alpha"
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_exhausts_retries() {
        // nothing listens on port 9 locally
        let source = RemoteSource::new(RemoteConfig {
            base_url: "http://127.0.0.1:9/api".to_string(),
            timeout_secs: 2,
            max_retries: 1,
            ..Default::default()
        })
        .unwrap();

        let err = source.fetch_all().await.unwrap_err();
        assert!(matches!(err, SourceError::MaxRetries(1)));

        let err = source.fetch_alpha(&SignalId::Num(1)).await.unwrap_err();
        assert!(matches!(err, SourceError::MaxRetries(1)));
    }
}
