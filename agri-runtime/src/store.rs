//! Signal Store
//!
//! Owns the working set loaded from a backing source and answers category
//! and id queries. Query functions are pure: they borrow the input, keep
//! the relative order of matches and never mutate anything.

use std::collections::HashSet;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use agri_core::{Alpha, CategoryTable, Signal, SignalId, Snapshot, MAX_SCORE, MIN_SCORE};
use agri_feed::{create_source, SharedSource, SourceConfig, SourceError};

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Signal source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    #[error("Signal source returned duplicate id {0}")]
    DuplicateId(SignalId),

    #[error("Signal {id} has score {score} outside [0, 100]")]
    ScoreOutOfRange { id: SignalId, score: f64 },

    #[error("Signal {0} not found")]
    NotFound(SignalId),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

impl StoreError {
    /// Source failures the consumer should answer with a stale/empty state
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            StoreError::SourceUnavailable(_)
                | StoreError::DuplicateId(_)
                | StoreError::ScoreOutOfRange { .. }
        )
    }
}

/// Subset of `signals` where `predicate` holds, in input order
pub fn filter_by_category<P>(signals: &[Signal], predicate: P) -> Vec<Signal>
where
    P: Fn(&Signal) -> bool,
{
    signals.iter().filter(|s| predicate(s)).cloned().collect()
}

/// Look up a signal by id
pub fn find_by_id<'a>(signals: &'a [Signal], id: &SignalId) -> Result<&'a Signal, StoreError> {
    signals
        .iter()
        .find(|s| &s.id == id)
        .ok_or_else(|| StoreError::NotFound(id.clone()))
}

fn check_unique_ids(signals: &[Signal]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(signals.len());
    for signal in signals {
        if !seen.insert(&signal.id) {
            return Err(StoreError::DuplicateId(signal.id.clone()));
        }
    }
    Ok(())
}

fn check_score_domain(signals: &[Signal]) -> Result<(), StoreError> {
    match signals
        .iter()
        .find(|s| !(MIN_SCORE..=MAX_SCORE).contains(&s.score))
    {
        Some(signal) => Err(StoreError::ScoreOutOfRange {
            id: signal.id.clone(),
            score: signal.score,
        }),
        None => Ok(()),
    }
}

/// The signal store
pub struct SignalStore {
    source: SharedSource,
    categories: CategoryTable,
    current: RwLock<Option<Snapshot>>,
}

impl SignalStore {
    /// Create a store reading from the configured source
    pub fn new(config: &SourceConfig, categories: CategoryTable) -> Result<Self, StoreError> {
        let source = create_source(config)?;
        Ok(Self::with_source(source, categories))
    }

    /// Create a store over an already constructed source
    pub fn with_source(source: SharedSource, categories: CategoryTable) -> Self {
        Self {
            source,
            categories,
            current: RwLock::new(None),
        }
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Load the complete working set and keep it as the current snapshot
    pub async fn load_all(&self) -> Result<Snapshot, StoreError> {
        let signals = match self.source.fetch_all().await {
            Ok(signals) => signals,
            Err(e) => {
                warn!("Source {} unavailable: {}", self.source.name(), e);
                return Err(e.into());
            }
        };

        check_unique_ids(&signals)?;
        check_score_domain(&signals)?;

        let snapshot: Snapshot = signals.into();
        info!(
            "Loaded {} signals from {} source",
            snapshot.len(),
            self.source.name()
        );
        *self.current.write() = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Last successfully loaded snapshot
    pub fn current(&self) -> Option<Snapshot> {
        self.current.read().clone()
    }

    /// Filter by a category from the store's table
    pub fn filter_category(
        &self,
        signals: &[Signal],
        category: &str,
    ) -> Result<Vec<Signal>, StoreError> {
        let category = self
            .categories
            .get(category)
            .ok_or_else(|| StoreError::UnknownCategory(category.to_string()))?;

        let matched = filter_by_category(signals, |s| category.matches(s));
        debug!(
            "Category {} matched {}/{} signals",
            category.name,
            matched.len(),
            signals.len()
        );
        Ok(matched)
    }

    /// Fetch one signal, from the current snapshot when loaded
    pub async fn fetch_by_id(&self, id: &SignalId) -> Result<Signal, StoreError> {
        if let Some(snapshot) = self.current() {
            return find_by_id(&snapshot, id).cloned();
        }

        self.source
            .fetch_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// The trade thesis of one signal, as served by the source
    pub async fn alpha_for(&self, id: &SignalId) -> Result<Alpha, StoreError> {
        self.source
            .fetch_alpha(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use agri_feed::{SignalSource, StaticSource};

    fn fixture() -> Vec<Signal> {
        vec![
            Signal::builder(1, "McDonald's slashes combo prices 15% amid beef price volatility")
                .commodity("cattle")
                .state("IL")
                .score(92.0)
                .build(),
            Signal::builder(2, "Brazil coffee harvest yields drop 20%")
                .commodity("coffee")
                .country("Brazil")
                .score(88.0)
                .tradecraft("Track Santos port arrivals")
                .build(),
            Signal::builder(3, "DEA pushes cannabis rescheduling")
                .commodity("cannabis")
                .score(81.0)
                .build(),
            Signal::builder(4, "Colorado vs Nebraska water lawsuit heads to court")
                .commodity("water")
                .state("CO")
                .score(90.0)
                .build(),
            Signal::builder(5, "H-2A seasonal worker shortage hits Central Valley")
                .commodity("labor")
                .state("CA")
                .score(84.0)
                .build(),
        ]
    }

    fn store_with(signals: Vec<Signal>) -> SignalStore {
        SignalStore::with_source(Arc::new(StaticSource::new(signals)), CategoryTable::builtin())
    }

    #[test]
    fn test_filter_is_pure_and_ordered() {
        let signals = fixture();
        let before = signals.clone();

        let matched = filter_by_category(&signals, |s| s.score >= 88.0);
        let ids: Vec<_> = matched.iter().map(|s| s.id.to_string()).collect();

        assert_eq!(ids, vec!["1", "2", "4"]);
        assert_eq!(signals, before);
    }

    #[test]
    fn test_filter_category_by_name() {
        let store = store_with(Vec::new());
        let signals = fixture();

        let coffee = store.filter_category(&signals, "coffee").unwrap();
        assert_eq!(coffee.len(), 1);
        assert_eq!(coffee[0].id, SignalId::Num(2));

        let regulatory = store.filter_category(&signals, "Regulatory").unwrap();
        assert_eq!(regulatory.len(), 1);
        assert_eq!(regulatory[0].id, SignalId::Num(4));

        let visas = store.filter_category(&signals, "visas").unwrap();
        assert_eq!(visas[0].id, SignalId::Num(5));

        assert!(matches!(
            store.filter_category(&signals, "lithium"),
            Err(StoreError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_find_by_id() {
        let signals = fixture();
        assert_eq!(find_by_id(&signals, &SignalId::Num(3)).unwrap().score, 81.0);
        assert!(matches!(
            find_by_id(&signals, &SignalId::from("3")),
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_load_all_caches_snapshot() {
        let store = store_with(fixture());
        assert!(store.current().is_none());

        let snapshot = store.load_all().await.unwrap();
        assert_eq!(snapshot.len(), 5);
        assert_eq!(store.current().unwrap().len(), 5);
        assert_eq!(store.source_name(), "static");
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() {
        let mut signals = fixture();
        signals.push(Signal::builder(2, "Second record reusing id 2").build());

        let store = store_with(signals);
        let err = store.load_all().await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(SignalId::Num(2))));
        assert!(err.is_source_failure());
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_scores_rejected() {
        let json = r#"[
            {"id": 1, "headline": "Overheated record", "score": 250},
            {"id": 2, "headline": "Negative record", "score": -40}
        ]"#;
        let store = store_with(agri_feed::parse_signals(json).unwrap());

        let err = store.load_all().await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::ScoreOutOfRange { id: SignalId::Num(1), score } if score == 250.0
        ));
        assert!(err.is_source_failure());
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_alpha_comes_from_source() {
        struct ThesisSource(StaticSource);

        #[async_trait::async_trait]
        impl SignalSource for ThesisSource {
            fn name(&self) -> &str {
                "thesis"
            }

            async fn fetch_all(&self) -> Result<Vec<Signal>, SourceError> {
                self.0.fetch_all().await
            }

            async fn fetch_alpha(&self, id: &SignalId) -> Result<Option<Alpha>, SourceError> {
                Ok(Some(Alpha {
                    headline: format!("served alpha for {}", id),
                    so_what: Some("Basis widens".to_string()),
                    who_bleeds: None,
                    who_benefits: None,
                    tradecraft: None,
                }))
            }
        }

        let store = SignalStore::with_source(
            Arc::new(ThesisSource(StaticSource::new(fixture()))),
            CategoryTable::builtin(),
        );
        store.load_all().await.unwrap();

        let alpha = store.alpha_for(&SignalId::Num(2)).await.unwrap();
        assert_eq!(alpha.headline, "served alpha for 2");
        assert_eq!(alpha.so_what.as_deref(), Some("Basis widens"));
    }

    #[tokio::test]
    async fn test_unavailable_source_is_recoverable() {
        let store = SignalStore::new(
            &SourceConfig::Fixture {
                path: "/nonexistent/agri/signals.json".into(),
            },
            CategoryTable::builtin(),
        )
        .unwrap();

        let err = store.load_all().await.unwrap_err();
        assert!(matches!(err, StoreError::SourceUnavailable(SourceError::Io(_))));
        assert!(err.is_source_failure());
    }

    #[tokio::test]
    async fn test_fetch_and_alpha() {
        let store = store_with(fixture());

        // before load: falls through to the source
        let signal = store.fetch_by_id(&SignalId::Num(2)).await.unwrap();
        assert_eq!(signal.commodity.as_deref(), Some("coffee"));

        store.load_all().await.unwrap();
        let alpha = store.alpha_for(&SignalId::Num(2)).await.unwrap();
        assert_eq!(alpha.tradecraft.as_deref(), Some("Track Santos port arrivals"));

        assert!(matches!(
            store.alpha_for(&SignalId::Num(42)).await,
            Err(StoreError::NotFound(_))
        ));

        let missing = store.fetch_by_id(&SignalId::Num(42)).await.unwrap_err();
        assert!(matches!(missing, StoreError::NotFound(SignalId::Num(42))));
        assert!(!missing.is_source_failure());
    }
}
