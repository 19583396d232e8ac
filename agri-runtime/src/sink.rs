//! Notification sinks
//!
//! Downstream consumers of a single signal (alert channels, share/export
//! actions). A sink accepts one signal and reports success or failure;
//! transports live outside the engine.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use agri_core::{Severity, Signal};

/// Errors from delivering a signal
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

/// A downstream consumer of single signals
#[async_trait]
pub trait SignalSink: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, signal: &Signal) -> Result<(), SinkError>;
}

/// Thread-safe reference to a sink
pub type SharedSink = Arc<dyn SignalSink>;

/// One-line alert text for a signal
pub fn format_alert(signal: &Signal) -> String {
    let mut line = format!(
        "[{}] {} ({:.0})",
        Severity::of(signal.score).label(),
        signal.headline,
        signal.score
    );

    let location = signal.location();
    if !location.is_empty() {
        line.push_str(&format!(" - {}", location));
    }
    if let Some(strength) = &signal.signal_strength {
        line.push_str(&format!(" | {}", strength));
    }
    line
}

/// Sink that writes alerts to the log
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl SignalSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, signal: &Signal) -> Result<(), SinkError> {
        if signal.headline.trim().is_empty() {
            return Err(SinkError::Rejected(format!(
                "signal {} has no headline",
                signal.id
            )));
        }
        info!(signal_id = %signal.id, "{}", format_alert(signal));
        Ok(())
    }
}

/// Deliver one signal to every sink concurrently
pub async fn broadcast(
    sinks: &[SharedSink],
    signal: &Signal,
) -> Vec<(String, Result<(), SinkError>)> {
    let deliveries = sinks.iter().map(|sink| async move {
        let result = sink.deliver(signal).await;
        if let Err(e) = &result {
            warn!("Sink {} failed for signal {}: {}", sink.name(), signal.id, e);
        }
        (sink.name().to_string(), result)
    });

    join_all(deliveries).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    use agri_core::SignalId;

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<SignalId>>,
    }

    #[async_trait]
    impl SignalSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn deliver(&self, signal: &Signal) -> Result<(), SinkError> {
            self.seen.lock().push(signal.id.clone());
            Ok(())
        }
    }

    #[test]
    fn test_format_alert() {
        let signal = Signal::builder(1, "Brazil coffee harvest yields drop 20%")
            .city("São Paulo")
            .country("Brazil")
            .score(91.4)
            .signal_strength("Long coffee futures, Short SBUX.")
            .build();

        assert_eq!(
            format_alert(&signal),
            "[CRITICAL] Brazil coffee harvest yields drop 20% (91) - São Paulo, Brazil | Long coffee futures, Short SBUX."
        );
    }

    #[tokio::test]
    async fn test_broadcast_reports_each_sink() {
        let recorder = Arc::new(RecordingSink::default());
        let log: SharedSink = Arc::new(LogSink);
        let sinks = vec![log, recorder.clone() as SharedSink];

        let signal = Signal::builder("live-2", "Midwest drought threatens corn belt")
            .score(84.0)
            .build();
        let results = broadcast(&sinks, &signal).await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
        assert_eq!(*recorder.seen.lock(), vec![SignalId::from("live-2")]);
    }

    #[tokio::test]
    async fn test_log_sink_rejects_blank_headline() {
        let signal = Signal::builder(9, "  ").score(80.0).build();
        let err = LogSink.deliver(&signal).await.unwrap_err();
        assert!(matches!(err, SinkError::Rejected(_)));
    }
}
