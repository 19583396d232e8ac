//! Live Score Simulator
//!
//! Fakes live market pressure on a fixed set of signals: every tick runs the
//! bounded random walk over each score and publishes a new snapshot.
//!
//! Lifecycle:
//! - `Idle`: no run yet
//! - `Running`: a timer task is producing ticks
//! - `Stopped`: the run was cancelled and its task released
//!
//! A tick only publishes while holding the run's gate and only if the run is
//! still live; `stop()` cancels under the same gate. Once `stop()` returns no
//! snapshot reaches the consumer, including one whose timer already fired.
//!
//! The stream holds only the newest tick: a slow reader skips to the latest
//! snapshot instead of queueing old ones. Dropping the stream ends the run.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use agri_core::{ScoreWalk, Snapshot};

/// Shortest accepted tick interval
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Simulator lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorState {
    Idle,
    Running,
    Stopped,
}

/// One published tick
#[derive(Debug, Clone)]
pub struct Tick {
    /// 1-based tick number within the run
    pub seq: u64,
    pub snapshot: Snapshot,
    pub at: DateTime<Utc>,
}

/// Receiving end of a run
pub struct SnapshotStream {
    run_id: Uuid,
    rx: watch::Receiver<Option<Tick>>,
    token: CancellationToken,
}

impl SnapshotStream {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Newest tick not yet seen; `None` once the run is stopped or replaced
    pub async fn next(&mut self) -> Option<Tick> {
        if self.token.is_cancelled() {
            return None;
        }

        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            changed = self.rx.changed() => match changed {
                Ok(()) => self.rx.borrow_and_update().clone(),
                Err(_) => None,
            },
        }
    }
}

struct Run {
    id: Uuid,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// The live score simulator
pub struct LiveScoreSimulator {
    state: SimulatorState,
    seed: Option<u64>,
    run: Option<Run>,
    /// Latest published snapshot; its lock is also the publish gate
    latest: Arc<Mutex<Option<Snapshot>>>,
}

impl LiveScoreSimulator {
    /// Simulator with an entropy-seeded walk
    pub fn new() -> Self {
        Self::with_seed(None)
    }

    /// Simulator whose runs replay the same walk
    pub fn seeded(seed: u64) -> Self {
        Self::with_seed(Some(seed))
    }

    pub fn with_seed(seed: Option<u64>) -> Self {
        Self {
            state: SimulatorState::Idle,
            seed,
            run: None,
            latest: Arc::new(Mutex::new(None)),
        }
    }

    /// Current state; a run whose task ended on its own reads as `Stopped`
    pub fn state(&self) -> SimulatorState {
        match &self.run {
            Some(run) if run.token.is_cancelled() || run.handle.is_finished() => {
                SimulatorState::Stopped
            }
            _ => self.state,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SimulatorState::Running
    }

    /// Latest snapshot: the input at start, then each published tick
    pub fn latest(&self) -> Option<Snapshot> {
        self.latest.lock().clone()
    }

    /// Start ticking over `signals` every `interval`.
    ///
    /// The first tick fires one full interval after the call. Starting while
    /// running stops the previous run first, so two tick streams never
    /// coexist. Must be called from within a tokio runtime.
    pub fn start(&mut self, signals: impl Into<Snapshot>, interval: Duration) -> SnapshotStream {
        if self.run.is_some() {
            info!("Simulator restarted; stopping previous run");
            self.stop();
        }

        let interval = if interval < MIN_INTERVAL {
            warn!("Tick interval {:?} too short, using {:?}", interval, MIN_INTERVAL);
            MIN_INTERVAL
        } else {
            interval
        };

        let signals: Snapshot = signals.into();
        let run_id = Uuid::new_v4();
        let token = CancellationToken::new();
        let (tx, rx) = watch::channel(None);

        *self.latest.lock() = Some(signals.clone());

        info!(
            "Simulator run {} started: {} signals every {}ms",
            run_id,
            signals.len(),
            interval.as_millis()
        );

        let handle = tokio::spawn(run_ticks(
            run_id,
            signals,
            interval,
            ScoreWalk::from_seed(self.seed),
            token.clone(),
            self.latest.clone(),
            tx,
        ));

        self.run = Some(Run {
            id: run_id,
            token: token.clone(),
            handle,
        });
        self.state = SimulatorState::Running;

        SnapshotStream { run_id, rx, token }
    }

    /// Stop the current run. No-op unless running.
    pub fn stop(&mut self) {
        let Some(run) = self.run.take() else {
            debug!("Simulator stop ignored in state {:?}", self.state);
            return;
        };

        {
            let _gate = self.latest.lock();
            run.token.cancel();
        }
        run.handle.abort();

        self.state = SimulatorState::Stopped;
        info!("Simulator run {} stopped", run.id);
    }
}

impl Default for LiveScoreSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LiveScoreSimulator {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_ticks(
    run_id: Uuid,
    mut current: Snapshot,
    period: Duration,
    mut walk: ScoreWalk,
    token: CancellationToken,
    latest: Arc<Mutex<Option<Snapshot>>>,
    tx: watch::Sender<Option<Tick>>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seq = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let next = walk.tick(&current);
        seq += 1;

        {
            let mut gate = latest.lock();
            if token.is_cancelled() {
                break;
            }
            if tx.is_closed() {
                info!("Run {} has no subscriber left; stopping", run_id);
                token.cancel();
                break;
            }
            *gate = Some(next.clone());

            tx.send_replace(Some(Tick {
                seq,
                snapshot: next.clone(),
                at: Utc::now(),
            }));
        }

        debug!("Run {} tick {} over {} signals", run_id, seq, next.len());
        current = next;
    }

    debug!("Run {} task exiting after {} ticks", run_id, seq);
}
