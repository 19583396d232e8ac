//! Bounded random walk over signal scores
//!
//! Each tick moves every score by an independent uniform delta in
//! [-MAX_STEP, +MAX_STEP) and clamps the result to [SCORE_FLOOR, SCORE_CEILING].
//! No drift, no memory of earlier deltas.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Signal, Snapshot, MAX_STEP, SCORE_CEILING, SCORE_FLOOR};

/// Map a uniform sample in [0, 1) onto a score delta
pub fn delta_from_unit(u: f64) -> f64 {
    (u - 0.5) * 2.0 * MAX_STEP
}

/// One step of the walk for a single score
pub fn step_score(old: f64, u: f64) -> f64 {
    (old + delta_from_unit(u)).clamp(SCORE_FLOOR, SCORE_CEILING)
}

/// Random source driving the walk
pub struct ScoreWalk {
    rng: StdRng,
}

impl ScoreWalk {
    /// Walk seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible walk
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }

    /// Next score for one signal
    pub fn step(&mut self, old: f64) -> f64 {
        let u: f64 = self.rng.gen();
        step_score(old, u)
    }

    /// Apply one tick to a whole snapshot, producing a new one
    pub fn tick(&mut self, signals: &[Signal]) -> Snapshot {
        signals
            .iter()
            .map(|signal| signal.with_score(self.step(signal.score)))
            .collect()
    }
}

impl Default for ScoreWalk {
    fn default() -> Self {
        Self::new()
    }
}
