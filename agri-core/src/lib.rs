//! AgriSignals Core - Signal model and feed primitives
//!
//! This crate provides the pure building blocks of the feed engine:
//! - Commodity/regulatory signal records and snapshots
//! - Data-driven keyword categories for filtering
//! - The bounded random-walk step used to fake live market pressure
//! - Digest views (alerts, commodity groups, regional heatmap)

pub mod signals;
pub mod category;
pub mod walk;
pub mod digest;

pub use signals::*;
pub use category::*;
pub use walk::*;
pub use digest::*;

/// Lowest valid signal score
pub const MIN_SCORE: f64 = 0.0;

/// Highest valid signal score
pub const MAX_SCORE: f64 = 100.0;

/// Lowest score the simulator will ever produce
pub const SCORE_FLOOR: f64 = 70.0;

/// Highest score the simulator will ever produce
pub const SCORE_CEILING: f64 = 95.0;

/// Largest absolute change of a score in one tick
pub const MAX_STEP: f64 = 2.0;

/// Tick interval used by the category pages (milliseconds)
pub const CATEGORY_TICK_MS: u64 = 5_000;

/// Refresh interval used by the aggregate dashboard (milliseconds)
pub const DASHBOARD_TICK_MS: u64 = 30_000;

/// Scores strictly above this are treated as risk alerts
pub const ALERT_THRESHOLD: f64 = 85.0;
