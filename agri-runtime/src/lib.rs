//! AgriSignals Runtime
//!
//! - **Store**: loads the working set from a configured source and answers
//!   category and id queries
//! - **Simulator**: drives a bounded random walk over scores on a timer,
//!   with a start/stop subscription contract
//! - **Sinks**: downstream consumers of single signals (alerts, exports)

pub mod store;
pub mod simulator;
pub mod sink;

pub use store::*;
pub use simulator::*;
pub use sink::*;
