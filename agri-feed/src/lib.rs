//! AgriSignals Feed Layer
//!
//! Backing sources that produce Signal-shaped records:
//! - JSON fixture files and in-memory fixtures
//! - The remote signals API (with retry)
//! - A generated "live" feed priced from a mock price board

pub mod source;
pub mod fixture;
pub mod remote;
pub mod live;

pub use source::*;
pub use fixture::*;
pub use remote::*;
pub use live::*;
