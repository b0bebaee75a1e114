//! Process-level wiring: the tracking engine and logging setup.

pub mod tracing;
pub mod tracking_system;

pub use self::tracing::setup_tracing;
pub use tracking_system::*;
