//! Statistics about what the engine has processed.

pub mod log;

pub use log::{SessionStats, SharedSessionStats, StatsSnapshot};
