//! XHale breath analysis engine.
//!
//! Turns a time series of raw carbon-monoxide sensor readings, ambient
//! temperature and humidity into a single breath-event summary: an
//! approximate concentration, the event duration, and two quality flags.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        BreathEngine                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  feed_sample ─▶ SampleBuffer ─▶ streaming::reduce ─┐        │
//! │                  (4096, FIFO)                       │        │
//! │                                                     ▼        │
//! │  raw words ─▶ decode ─┐                        classify ─▶ BreathResult
//! │                       ▼                             ▲        │
//! │  co/temperature ─▶ batch::analyze ──────────────────┘        │
//! │            (baseline, smoothing, peak search)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use xhale_engine::BreathEngine;
//!
//! let engine = BreathEngine::new();
//! engine.initialize("XH-DEMO").unwrap();
//!
//! // Streaming: feed samples as they arrive, analyse on demand
//! engine.feed_sample_epoch(12.0, 24.8, 45.0, 1_700_000_000.0);
//! engine.feed_sample_epoch(48.0, 25.6, 61.0, 1_700_000_003.0);
//! let result = engine.analyze_breath();
//! assert!(!result.short_duration);
//!
//! // Batch: analyse a complete waveform
//! let co = [10.0, 10.0, 10.0, 60.0, 90.0, 70.0];
//! let temps = [25.0, 25.0, 25.2, 25.6, 25.9, 25.7];
//! let result = engine.analyze_breath_batch(&co, &temps, 0.5).unwrap();
//! assert!(result.short_duration);
//! ```

pub mod battery;
pub mod capture;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod stats;

// Re-export key types at crate root for convenience
pub use battery::{BatteryGauge, BatteryInfo, LinearBatteryGauge};
pub use capture::{BatchCapture, SampleRecord};
pub use config::{Config, ConfigError};
pub use crate::core::{BatchAnalysis, BatchDiagnostics, BreathResult, Sample};
pub use engine::{create_shared_engine, BreathEngine, SharedEngine};
pub use error::{EngineError, ErrorKind};
pub use stats::{SessionStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
