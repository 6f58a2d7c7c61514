//! Sensor observation type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sensor observation fed by the streaming caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Raw CO sensor magnitude (unitless)
    pub co_raw: f64,
    /// Ambient temperature in °C
    pub temperature_c: f64,
    /// Relative humidity in percent
    pub humidity_pct: f64,
    /// Seconds since the Unix epoch
    pub timestamp_s: f64,
}

impl Sample {
    pub fn new(co_raw: f64, temperature_c: f64, humidity_pct: f64, timestamp_s: f64) -> Self {
        Self {
            co_raw,
            temperature_c,
            humidity_pct,
            timestamp_s,
        }
    }

    /// Create a sample stamped with a wall-clock instant.
    ///
    /// The instant is reduced to whole epoch seconds; the sub-second part is
    /// dropped.
    pub fn at(co_raw: f64, temperature_c: f64, humidity_pct: f64, timestamp: DateTime<Utc>) -> Self {
        Self::new(
            co_raw,
            temperature_c,
            humidity_pct,
            timestamp.timestamp() as f64,
        )
    }
}
