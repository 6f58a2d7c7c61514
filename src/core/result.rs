//! Breath result type and the quality classifier shared by both pipelines.

use crate::core::constants::{PPM_SCALE, SHORT_DURATION_SEC, SMALL_TEMPERATURE_RISE_C};
use serde::{Deserialize, Serialize};

/// Summary of one breath event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreathResult {
    /// Approximate CO concentration (not calibrated)
    pub estimated_ppm: f64,
    /// Duration of the event in seconds
    pub duration_sec: f64,
    /// The event was shorter than the minimum duration
    pub short_duration: bool,
    /// The temperature spread was below the minimum rise
    pub small_temperature_rise: bool,
}

impl BreathResult {
    /// The "insufficient data" result: zero concentration and duration with
    /// both quality flags set.
    pub const fn empty() -> Self {
        Self {
            estimated_ppm: 0.0,
            duration_sec: 0.0,
            short_duration: true,
            small_temperature_rise: true,
        }
    }

    /// Build a result from aggregate statistics, applying [`classify`].
    pub(crate) fn from_stats(mean_co_raw: f64, duration_sec: f64, min_temp: f64, max_temp: f64) -> Self {
        let flags = classify(duration_sec, min_temp, max_temp);
        Self {
            estimated_ppm: estimate_ppm(mean_co_raw),
            duration_sec,
            short_duration: flags.short_duration,
            small_temperature_rise: flags.small_temperature_rise,
        }
    }
}

/// Quality flags derived from duration and temperature extrema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityFlags {
    pub short_duration: bool,
    pub small_temperature_rise: bool,
}

/// Classify an event from its duration and temperature extrema.
///
/// Both the streaming and batch paths go through this function.
pub fn classify(duration_sec: f64, min_temp: f64, max_temp: f64) -> QualityFlags {
    QualityFlags {
        short_duration: duration_sec < SHORT_DURATION_SEC,
        small_temperature_rise: (max_temp - min_temp) < SMALL_TEMPERATURE_RISE_C,
    }
}

/// Approximate PPM from the mean raw CO value, clamped at zero.
pub fn estimate_ppm(mean_co_raw: f64) -> f64 {
    (mean_co_raw * PPM_SCALE).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result() {
        let r = BreathResult::empty();
        assert_eq!(r.estimated_ppm, 0.0);
        assert_eq!(r.duration_sec, 0.0);
        assert!(r.short_duration);
        assert!(r.small_temperature_rise);
    }

    #[test]
    fn test_classify_thresholds() {
        let flags = classify(2.0, 25.0, 25.5);
        assert!(!flags.short_duration);
        assert!(!flags.small_temperature_rise);

        let flags = classify(1.999, 25.0, 25.49);
        assert!(flags.short_duration);
        assert!(flags.small_temperature_rise);
    }

    #[test]
    fn test_negative_ppm_clamps() {
        assert_eq!(estimate_ppm(-10.0), 0.0);
        assert_eq!(estimate_ppm(10.0), 15.0);
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_value(BreathResult::empty()).unwrap();
        assert_eq!(json["short_duration"], true);
        assert_eq!(json["estimated_ppm"], 0.0);
    }
}
