//! Fixed analysis constants.
//!
//! These values are part of the behavioural contract of the engine and are
//! intentionally not configurable.

/// Maximum number of samples retained in a streaming session.
pub const MAX_SAMPLES: usize = 4096;

/// Linear scale applied to the mean raw CO value to get an approximate PPM.
pub const PPM_SCALE: f64 = 1.5;

/// Breath events shorter than this (seconds) are flagged as short.
pub const SHORT_DURATION_SEC: f64 = 2.0;

/// Temperature spreads below this (°C) are flagged as a small rise.
pub const SMALL_TEMPERATURE_RISE_C: f64 = 0.5;

/// Fraction of the waveform used to estimate the baseline.
pub const BASELINE_FRACTION: f64 = 0.1;

/// Lower bound on the number of baseline samples.
pub const BASELINE_MIN_SAMPLES: usize = 3;

/// Upper bound on the number of baseline samples.
pub const BASELINE_MAX_SAMPLES: usize = 50;

/// Target width of the moving-average window, in seconds.
pub const SMOOTHING_WIDTH_SEC: f64 = 0.5;

/// Smallest moving-average window, in samples.
pub const SMOOTHING_MIN_SAMPLES: usize = 3;

/// Largest moving-average window, in samples.
pub const SMOOTHING_MAX_SAMPLES: usize = 11;

/// How far past the baseline segment the peak search looks, in seconds.
pub const PEAK_SEARCH_HORIZON_SEC: f64 = 6.0;

/// Width of one raw sensor word, in bytes.
pub const RAW_WORD_BYTES: usize = 2;
