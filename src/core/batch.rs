//! Offline analysis of a captured CO waveform.
//!
//! The pipeline estimates a baseline from the leading segment, smooths the
//! CO signal with a centered moving average, then searches a fixed horizon
//! after the baseline for the peak. Duration is measured from the end of the
//! baseline segment to the peak.

use crate::core::constants::{
    BASELINE_FRACTION, BASELINE_MAX_SAMPLES, BASELINE_MIN_SAMPLES, PEAK_SEARCH_HORIZON_SEC,
    SMOOTHING_MAX_SAMPLES, SMOOTHING_MIN_SAMPLES, SMOOTHING_WIDTH_SEC,
};
use crate::core::decode::{decode_words, RawWord};
use crate::core::result::BreathResult;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// A captured waveform borrowed from the caller.
///
/// `co_raw` and `temperature_c` are parallel arrays sampled every
/// `sample_period_sec` seconds.
#[derive(Debug, Clone, Copy)]
pub struct BatchWaveform<'a> {
    pub co_raw: &'a [f64],
    pub temperature_c: &'a [f64],
    pub sample_period_sec: f64,
}

impl<'a> BatchWaveform<'a> {
    pub fn new(co_raw: &'a [f64], temperature_c: &'a [f64], sample_period_sec: f64) -> Self {
        Self {
            co_raw,
            temperature_c,
            sample_period_sec,
        }
    }

    /// Build a waveform from inputs that may not have been supplied.
    pub fn from_optional(
        co_raw: Option<&'a [f64]>,
        temperature_c: Option<&'a [f64]>,
        sample_period_sec: f64,
    ) -> Result<Self> {
        let co_raw = co_raw.ok_or(EngineError::MissingInput("co_raw"))?;
        let temperature_c = temperature_c.ok_or(EngineError::MissingInput("temperature_c"))?;
        Ok(Self::new(co_raw, temperature_c, sample_period_sec))
    }

    pub fn len(&self) -> usize {
        self.co_raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.co_raw.is_empty()
    }
}

/// Intermediate values computed while analysing a waveform.
///
/// The baseline means are not used in the result; they are kept here for
/// inspection and later calibration work.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchDiagnostics {
    /// Number of leading samples in the baseline segment
    pub baseline_count: usize,
    /// Mean raw CO over the baseline segment
    pub baseline_co: f64,
    /// Mean temperature over the baseline segment
    pub baseline_temperature_c: f64,
    /// Moving-average window, in samples
    pub smoothing_window: usize,
    /// First index searched for the peak
    pub search_start: usize,
    /// Last index searched for the peak (inclusive)
    pub search_end: usize,
    /// Index of the smoothed maximum
    pub peak_index: usize,
    /// Smoothed value at the peak
    pub peak_value: f64,
}

/// Result of a batch analysis plus its diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalysis {
    pub result: BreathResult,
    /// Absent when the waveform was empty
    pub diagnostics: Option<BatchDiagnostics>,
}

impl BatchAnalysis {
    fn empty() -> Self {
        Self {
            result: BreathResult::empty(),
            diagnostics: None,
        }
    }
}

/// Check the shape of a batch request.
///
/// Returns `Ok(false)` when either array is empty, which is not an error but
/// yields the degenerate result.
fn check_shape(co_len: usize, temperature_len: usize, sample_period_sec: f64) -> Result<bool> {
    if co_len == 0 || temperature_len == 0 {
        return Ok(false);
    }
    if co_len != temperature_len {
        return Err(EngineError::LengthMismatch {
            co: co_len,
            temperature: temperature_len,
        });
    }
    if !(sample_period_sec > 0.0 && sample_period_sec.is_finite()) {
        return Err(EngineError::InvalidSamplePeriod(sample_period_sec));
    }
    Ok(true)
}

/// Analyse a floating-point waveform.
pub fn analyze(waveform: &BatchWaveform<'_>) -> Result<BatchAnalysis> {
    if !check_shape(
        waveform.co_raw.len(),
        waveform.temperature_c.len(),
        waveform.sample_period_sec,
    )? {
        return Ok(BatchAnalysis::empty());
    }
    Ok(run_pipeline(waveform))
}

/// Analyse a waveform whose CO channel is given as raw big-endian words.
///
/// Shape and period are checked before any word is decoded.
pub fn analyze_words<W: RawWord>(
    co_words: &[W],
    temperature_c: &[f64],
    sample_period_sec: f64,
) -> Result<BatchAnalysis> {
    if !check_shape(co_words.len(), temperature_c.len(), sample_period_sec)? {
        return Ok(BatchAnalysis::empty());
    }

    let co_raw: Vec<f64> = decode_words(co_words)?
        .into_iter()
        .map(f64::from)
        .collect();

    analyze(&BatchWaveform::new(&co_raw, temperature_c, sample_period_sec))
}

/// Number of leading samples used for the baseline.
///
/// Nominally 10% of the waveform, at least three samples and at most fifty,
/// never more than the waveform holds.
pub fn baseline_count(n: usize) -> usize {
    let nominal = round_to_count(n as f64 * BASELINE_FRACTION);
    nominal
        .max(BASELINE_MIN_SAMPLES)
        .min(BASELINE_MAX_SAMPLES.min(n))
}

/// Moving-average window targeting roughly half a second of samples.
pub fn smoothing_window(sample_period_sec: f64) -> usize {
    round_to_count(SMOOTHING_WIDTH_SEC / sample_period_sec)
        .clamp(SMOOTHING_MIN_SAMPLES, SMOOTHING_MAX_SAMPLES)
}

/// Centered moving average, clipped at both ends.
///
/// Edge samples average over the part of the window that exists; there is
/// no padding.
pub fn smooth(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let half = window / 2;

    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half).min(n - 1);
            let span = &values[start..=end];
            span.iter().sum::<f64>() / span.len() as f64
        })
        .collect()
}

/// Inclusive index range searched for the peak.
///
/// Falls back to searching through the end of the waveform when the horizon
/// collapses.
fn search_range(n: usize, baseline_count: usize, sample_period_sec: f64) -> (usize, usize) {
    let last = n - 1;
    let start = baseline_count.min(last);
    let horizon = round_to_count(PEAK_SEARCH_HORIZON_SEC / sample_period_sec);

    let mut end = start.saturating_add(horizon).min(last);
    if end <= start {
        end = last;
    }
    (start, end)
}

/// Index of the maximum in `values[start..=end]`; the earliest index wins ties.
fn find_peak(values: &[f64], start: usize, end: usize) -> (usize, f64) {
    let mut peak_index = start;
    let mut peak_value = values[start];
    for (i, &v) in values.iter().enumerate().take(end + 1).skip(start + 1) {
        if v > peak_value {
            peak_value = v;
            peak_index = i;
        }
    }
    (peak_index, peak_value)
}

fn run_pipeline(waveform: &BatchWaveform<'_>) -> BatchAnalysis {
    let n = waveform.len();
    let period = waveform.sample_period_sec;
    let co_raw = waveform.co_raw;
    let temperature_c = waveform.temperature_c;

    let baseline_count = baseline_count(n);
    let baseline_co = co_raw[..baseline_count].iter().sum::<f64>() / baseline_count as f64;
    let baseline_temperature_c =
        temperature_c[..baseline_count].iter().sum::<f64>() / baseline_count as f64;

    let window = smoothing_window(period);
    let smoothed = smooth(co_raw, window);

    let (search_start, search_end) = search_range(n, baseline_count, period);
    let (peak_index, peak_value) = find_peak(&smoothed, search_start, search_end);

    let duration = ((peak_index - search_start) as f64 * period).max(0.0);
    let mean_co_raw = co_raw.iter().sum::<f64>() / n as f64;

    let mut min_temp = f64::INFINITY;
    let mut max_temp = f64::NEG_INFINITY;
    for &t in temperature_c {
        if t < min_temp {
            min_temp = t;
        }
        if t > max_temp {
            max_temp = t;
        }
    }

    let result = BreathResult::from_stats(mean_co_raw, duration, min_temp, max_temp);

    tracing::debug!(
        samples = n,
        baseline_count,
        baseline_co,
        window,
        search_start,
        search_end,
        peak_index,
        duration,
        estimated_ppm = result.estimated_ppm,
        "batch analysis complete"
    );

    BatchAnalysis {
        result,
        diagnostics: Some(BatchDiagnostics {
            baseline_count,
            baseline_co,
            baseline_temperature_c,
            smoothing_window: window,
            search_start,
            search_end,
            peak_index,
            peak_value,
        }),
    }
}

/// Round half-to-even and convert to a sample count.
///
/// Negative and NaN inputs become zero; very large inputs saturate.
fn round_to_count(x: f64) -> usize {
    x.round_ties_even() as usize
}
