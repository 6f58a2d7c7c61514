//! Breath analysis engine.
//!
//! [`BreathEngine`] is the session object used by both callers: the
//! streaming caller feeds samples and asks for a result on demand, the batch
//! caller hands over complete waveforms. All methods take `&self`, so one
//! engine can be shared across threads behind an [`Arc`].

use crate::battery::{BatteryGauge, BatteryInfo, LinearBatteryGauge};
use crate::core::batch::{self, BatchAnalysis, BatchWaveform};
use crate::core::buffer::SampleBuffer;
use crate::core::decode::RawWord;
use crate::core::result::BreathResult;
use crate::core::sample::Sample;
use crate::core::streaming;
use crate::error::{EngineError, Result};
use crate::stats::{SessionStats, SharedSessionStats};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use uuid::Uuid;

/// Session object owning the sample buffer.
pub struct BreathEngine {
    /// Samples of the current session
    buffer: Mutex<SampleBuffer>,
    /// Identifier of the current session, regenerated on reset
    session_id: RwLock<Uuid>,
    /// License key supplied by `initialize`
    license_key: RwLock<Option<String>>,
    /// Host-supplied battery computation
    battery: Box<dyn BatteryGauge>,
    stats: SharedSessionStats,
}

impl BreathEngine {
    /// Create an engine with the default linear battery gauge.
    pub fn new() -> Self {
        Self::with_battery_gauge(Box::new(LinearBatteryGauge::default()))
    }

    /// Create an engine that delegates battery readings to `gauge`.
    pub fn with_battery_gauge(gauge: Box<dyn BatteryGauge>) -> Self {
        Self::with_parts(gauge, Arc::new(SessionStats::new()))
    }

    /// Create an engine reporting into an existing stats log.
    pub fn with_parts(gauge: Box<dyn BatteryGauge>, stats: SharedSessionStats) -> Self {
        stats.record_session_started();
        Self {
            buffer: Mutex::new(SampleBuffer::new()),
            session_id: RwLock::new(Uuid::new_v4()),
            license_key: RwLock::new(None),
            battery: gauge,
            stats,
        }
    }

    /// Store the license key.
    ///
    /// Empty or whitespace-only keys are rejected.
    pub fn initialize(&self, license_key: &str) -> Result<()> {
        if license_key.trim().is_empty() {
            return Err(EngineError::InvalidArgument {
                name: "license_key",
                reason: "license key must be non-empty",
            });
        }

        let mut key = self
            .license_key
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *key = Some(license_key.to_string());
        Ok(())
    }

    /// Check whether a license key has been stored.
    pub fn is_initialized(&self) -> bool {
        self.license_key
            .read()
            .map(|key| key.is_some())
            .unwrap_or(false)
    }

    /// Drop all buffered samples and start a new session.
    pub fn reset_session(&self) {
        self.lock_buffer().clear();

        let new_id = Uuid::new_v4();
        *self
            .session_id
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = new_id;

        self.stats.record_session_started();
        tracing::debug!(session_id = %new_id, "session reset");
    }

    /// Feed one sample stamped with a wall-clock instant.
    ///
    /// The instant is reduced to whole epoch seconds.
    pub fn feed_sample(
        &self,
        co_raw: f64,
        temperature_c: f64,
        humidity_pct: f64,
        timestamp: DateTime<Utc>,
    ) {
        self.push(Sample::at(co_raw, temperature_c, humidity_pct, timestamp));
    }

    /// Feed one sample whose timestamp is already in epoch seconds.
    pub fn feed_sample_epoch(
        &self,
        co_raw: f64,
        temperature_c: f64,
        humidity_pct: f64,
        timestamp_s: f64,
    ) {
        self.push(Sample::new(co_raw, temperature_c, humidity_pct, timestamp_s));
    }

    fn push(&self, sample: Sample) {
        let evicted = self.lock_buffer().append(sample);
        self.stats.record_sample_fed();

        if evicted > 0 {
            self.stats.record_samples_evicted(evicted as u64);
            tracing::debug!(evicted, "buffer full, oldest samples dropped");
        }
    }

    /// Analyse the samples buffered so far.
    pub fn analyze_breath(&self) -> BreathResult {
        let buffer = self.lock_buffer();
        let result = streaming::reduce(&buffer.snapshot());
        let samples = buffer.len();
        drop(buffer);

        self.stats.record_streaming_analysis();
        tracing::debug!(
            samples,
            estimated_ppm = result.estimated_ppm,
            duration_sec = result.duration_sec,
            short_duration = result.short_duration,
            small_temperature_rise = result.small_temperature_rise,
            "streaming analysis complete"
        );
        result
    }

    /// Analyse a complete floating-point waveform.
    pub fn analyze_breath_batch(
        &self,
        co_raw: &[f64],
        temperature_c: &[f64],
        sample_period_sec: f64,
    ) -> Result<BreathResult> {
        self.analyze_batch_detailed(&BatchWaveform::new(co_raw, temperature_c, sample_period_sec))
            .map(|analysis| analysis.result)
    }

    /// Analyse a waveform whose CO channel is given as raw big-endian words.
    pub fn analyze_breath_words<W: RawWord>(
        &self,
        co_words: &[W],
        temperature_c: &[f64],
        sample_period_sec: f64,
    ) -> Result<BreathResult> {
        self.analyze_words_detailed(co_words, temperature_c, sample_period_sec)
            .map(|analysis| analysis.result)
    }

    /// Analyse a floating-point waveform, keeping the pipeline diagnostics.
    pub fn analyze_batch_detailed(&self, waveform: &BatchWaveform<'_>) -> Result<BatchAnalysis> {
        self.track_batch(batch::analyze(waveform))
    }

    /// Analyse a raw-word waveform, keeping the pipeline diagnostics.
    pub fn analyze_words_detailed<W: RawWord>(
        &self,
        co_words: &[W],
        temperature_c: &[f64],
        sample_period_sec: f64,
    ) -> Result<BatchAnalysis> {
        self.track_batch(batch::analyze_words(
            co_words,
            temperature_c,
            sample_period_sec,
        ))
    }

    fn track_batch(&self, outcome: Result<BatchAnalysis>) -> Result<BatchAnalysis> {
        match &outcome {
            Ok(_) => self.stats.record_batch_analysis(),
            Err(e) => {
                self.stats.record_rejected_input();
                tracing::warn!("batch input rejected: {e}");
            }
        }
        outcome
    }

    /// Compute battery state through the configured gauge.
    pub fn battery_from_raw_adc(&self, raw_adc: f64) -> BatteryInfo {
        self.battery.from_raw_adc(raw_adc)
    }

    /// Copy of the samples currently buffered, oldest first.
    pub fn buffered_samples(&self) -> Vec<Sample> {
        self.lock_buffer().snapshot().to_vec()
    }

    /// Number of samples currently buffered.
    pub fn buffered_len(&self) -> usize {
        self.lock_buffer().len()
    }

    /// Identifier of the current session.
    pub fn session_id(&self) -> Uuid {
        *self
            .session_id
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Shared handle to the stats log.
    pub fn stats(&self) -> SharedSessionStats {
        Arc::clone(&self.stats)
    }

    // append and clear leave the deque consistent even if the holder panicked
    fn lock_buffer(&self) -> MutexGuard<'_, SampleBuffer> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for BreathEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe shared engine.
pub type SharedEngine = Arc<BreathEngine>;

/// Create a new shared engine.
pub fn create_shared_engine() -> SharedEngine {
    Arc::new(BreathEngine::new())
}
