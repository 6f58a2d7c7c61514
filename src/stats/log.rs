//! Session statistics log.
//!
//! Counts what the engine has processed: samples fed and evicted, analyses
//! run, inputs rejected. Only counters are kept, never sample values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running counters for the engine.
#[derive(Debug)]
pub struct SessionStats {
    /// Number of samples fed through the streaming path
    samples_fed: AtomicU64,
    /// Number of samples dropped by the capacity limit
    samples_evicted: AtomicU64,
    /// Number of streaming analyses run
    streaming_analyses: AtomicU64,
    /// Number of batch analyses run
    batch_analyses: AtomicU64,
    /// Number of batch requests rejected by a precondition
    rejected_inputs: AtomicU64,
    /// Number of sessions started (construction and each reset)
    sessions_started: AtomicU64,
    /// Start of the stats period
    started_at: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl SessionStats {
    /// Create a new, zeroed stats log.
    pub fn new() -> Self {
        Self {
            samples_fed: AtomicU64::new(0),
            samples_evicted: AtomicU64::new(0),
            streaming_analyses: AtomicU64::new(0),
            batch_analyses: AtomicU64::new(0),
            rejected_inputs: AtomicU64::new(0),
            sessions_started: AtomicU64::new(0),
            started_at: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a stats log that persists to `path`, resuming earlier counts.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            tracing::warn!("Could not load previous session stats: {e}");
        }

        stats
    }

    pub fn record_sample_fed(&self) {
        self.samples_fed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_samples_evicted(&self, count: u64) {
        if count > 0 {
            self.samples_evicted.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn record_streaming_analysis(&self) {
        self.streaming_analyses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch_analysis(&self) {
        self.batch_analyses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_input(&self) {
        self.rejected_inputs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            samples_fed: self.samples_fed.load(Ordering::Relaxed),
            samples_evicted: self.samples_evicted.load(Ordering::Relaxed),
            streaming_analyses: self.streaming_analyses.load(Ordering::Relaxed),
            batch_analyses: self.batch_analyses.load(Ordering::Relaxed),
            rejected_inputs: self.rejected_inputs.load(Ordering::Relaxed),
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            started_at: self.started_at,
            elapsed_secs: (Utc::now() - self.started_at).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Session Statistics:\n\
             - Samples fed: {}\n\
             - Samples evicted: {}\n\
             - Streaming analyses: {}\n\
             - Batch analyses: {}\n\
             - Rejected inputs: {}\n\
             - Sessions started: {}\n\
             - Elapsed: {} seconds",
            stats.samples_fed,
            stats.samples_evicted,
            stats.streaming_analyses,
            stats.batch_analyses,
            stats.rejected_inputs,
            stats.sessions_started,
            stats.elapsed_secs
        )
    }

    /// Save counters to disk, if persistence is enabled.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.snapshot();
            let persisted = PersistedStats {
                samples_fed: stats.samples_fed,
                samples_evicted: stats.samples_evicted,
                streaming_analyses: stats.streaming_analyses,
                batch_analyses: stats.batch_analyses,
                rejected_inputs: stats.rejected_inputs,
                sessions_started: stats.sessions_started,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.samples_fed
                    .store(persisted.samples_fed, Ordering::Relaxed);
                self.samples_evicted
                    .store(persisted.samples_evicted, Ordering::Relaxed);
                self.streaming_analyses
                    .store(persisted.streaming_analyses, Ordering::Relaxed);
                self.batch_analyses
                    .store(persisted.batch_analyses, Ordering::Relaxed);
                self.rejected_inputs
                    .store(persisted.rejected_inputs, Ordering::Relaxed);
                self.sessions_started
                    .store(persisted.sessions_started, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.samples_fed.store(0, Ordering::Relaxed);
        self.samples_evicted.store(0, Ordering::Relaxed);
        self.streaming_analyses.store(0, Ordering::Relaxed);
        self.batch_analyses.store(0, Ordering::Relaxed);
        self.rejected_inputs.store(0, Ordering::Relaxed);
        self.sessions_started.store(0, Ordering::Relaxed);
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub samples_fed: u64,
    pub samples_evicted: u64,
    pub streaming_analyses: u64,
    pub batch_analyses: u64,
    pub rejected_inputs: u64,
    pub sessions_started: u64,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    samples_fed: u64,
    samples_evicted: u64,
    streaming_analyses: u64,
    batch_analyses: u64,
    rejected_inputs: u64,
    sessions_started: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared stats log.
pub type SharedSessionStats = Arc<SessionStats>;
