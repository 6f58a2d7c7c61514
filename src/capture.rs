//! Capture file formats.
//!
//! Batch captures are single JSON documents holding a complete waveform.
//! Streaming captures are JSON Lines, one sample per line, replayed through
//! the streaming path.

use crate::core::batch::{BatchAnalysis, BatchWaveform};
use crate::engine::BreathEngine;
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// A previously captured waveform.
///
/// The CO channel is either floating-point values (`co_raw`) or raw
/// big-endian sensor words (`co_words`). A `null` word is kept so it can be
/// reported as malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchCapture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_raw: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_words: Option<Vec<Option<Vec<u8>>>>,
    #[serde(default)]
    pub temperature_c: Option<Vec<f64>>,
    pub sample_period_sec: f64,
}

impl BatchCapture {
    /// Parse a capture from JSON text.
    pub fn from_json(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Run the capture through the engine's batch path.
    ///
    /// `co_raw` is used when present, otherwise `co_words`.
    pub fn analyze(&self, engine: &BreathEngine) -> Result<BatchAnalysis> {
        let temperature_c = self.temperature_c.as_deref();

        match (&self.co_raw, &self.co_words) {
            (Some(co_raw), _) => {
                let waveform = BatchWaveform::from_optional(
                    Some(co_raw.as_slice()),
                    temperature_c,
                    self.sample_period_sec,
                )?;
                engine.analyze_batch_detailed(&waveform)
            }
            (None, Some(co_words)) => {
                let temperature_c =
                    temperature_c.ok_or(EngineError::MissingInput("temperature_c"))?;
                engine.analyze_words_detailed(co_words, temperature_c, self.sample_period_sec)
            }
            (None, None) => Err(EngineError::MissingInput("co_raw")),
        }
    }
}

/// One line of a streaming capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub co_raw: f64,
    pub temperature_c: f64,
    #[serde(default)]
    pub humidity_pct: f64,
    pub timestamp: DateTime<Utc>,
}

impl SampleRecord {
    /// Parse a single JSON line.
    pub fn parse_line(line: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Feed this record into the engine's streaming buffer.
    pub fn feed(&self, engine: &BreathEngine) {
        engine.feed_sample(
            self.co_raw,
            self.temperature_c,
            self.humidity_pct,
            self.timestamp,
        );
    }
}

/// Error reading a streaming capture.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Read every sample record from a JSON Lines source.
///
/// Blank lines are skipped; line numbers in errors are 1-based.
pub fn read_sample_records<R: BufRead>(reader: R) -> std::result::Result<Vec<SampleRecord>, CaptureError> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = SampleRecord::parse_line(&line).map_err(|source| CaptureError::Parse {
            line: i + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_float_capture() {
        let capture = BatchCapture::from_json(
            r#"{"co_raw": [1, 2, 3, 4], "temperature_c": [25, 25, 25, 26], "sample_period_sec": 1.0}"#,
        )
        .unwrap();

        let analysis = capture.analyze(&BreathEngine::new()).unwrap();
        assert!((analysis.result.estimated_ppm - 3.75).abs() < 1e-9);
        assert!(!analysis.result.small_temperature_rise);
    }

    #[test]
    fn test_word_capture_with_null_word() {
        let capture = BatchCapture::from_json(
            r#"{"co_words": [[0, 1], null], "temperature_c": [25, 25], "sample_period_sec": 0.5}"#,
        )
        .unwrap();

        let err = capture.analyze(&BreathEngine::new()).unwrap_err();
        assert_eq!(err, EngineError::InvalidInput { index: 1, len: None });
    }

    #[test]
    fn test_missing_channels() {
        let engine = BreathEngine::new();

        let capture = BatchCapture::from_json(r#"{"temperature_c": [25], "sample_period_sec": 1.0}"#)
            .unwrap();
        assert_eq!(
            capture.analyze(&engine).unwrap_err().kind(),
            ErrorKind::MissingInput
        );

        let capture = BatchCapture::from_json(r#"{"co_raw": [1], "sample_period_sec": 1.0}"#).unwrap();
        assert_eq!(
            capture.analyze(&engine).unwrap_err(),
            EngineError::MissingInput("temperature_c")
        );

        let capture =
            BatchCapture::from_json(r#"{"co_words": [[0, 1]], "sample_period_sec": 1.0}"#).unwrap();
        assert_eq!(
            capture.analyze(&engine).unwrap_err(),
            EngineError::MissingInput("temperature_c")
        );
    }

    #[test]
    fn test_read_sample_records() {
        let input = "\
{\"co_raw\": 10, \"temperature_c\": 25.0, \"humidity_pct\": 40, \"timestamp\": \"2024-05-01T10:00:00Z\"}

{\"co_raw\": 20, \"temperature_c\": 25.5, \"timestamp\": \"2024-05-01T10:00:03Z\"}
";
        let records = read_sample_records(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].humidity_pct, 0.0);

        let engine = BreathEngine::new();
        for record in &records {
            record.feed(&engine);
        }
        let result = engine.analyze_breath();
        assert_eq!(result.duration_sec, 3.0);
        assert!(!result.short_duration);
    }

    #[test]
    fn test_read_sample_records_reports_line() {
        let input = "{\"co_raw\": 1, \"temperature_c\": 1, \"timestamp\": \"2024-05-01T10:00:00Z\"}\nnot json\n";
        match read_sample_records(input.as_bytes()) {
            Err(CaptureError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
