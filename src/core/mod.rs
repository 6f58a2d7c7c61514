//! Signal-processing core.
//!
//! This module contains:
//! - The bounded sample buffer used by streaming sessions
//! - Decoding of raw big-endian sensor words
//! - The streaming reduction and the batch smoothing/peak pipeline
//! - The quality classifier shared by both pipelines

pub mod batch;
pub mod buffer;
pub mod constants;
pub mod decode;
pub mod result;
pub mod sample;
pub mod streaming;

// Re-export commonly used types
pub use batch::{BatchAnalysis, BatchDiagnostics, BatchWaveform};
pub use buffer::{SampleBuffer, SampleSnapshot};
pub use decode::{decode_word, decode_words, RawWord};
pub use result::{classify, BreathResult, QualityFlags};
pub use sample::Sample;
