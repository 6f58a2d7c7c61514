//! Integration tests for the breath analysis engine

use chrono::{Duration, TimeZone, Utc};
use std::thread;
use xhale_engine::core::constants::MAX_SAMPLES;
use xhale_engine::{create_shared_engine, BreathEngine, BreathResult, ErrorKind};

fn step_waveform() -> (Vec<f64>, Vec<f64>) {
    let mut co = vec![10.0; 10];
    co.extend(vec![100.0; 10]);
    (co, vec![25.0; 20])
}

#[test]
fn test_empty_buffer_returns_sentinel() {
    let engine = BreathEngine::new();
    assert_eq!(engine.analyze_breath(), BreathResult::empty());
}

#[test]
fn test_single_sample_session() {
    let engine = BreathEngine::new();
    engine.feed_sample(42.0, 25.0, 50.0, Utc::now());

    let result = engine.analyze_breath();
    assert_eq!(result.duration_sec, 0.0);
    assert!(result.short_duration);
    assert!((result.estimated_ppm - 63.0).abs() < 1e-9);
}

#[test]
fn test_streaming_breath() {
    let engine = BreathEngine::new();
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();

    // Five seconds of exhalation with a warming sensor
    for i in 0..=5 {
        let t = start + Duration::seconds(i);
        engine.feed_sample(20.0 + i as f64 * 10.0, 24.0 + i as f64 * 0.3, 55.0, t);
    }

    let result = engine.analyze_breath();
    assert_eq!(result.duration_sec, 5.0);
    assert!(!result.short_duration);
    assert!(!result.small_temperature_rise);
    assert!((result.estimated_ppm - 45.0 * 1.5).abs() < 1e-9);
}

#[test]
fn test_streaming_and_batch_share_mean() {
    let co = [0.1, 0.2, 0.3, 0.7, 1.1, 3.3, 0.9];
    let temps = [25.0, 25.1, 25.3, 25.6, 25.8, 25.7, 25.5];

    let engine = BreathEngine::new();
    for (i, (&c, &t)) in co.iter().zip(temps.iter()).enumerate() {
        engine.feed_sample_epoch(c, t, 50.0, i as f64);
    }
    let streamed = engine.analyze_breath();
    let batch = engine.analyze_breath_batch(&co, &temps, 1.0).unwrap();

    assert_eq!(streamed.estimated_ppm, batch.estimated_ppm);
    assert_eq!(streamed.estimated_ppm, co.iter().sum::<f64>() / 7.0 * 1.5);
}

#[test]
fn test_buffer_keeps_most_recent_samples() {
    let engine = BreathEngine::new();
    let total = MAX_SAMPLES + 500;
    for i in 0..total {
        engine.feed_sample_epoch(i as f64, 25.0, 50.0, i as f64);
    }

    let samples = engine.buffered_samples();
    assert_eq!(samples.len(), MAX_SAMPLES);
    assert_eq!(samples[0].co_raw, 500.0);
    assert!(samples.windows(2).all(|w| w[1].co_raw == w[0].co_raw + 1.0));

    // Duration spans only the retained samples
    let result = engine.analyze_breath();
    assert_eq!(result.duration_sec, (MAX_SAMPLES - 1) as f64);
}

#[test]
fn test_batch_step_scenario() {
    let engine = BreathEngine::new();
    let (co, temps) = step_waveform();

    let analysis = engine
        .analyze_batch_detailed(&xhale_engine::core::BatchWaveform::new(&co, &temps, 1.0))
        .unwrap();
    let diag = analysis.diagnostics.unwrap();

    assert_eq!(diag.baseline_count, 3);
    assert!((9..=10).contains(&diag.peak_index));
    assert_eq!(
        analysis.result.duration_sec,
        (diag.peak_index - diag.baseline_count) as f64
    );
    assert!(analysis.result.small_temperature_rise);
    assert!((analysis.result.estimated_ppm - 82.5).abs() < 1e-9);
}

#[test]
fn test_batch_empty_any_period() {
    let engine = BreathEngine::new();
    for period in [1.0, 0.0, -3.0] {
        assert_eq!(
            engine.analyze_breath_batch(&[], &[], period).unwrap(),
            BreathResult::empty()
        );
    }
}

#[test]
fn test_batch_errors() {
    let engine = BreathEngine::new();

    let err = engine
        .analyze_breath_batch(&[1.0, 2.0, 3.0], &[25.0, 25.0], 1.0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LengthMismatch);

    for period in [0.0, -1.0] {
        let err = engine
            .analyze_breath_batch(&[1.0], &[25.0], period)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSamplePeriod);
    }
}

#[test]
fn test_words_match_floats() {
    let engine = BreathEngine::new();
    let (co, temps) = step_waveform();
    let words: Vec<Vec<u8>> = co
        .iter()
        .map(|&v| (v as u16).to_be_bytes().to_vec())
        .collect();

    assert_eq!(
        engine.analyze_breath_words(&words, &temps, 1.0).unwrap(),
        engine.analyze_breath_batch(&co, &temps, 1.0).unwrap()
    );
}

#[test]
fn test_malformed_word() {
    let engine = BreathEngine::new();
    let words: Vec<Vec<u8>> = vec![vec![0x01]];

    let err = engine
        .analyze_breath_words(&words, &[25.0], 1.0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_batch_does_not_touch_stream_buffer() {
    let engine = BreathEngine::new();
    engine.feed_sample_epoch(10.0, 25.0, 50.0, 0.0);

    let (co, temps) = step_waveform();
    engine.analyze_breath_batch(&co, &temps, 1.0).unwrap();

    assert_eq!(engine.buffered_len(), 1);
}

#[test]
fn test_concurrent_feed_and_analyze() {
    let engine = create_shared_engine();

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let engine = engine.clone();
            thread::spawn(move || {
                for i in 0..2000 {
                    engine.feed_sample_epoch(1.0, 25.0, 50.0, (w * 2000 + i) as f64);
                }
            })
        })
        .collect();

    let reader = {
        let engine = engine.clone();
        thread::spawn(move || {
            for _ in 0..200 {
                let result = engine.analyze_breath();
                assert!(result.estimated_ppm == 0.0 || (result.estimated_ppm - 1.5).abs() < 1e-9);
                assert!(engine.buffered_len() <= MAX_SAMPLES);
            }
        })
    };

    for handle in writers {
        handle.join().unwrap();
    }
    reader.join().unwrap();

    assert_eq!(engine.buffered_len(), MAX_SAMPLES);
    assert_eq!(engine.stats().snapshot().samples_fed, 8000);
}
