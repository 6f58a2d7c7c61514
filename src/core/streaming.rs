//! Aggregate reduction of a streaming session into a breath result.

use crate::core::buffer::SampleSnapshot;
use crate::core::result::BreathResult;
use statrs::statistics::Statistics;

/// Reduce the buffered samples to a breath result.
///
/// Duration is the elapsed time between the first and last sample; the PPM
/// estimate comes from the mean raw CO value over every sample.
pub fn reduce(snapshot: &SampleSnapshot<'_>) -> BreathResult {
    let (first, last) = match (snapshot.first(), snapshot.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return BreathResult::empty(),
    };

    let duration = (last.timestamp_s - first.timestamp_s).max(0.0);
    let mean_co_raw = snapshot.iter().map(|s| s.co_raw).sum::<f64>() / snapshot.len() as f64;
    let temps = snapshot.iter().map(|s| s.temperature_c);
    let min_temp = Statistics::min(temps.clone());
    let max_temp = Statistics::max(temps);

    BreathResult::from_stats(mean_co_raw, duration, min_temp, max_temp)
}
