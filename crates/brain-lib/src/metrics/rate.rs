use crate::signal::IntervalSeries;
use log::debug;

/// Mean inter-peak interval converted to events per minute, with no bounds applied.
pub fn rate_from_intervals(intervals: &IntervalSeries) -> Option<f64> {
    intervals
        .mean()
        .and_then(|mean| if mean > 0.0 { Some(60.0 / mean) } else { None })
}

/// Convert peak timestamps (ms) into a per-minute rate.
///
/// Returns `None` with fewer than two peaks, a non-positive mean interval, or
/// a rate outside `[min_rate, max_rate]`. Out-of-range rates are dropped, not
/// clamped.
pub fn estimate_rate(peaks_ms: &[f64], min_rate: f64, max_rate: f64) -> Option<f64> {
    if peaks_ms.len() < 2 {
        return None;
    }
    let intervals = IntervalSeries::from_peak_times(peaks_ms);
    let rate = rate_from_intervals(&intervals)?;
    if rate < min_rate || rate > max_rate {
        debug!(
            "discarding implausible rate {:.1}/min (bounds {}..={})",
            rate, min_rate, max_rate
        );
        return None;
    }
    Some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_spacing_is_sixty() {
        assert_eq!(estimate_rate(&[0.0, 1000.0, 2000.0], 35.0, 200.0), Some(60.0));
    }

    #[test]
    fn rejects_rate_above_bound() {
        // 240 ms spacing -> 250 per minute
        assert_eq!(estimate_rate(&[0.0, 240.0, 480.0], 35.0, 200.0), None);
    }

    #[test]
    fn rejects_rate_below_bound() {
        // 2 s spacing -> 30 per minute
        assert_eq!(estimate_rate(&[0.0, 2000.0, 4000.0], 35.0, 200.0), None);
    }

    #[test]
    fn bounds_are_inclusive() {
        // 300 ms spacing -> exactly 200 per minute
        let rate = estimate_rate(&[0.0, 300.0, 600.0], 35.0, 200.0).unwrap();
        assert!((rate - 200.0).abs() < 1e-9);
    }

    #[test]
    fn too_few_peaks_is_none() {
        assert_eq!(estimate_rate(&[], 35.0, 200.0), None);
        assert_eq!(estimate_rate(&[1234.0], 35.0, 200.0), None);
    }

    #[test]
    fn duplicate_timestamps_give_no_rate() {
        assert_eq!(estimate_rate(&[500.0, 500.0], 35.0, 200.0), None);
    }

    #[test]
    fn uses_plain_mean_of_intervals() {
        // intervals 0.8 s and 1.2 s -> mean 1.0 s
        let rate = estimate_rate(&[0.0, 800.0, 2000.0], 35.0, 200.0).unwrap();
        assert!((rate - 60.0).abs() < 1e-9);
    }
}
