use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One scalar measurement taken from a single analysed frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedSample {
    /// Timestamp in milliseconds
    pub t: f64,
    /// Sample value (mean green level, eye ratio, ...)
    pub v: f64,
}

impl TimedSample {
    pub fn new(t: f64, v: f64) -> Self {
        Self { t, v }
    }
}

/// Sliding time window of samples, oldest first.
#[derive(Debug, Clone)]
pub struct SignalBuffer {
    window_ms: f64,
    samples: VecDeque<TimedSample>,
}

impl SignalBuffer {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            samples: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append a sample and drop everything that fell out of the window
    /// relative to the new sample's timestamp.
    pub fn append(&mut self, sample: TimedSample) {
        self.samples.push_back(sample);
        self.prune(sample.t);
    }

    /// Drop samples with `now - t > window_ms`.
    pub fn prune(&mut self, now: f64) {
        while let Some(front) = self.samples.front() {
            if now - front.t > self.window_ms {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn snapshot(&self) -> Vec<TimedSample> {
        self.samples.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Ordered log of discrete event timestamps (ms) over a trailing window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    window_ms: f64,
    times: Vec<f64>,
}

impl EventLog {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            times: Vec::new(),
        }
    }

    /// Recorded timestamps, oldest first.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn last(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Record an event. Timestamps earlier than the last event are ignored.
    pub fn record(&mut self, t: f64) -> bool {
        match self.last() {
            Some(last) if t < last => false,
            _ => {
                self.times.push(t);
                true
            }
        }
    }

    pub fn prune(&mut self, now: f64) {
        let window = self.window_ms;
        self.times.retain(|&t| now - t <= window);
    }

    /// Number of events inside the trailing window ending at `now`.
    pub fn count_in_window(&mut self, now: f64) -> usize {
        self.prune(now);
        self.times.len()
    }

    pub fn clear(&mut self) {
        self.times.clear();
    }
}

/// Intervals between consecutive peaks, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalSeries {
    pub intervals: Vec<f64>,
}

impl IntervalSeries {
    pub fn from_peak_times(peaks_ms: &[f64]) -> Self {
        let intervals = peaks_ms
            .windows(2)
            .map(|w| (w[1] - w[0]) / 1000.0)
            .collect();
        Self { intervals }
    }

    pub fn mean(&self) -> Option<f64> {
        if self.intervals.is_empty() {
            return None;
        }
        Some(self.intervals.iter().sum::<f64>() / self.intervals.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_drops_samples_outside_window() {
        let mut buf = SignalBuffer::new(1000.0);
        for i in 0..30 {
            buf.append(TimedSample::new(i as f64 * 100.0, i as f64));
        }
        let snap = buf.snapshot();
        let newest = snap.last().unwrap().t;
        assert!(snap.iter().all(|s| newest - s.t <= 1000.0));
        assert_eq!(snap.first().unwrap().t, 1900.0);
        assert_eq!(snap.len(), 11);
    }

    #[test]
    fn prune_at_later_clock_respects_window() {
        let mut buf = SignalBuffer::new(500.0);
        buf.append(TimedSample::new(0.0, 1.0));
        buf.append(TimedSample::new(300.0, 1.0));
        buf.append(TimedSample::new(450.0, 1.0));
        let t2 = 900.0;
        buf.prune(t2);
        let snap = buf.snapshot();
        assert!(snap.iter().all(|s| s.t >= t2 - 500.0));
        assert_eq!(snap.len(), 1);
    }

    #[test]
    fn snapshot_does_not_mutate() {
        let mut buf = SignalBuffer::new(1000.0);
        buf.append(TimedSample::new(0.0, 4.0));
        let a = buf.snapshot();
        let b = buf.snapshot();
        assert_eq!(a, b);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn event_log_counts_trailing_window() {
        let mut log = EventLog::new(60_000.0);
        assert!(log.record(0.0));
        assert!(log.record(30_000.0));
        assert!(log.record(59_000.0));
        assert_eq!(log.count_in_window(60_000.0), 3);
        assert_eq!(log.count_in_window(61_000.0), 2);
        assert!(!log.record(10_000.0));
        assert_eq!(log.times(), &[30_000.0, 59_000.0]);
    }

    #[test]
    fn interval_series_in_seconds() {
        let rr = IntervalSeries::from_peak_times(&[0.0, 1000.0, 2500.0]);
        assert_eq!(rr.intervals, vec![1.0, 1.5]);
        assert_eq!(rr.mean(), Some(1.25));
        assert_eq!(IntervalSeries::from_peak_times(&[5.0]).mean(), None);
    }
}
