use crate::{
    config::PulseConfig,
    metrics::rate::estimate_rate,
    signal::{SignalBuffer, TimedSample},
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Which threshold produced a set of peaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPass {
    Primary,
    Fallback,
}

/// Peaks found in one detector run, identified by sample timestamp (ms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakDetection {
    pub peaks: Vec<f64>,
    pub pass: ThresholdPass,
}

/// Full result of one pulse pipeline pass, for offline inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseAnalysis {
    pub sample_count: usize,
    pub detection: Option<PeakDetection>,
    pub bpm: Option<f64>,
}

/// Subtract the mean, then smooth with a boundary-clamped moving average of
/// half-width `half_window`.
pub fn detrend_smooth(values: &[f64], half_window: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let detrended: Vec<f64> = values.iter().map(|v| v - mean).collect();
    moving_average(&detrended, half_window)
}

fn moving_average(data: &[f64], half_window: usize) -> Vec<f64> {
    let last = data.len() - 1;
    (0..data.len())
        .map(|i| {
            let lo = i.saturating_sub(half_window);
            let hi = (i + half_window).min(last);
            let window = &data[lo..=hi];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// Timestamps of strict interior local maxima above `threshold`.
pub fn local_maxima_above(values: &[f64], times: &[f64], threshold: f64) -> Vec<f64> {
    let n = values.len().min(times.len());
    if n < 3 {
        return Vec::new();
    }
    (1..n - 1)
        .filter(|&i| {
            let v = values[i];
            v > values[i - 1] && v > values[i + 1] && v > threshold
        })
        .map(|i| times[i])
        .collect()
}

/// Scan with the primary threshold; if that yields fewer than two peaks,
/// rescan the whole sequence with the fallback threshold and use that result.
pub fn detect_peaks(values: &[f64], times: &[f64], primary: f64, fallback: f64) -> PeakDetection {
    let peaks = local_maxima_above(values, times, primary);
    if peaks.len() >= 2 {
        return PeakDetection {
            peaks,
            pass: ThresholdPass::Primary,
        };
    }
    debug!(
        "primary threshold {} found {} peak(s), retrying with {}",
        primary,
        peaks.len(),
        fallback
    );
    PeakDetection {
        peaks: local_maxima_above(values, times, fallback),
        pass: ThresholdPass::Fallback,
    }
}

/// Run filter, peak detection and rate estimation over a sample snapshot.
pub fn analyze_samples(samples: &[TimedSample], cfg: &PulseConfig) -> PulseAnalysis {
    if samples.len() < cfg.min_samples {
        return PulseAnalysis {
            sample_count: samples.len(),
            detection: None,
            bpm: None,
        };
    }
    let values: Vec<f64> = samples.iter().map(|s| s.v).collect();
    let times: Vec<f64> = samples.iter().map(|s| s.t).collect();
    let smoothed = detrend_smooth(&values, cfg.smoothing_half_window);
    let detection = detect_peaks(
        &smoothed,
        &times,
        cfg.primary_threshold,
        cfg.fallback_threshold,
    );
    let bpm = estimate_rate(&detection.peaks, cfg.min_bpm, cfg.max_bpm);
    PulseAnalysis {
        sample_count: samples.len(),
        detection: Some(detection),
        bpm,
    }
}

/// Pulse estimate (bpm) from a snapshot, or `None` when there is not enough
/// data or the rate is implausible.
pub fn estimate_pulse(samples: &[TimedSample], cfg: &PulseConfig) -> Option<f64> {
    analyze_samples(samples, cfg).bpm
}

/// Session-owned green-channel buffer plus the pipeline that reads it.
#[derive(Debug, Clone)]
pub struct PulseEstimator {
    cfg: PulseConfig,
    buffer: SignalBuffer,
}

impl PulseEstimator {
    pub fn new(cfg: PulseConfig) -> Self {
        Self {
            buffer: SignalBuffer::new(cfg.window_ms),
            cfg,
        }
    }

    pub fn push(&mut self, sample: TimedSample) {
        self.buffer.append(sample);
    }

    pub fn buffer(&self) -> &SignalBuffer {
        &self.buffer
    }

    pub fn estimate(&self) -> Option<f64> {
        estimate_pulse(&self.buffer.snapshot(), &self.cfg)
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}
