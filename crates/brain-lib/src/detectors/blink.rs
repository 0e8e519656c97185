use crate::{config::BlinkConfig, signal::EventLog};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Eye aspect ratio of a six-point eye contour.
///
/// Points follow the 68-landmark order: `p0`/`p3` are the corners, `p1`/`p2`
/// the upper lid and `p5`/`p4` the lower lid. Returns `None` for a
/// zero-width eye.
pub fn eye_aspect_ratio(eye: &[Point; 6]) -> Option<f64> {
    let vertical_a = eye[1].distance(&eye[5]);
    let vertical_b = eye[2].distance(&eye[4]);
    let horizontal = eye[0].distance(&eye[3]);
    if horizontal <= f64::EPSILON {
        return None;
    }
    Some((vertical_a + vertical_b) / (2.0 * horizontal))
}

/// Mean ratio over whichever eyes produced a value.
pub fn mean_eye_aspect_ratio(left: Option<&[Point; 6]>, right: Option<&[Point; 6]>) -> Option<f64> {
    let ratios: Vec<f64> = [left, right]
        .into_iter()
        .flatten()
        .filter_map(eye_aspect_ratio)
        .collect();
    if ratios.is_empty() {
        return None;
    }
    Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
}

/// Counts blinks as debounced falling-edge crossings of an eye-openness ratio.
#[derive(Debug, Clone)]
pub struct BlinkEdgeDetector {
    cfg: BlinkConfig,
    last_value: Option<f64>,
    events: EventLog,
}

impl BlinkEdgeDetector {
    pub fn new(cfg: BlinkConfig) -> Self {
        Self {
            cfg,
            last_value: None,
            events: EventLog::new(cfg.window_ms),
        }
    }

    /// Feed one frame's ratio. Returns `true` when a blink was recorded.
    pub fn update(&mut self, t: f64, ratio: f64) -> bool {
        let falling = matches!(self.last_value, Some(prev) if prev >= self.cfg.threshold)
            && ratio < self.cfg.threshold;
        self.last_value = Some(ratio);
        if !falling {
            return false;
        }
        let debounced = self
            .events
            .last()
            .map_or(true, |last| t - last >= self.cfg.debounce_ms);
        debounced && self.events.record(t)
    }

    /// Raw count of blinks in the trailing window ending at `now`.
    pub fn rate_per_minute(&mut self, now: f64) -> u32 {
        self.events.count_in_window(now) as u32
    }

    pub fn events(&self) -> &[f64] {
        self.events.times()
    }

    pub fn reset(&mut self) {
        self.last_value = None;
        self.events.clear();
    }
}
