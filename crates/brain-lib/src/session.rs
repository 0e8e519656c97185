//! One analysis session: owns the pulse and blink state between start and stop.

use crate::{
    config::AnalyzerConfig,
    detectors::{
        blink::{mean_eye_aspect_ratio, BlinkEdgeDetector, Point},
        pulse::PulseEstimator,
    },
    metrics::heuristics::{focus_percent, stress_index, Expressions},
    roi::{mean_green, FaceBox, Frame, Roi},
    signal::TimedSample,
};
use log::{info, trace};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Supplies the current camera frame, or `None` when none is available.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Face detector collaborator. `None` means no face in this frame.
pub trait FaceDetector {
    fn detect(&mut self, frame: &Frame) -> Option<FaceObservation>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    pub bbox: FaceBox,
    pub left_eye: Option<[Point; 6]>,
    pub right_eye: Option<[Point; 6]>,
    pub expressions: Option<Expressions>,
}

/// Scalars extracted for one tick. Missing values are skipped, never zeroed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp_ms: f64,
    pub green: Option<f64>,
    pub eye_ratio: Option<f64>,
    pub face: Option<FaceBox>,
    pub frame_size: Option<(u32, u32)>,
    pub expressions: Option<Expressions>,
}

impl Observation {
    pub fn at(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            ..Self::default()
        }
    }
}

/// Values handed to the consumer after each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readout {
    pub timestamp_ms: f64,
    pub pulse_bpm: Option<u32>,
    pub blink_rate_per_minute: u32,
    pub face_present: bool,
    pub focus_percent: Option<u8>,
    pub stress_index: Option<u8>,
}

/// Shared "still running" flag. Cloning shares the flag.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    fn new_running() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn resume(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct SessionState {
    pulse: PulseEstimator,
    blink: BlinkEdgeDetector,
}

impl SessionState {
    fn new(cfg: &AnalyzerConfig) -> Self {
        Self {
            pulse: PulseEstimator::new(cfg.pulse),
            blink: BlinkEdgeDetector::new(cfg.blink),
        }
    }
}

#[derive(Debug)]
pub struct AnalysisSession {
    cfg: AnalyzerConfig,
    running: StopHandle,
    state: Option<SessionState>,
}

impl AnalysisSession {
    /// Start a session with empty buffers.
    pub fn new(cfg: AnalyzerConfig) -> Self {
        info!(
            "analysis session started (pulse window {} ms, blink threshold {})",
            cfg.pulse.window_ms, cfg.blink.threshold
        );
        Self {
            state: Some(SessionState::new(&cfg)),
            cfg,
            running: StopHandle::new_running(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.running.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_running()
    }

    /// Stop and discard all buffered state. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.running.stop();
        if self.state.take().is_some() {
            info!("analysis session stopped");
        }
    }

    /// Start again with fresh buffers.
    pub fn restart(&mut self) {
        self.state = Some(SessionState::new(&self.cfg));
        self.running.resume();
        info!("analysis session restarted");
    }

    /// Buffered state, hidden as soon as a stop is requested.
    fn live_state(&self) -> Option<&SessionState> {
        self.state.as_ref().filter(|_| self.is_running())
    }

    /// Number of green samples currently buffered.
    pub fn pulse_sample_count(&self) -> usize {
        self.live_state().map_or(0, |s| s.pulse.buffer().len())
    }

    pub fn blink_events(&self) -> &[f64] {
        self.live_state()
            .map(|s| s.blink.events())
            .unwrap_or(&[])
    }

    /// Run one pipeline pass over already-extracted values.
    pub fn ingest(&mut self, obs: &Observation) -> Option<Readout> {
        if !self.is_running() {
            self.stop();
            return None;
        }
        let state = self.state.as_mut()?;
        let t = obs.timestamp_ms;

        if let Some(green) = obs.green {
            state.pulse.push(TimedSample::new(t, green));
        }
        if let Some(ratio) = obs.eye_ratio {
            state.blink.update(t, ratio);
        }

        let pulse_bpm = state.pulse.estimate().map(|bpm| bpm.round() as u32);
        let blink_rate_per_minute = state.blink.rate_per_minute(t);
        let focus = match (obs.face.as_ref(), obs.frame_size) {
            (Some(face), Some((w, h))) => focus_percent(face, w, h),
            _ => None,
        };
        let stress = obs.face.as_ref().map(|_| {
            let expressions = obs.expressions.unwrap_or_default();
            stress_index(&expressions, pulse_bpm, focus)
        });

        Some(Readout {
            timestamp_ms: t,
            pulse_bpm,
            blink_rate_per_minute,
            face_present: obs.face.is_some(),
            focus_percent: focus,
            stress_index: stress,
        })
    }

    /// Pull a frame, run the detector and feed the extracted values.
    ///
    /// Returns `None` when the session is stopped (including a stop requested
    /// while the detector ran) or no frame was available.
    pub fn tick(
        &mut self,
        source: &mut dyn FrameSource,
        detector: &mut dyn FaceDetector,
    ) -> Option<Readout> {
        if !self.is_running() {
            self.stop();
            return None;
        }
        let Some(frame) = source.next_frame() else {
            trace!("no frame available, skipping tick");
            return None;
        };
        let face = detector.detect(&frame);
        if !self.is_running() {
            trace!("stop requested during detection, dropping tick");
            self.stop();
            return None;
        }

        let mut obs = Observation::at(frame.timestamp_ms);
        obs.frame_size = Some((frame.width, frame.height));
        if let Some(face) = face {
            let roi = Roi::forehead(&face.bbox);
            obs.green = mean_green(&frame, &roi);
            if obs.green.is_none() {
                trace!("forehead ROI {:?} outside frame", roi);
            }
            obs.eye_ratio = mean_eye_aspect_ratio(face.left_eye.as_ref(), face.right_eye.as_ref());
            obs.face = Some(face.bbox);
            obs.expressions = face.expressions;
        }
        self.ingest(&obs)
    }
}
