use crate::roi::FaceBox;
use serde::{Deserialize, Serialize};

/// Expression probabilities consumed by the stress heuristic (each in `0..=1`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Expressions {
    pub angry: f64,
    pub fearful: f64,
}

/// How centred the face is in the frame, in percent.
pub fn focus_percent(face: &FaceBox, frame_width: u32, frame_height: u32) -> Option<u8> {
    if frame_width == 0 || frame_height == 0 {
        return None;
    }
    let half_w = frame_width as f64 / 2.0;
    let half_h = frame_height as f64 / 2.0;
    let (cx, cy) = face.center();
    let dx = (cx - half_w).abs() / half_w;
    let dy = (cy - half_h).abs() / half_h;
    let score = ((1.0 - dx.max(dy)) * 100.0).round();
    Some(score.clamp(0.0, 100.0) as u8)
}

/// Heuristic 0-100 stress score from expressions, pulse and focus.
pub fn stress_index(expressions: &Expressions, pulse_bpm: Option<u32>, focus: Option<u8>) -> u8 {
    let mut stress = expressions.angry * 60.0 + expressions.fearful * 40.0;
    if pulse_bpm.map_or(false, |bpm| bpm > 95) {
        stress += 15.0;
    }
    if focus.map_or(false, |f| f < 40) {
        stress += 15.0;
    }
    stress.round().clamp(0.0, 100.0) as u8
}
