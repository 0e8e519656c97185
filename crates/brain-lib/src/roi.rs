//! Forehead region placement and green-channel sampling.

use serde::{Deserialize, Serialize};

/// A captured RGBA frame (row-major, 4 bytes per pixel).
#[derive(Debug, Clone)]
pub struct Frame {
    pub timestamp_ms: f64,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Frame {
    /// A frame filled with one colour.
    pub fn filled(timestamp_ms: f64, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Self {
            timestamp_ms,
            width,
            height,
            rgba: data,
        }
    }

    fn is_well_formed(&self) -> bool {
        self.rgba.len() >= self.width as usize * self.height as usize * 4
    }
}

/// Face bounding box in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FaceBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Integer pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

const MIN_ROI_SIDE: f64 = 6.0;

impl Roi {
    /// Forehead strip: centred half of the box width, 12% of its height,
    /// starting 5% below the top edge. Never smaller than 6x6 pixels.
    pub fn forehead(face: &FaceBox) -> Self {
        let x = (face.x + face.width * 0.25).floor().max(0.0);
        let y = (face.y + face.height * 0.05).floor().max(0.0);
        let width = (face.width * 0.5).floor().max(MIN_ROI_SIDE);
        let height = (face.height * 0.12).floor().max(MIN_ROI_SIDE);
        Self {
            x: x as u32,
            y: y as u32,
            width: width as u32,
            height: height as u32,
        }
    }

    /// Intersection with a `width x height` frame, or `None` if it is empty.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Roi> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(Roi {
            x: self.x,
            y: self.y,
            width: w,
            height: h,
        })
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Mean green level (0-255) of the ROI pixels inside the frame.
///
/// `None` means there was nothing to sample; callers must skip the sample
/// rather than record a zero.
pub fn mean_green(frame: &Frame, roi: &Roi) -> Option<f64> {
    if !frame.is_well_formed() {
        return None;
    }
    let roi = roi.clamp_to(frame.width, frame.height)?;
    let stride = frame.width as usize * 4;
    let mut sum = 0u64;
    for row in roi.y..roi.y + roi.height {
        let start = row as usize * stride + roi.x as usize * 4;
        let end = start + roi.width as usize * 4;
        sum += frame.rgba[start..end]
            .chunks_exact(4)
            .map(|px| px[1] as u64)
            .sum::<u64>();
    }
    Some(sum as f64 / roi.area() as f64)
}
