//! Face tracking interface.
//!
//! Detection itself is pluggable. The application only needs the regions a
//! tracker reports for the latest frame.

use crate::camera::Frame;
use crate::rects::{outline_rect, WHITE};

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl FaceRegion {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// The part of the region inside a `width` x `height` frame.
    pub fn clipped(&self, width: u32, height: u32) -> FaceRegion {
        let x = self.x.min(width);
        let y = self.y.min(height);
        FaceRegion {
            x,
            y,
            w: self.w.min(width - x),
            h: self.h.min(height - y),
        }
    }
}

pub trait FaceTracker {
    /// Look for faces in `frame`, replacing the previous result.
    fn update(&mut self, frame: &Frame);

    fn faces(&self) -> &[FaceRegion];

    /// Outline every tracked face in white.
    fn draw_debug_rects(&self, frame: &mut Frame) {
        for face in self.faces() {
            outline_rect(frame, *face, WHITE);
        }
    }
}

/// A tracker that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaceTracker;

impl FaceTracker for NoFaceTracker {
    fn update(&mut self, _frame: &Frame) {}

    fn faces(&self) -> &[FaceRegion] {
        &[]
    }
}
