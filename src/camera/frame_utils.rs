//! Frame conversion and transformation utilities.

use nokhwa::pixel_format::RgbFormat;
use std::time::Instant;

use super::types::{Frame, FrameFormat};

/// Decode a nokhwa buffer into an RGB Frame.
///
/// Handles the camera's native formats (MJPEG, YUYV, NV12, etc.) through
/// nokhwa's `decode_image`. Returns `None` if the data cannot be decoded.
pub fn convert_to_rgb(buffer: &nokhwa::Buffer) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();

    Some(Frame {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
        format: FrameFormat::Rgb,
        timestamp: Instant::now(),
    })
}

/// Mirror a frame horizontally (flip left-right) in place.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let bpp = frame.bytes_per_pixel();

    for y in 0..height {
        let row_start = y * width * bpp;
        let row = &mut frame.data[row_start..row_start + width * bpp];

        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}

/// Intensity plane of a frame using the ITU-R BT.601 weights.
///
/// Integer math, coefficients scaled by 1000 (299 + 587 + 114 = 1000).
/// Gray frames are returned as a copy.
pub fn to_grayscale(frame: &Frame) -> Vec<u8> {
    if frame.is_gray() {
        return frame.data.clone();
    }

    let mut gray = Vec::with_capacity(frame.pixel_count());
    for rgb in frame.data.chunks_exact(3) {
        let r = rgb[0] as u32;
        let g = rgb[1] as u32;
        let b = rgb[2] as u32;
        gray.push(((299 * r + 587 * g + 114 * b) / 1000) as u8);
    }
    gray
}
