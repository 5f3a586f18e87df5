//! Per-channel recoloring recipes that emulate limited color palettes.
//!
//! All recipes only rewrite the blue channel and leave grayscale frames
//! alone. Frames are stored R, G, B.

use crate::camera::Frame;

/// Red/cyan: blue and green both become their average, red is kept.
///
/// Halves round to even.
pub fn recolor_rc(frame: &mut Frame) {
    if frame.is_gray() {
        return;
    }
    for px in frame.data.chunks_exact_mut(3) {
        let avg = half_to_even_mean(px[1], px[2]);
        px[1] = avg;
        px[2] = avg;
    }
}

fn half_to_even_mean(a: u8, b: u8) -> u8 {
    let sum = a as u16 + b as u16;
    let half = sum / 2;
    (half + (sum & half & 1)) as u8
}

/// Red/green/value: blues are desaturated to the darkest channel.
pub fn recolor_rgv(frame: &mut Frame) {
    if frame.is_gray() {
        return;
    }
    for px in frame.data.chunks_exact_mut(3) {
        px[2] = px[0].min(px[1]).min(px[2]);
    }
}

/// Cyan/magenta/value: blue becomes the brightest channel.
pub fn recolor_cmv(frame: &mut Frame) {
    if frame.is_gray() {
        return;
    }
    for px in frame.data.chunks_exact_mut(3) {
        px[2] = px[0].max(px[1]).max(px[2]);
    }
}
