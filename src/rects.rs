//! Rectangle drawing and region copying on frames.

use crate::camera::Frame;
use crate::tracker::FaceRegion;

pub const WHITE: [u8; 3] = [255, 255, 255];

/// Bytes to write for `rgb` in the frame's layout.
fn color_bytes(frame: &Frame, rgb: [u8; 3]) -> Vec<u8> {
    if frame.is_gray() {
        let [r, g, b] = rgb.map(u32::from);
        vec![((299 * r + 587 * g + 114 * b) / 1000) as u8]
    } else {
        rgb.to_vec()
    }
}

/// Draw a one-pixel outline of `rect`, clipped to the frame.
pub fn outline_rect(frame: &mut Frame, rect: FaceRegion, rgb: [u8; 3]) {
    let r = rect.clipped(frame.width, frame.height);
    if r.is_empty() {
        return;
    }
    let color = color_bytes(frame, rgb);
    let (x1, y1) = (r.x + r.w - 1, r.y + r.h - 1);

    for x in r.x..=x1 {
        frame.pixel_mut(x, r.y).copy_from_slice(&color);
        frame.pixel_mut(x, y1).copy_from_slice(&color);
    }
    for y in r.y..=y1 {
        frame.pixel_mut(r.x, y).copy_from_slice(&color);
        frame.pixel_mut(x1, y).copy_from_slice(&color);
    }
}

/// Copy the `src_rect` region of `src` into `dst_rect` of `dst`, resizing
/// with nearest-neighbour sampling.
///
/// Regions are clipped to their frames. Frames of different layouts are
/// left untouched.
pub fn copy_rect(src: &Frame, dst: &mut Frame, src_rect: FaceRegion, dst_rect: FaceRegion) {
    if src.format != dst.format {
        return;
    }
    let s = src_rect.clipped(src.width, src.height);
    let d = dst_rect.clipped(dst.width, dst.height);
    if s.is_empty() || d.is_empty() {
        return;
    }

    for dy in 0..d.h {
        let sy = s.y + (dy as u64 * s.h as u64 / d.h as u64) as u32;
        for dx in 0..d.w {
            let sx = s.x + (dx as u64 * s.w as u64 / d.w as u64) as u32;
            let i = src.offset(sx, sy);
            let px = &src.data[i..i + src.bytes_per_pixel()];
            dst.pixel_mut(d.x + dx, d.y + dy).copy_from_slice(px);
        }
    }
}

/// Rotate the contents of `rects`: region i receives region i-1 and the
/// first receives the last. Fewer than two regions leave the frame as is.
pub fn swap_rects(frame: &mut Frame, rects: &[FaceRegion]) {
    let n = rects.len();
    if n < 2 {
        return;
    }
    let src = frame.clone();
    for i in 0..n {
        copy_rect(&src, frame, rects[(i + n - 1) % n], rects[i]);
    }
}
