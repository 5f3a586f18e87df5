//! Fixed 2D kernels applied by correlation.

use crate::camera::Frame;

/// A small correlation kernel, anchored at its centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    width: usize,
    height: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Build a kernel from row-major weights.
    ///
    /// Returns `None` unless both dimensions are odd and `weights` has
    /// exactly `width * height` entries.
    pub fn new(width: usize, height: usize, weights: Vec<f32>) -> Option<Self> {
        if width % 2 == 0 || height % 2 == 0 || weights.len() != width * height {
            return None;
        }
        Some(Kernel {
            width,
            height,
            weights,
        })
    }

    fn square3(weights: [f32; 9]) -> Self {
        Kernel {
            width: 3,
            height: 3,
            weights: weights.to_vec(),
        }
    }

    /// Turns edges white and everything else black.
    pub fn find_edges() -> Self {
        Self::square3([-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0])
    }

    pub fn sharpen() -> Self {
        Self::square3([-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0])
    }

    /// 5x5 box blur.
    pub fn blur() -> Self {
        Kernel {
            width: 5,
            height: 5,
            weights: vec![0.04; 25],
        }
    }

    pub fn emboss() -> Self {
        Self::square3([-2.0, -1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 1.0, 2.0])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Correlate every channel of `frame` with this kernel, in place.
    ///
    /// Borders are reflected without repeating the edge pixel
    /// (`gfedcb|abcdefgh|gfedcba`). Results are rounded and saturated.
    pub fn apply(&self, frame: &mut Frame) {
        let width = frame.width as usize;
        let height = frame.height as usize;
        if width == 0 || height == 0 {
            return;
        }
        let bpp = frame.bytes_per_pixel();
        let src = frame.data.clone();
        let ax = (self.width / 2) as isize;
        let ay = (self.height / 2) as isize;

        for y in 0..height {
            for x in 0..width {
                for c in 0..bpp {
                    let mut sum = 0.0f32;
                    for ky in 0..self.height {
                        let sy = reflect_101(y as isize + ky as isize - ay, height);
                        let row = sy * width;
                        for kx in 0..self.width {
                            let w = self.weights[ky * self.width + kx];
                            if w == 0.0 {
                                continue;
                            }
                            let sx = reflect_101(x as isize + kx as isize - ax, width);
                            sum += w * src[(row + sx) * bpp + c] as f32;
                        }
                    }
                    frame.data[(y * width + x) * bpp + c] = sum.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}

/// Map an out-of-range coordinate back inside `[0, len)` by mirroring
/// around the edge pixels.
pub(crate) fn reflect_101(mut i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let n = len as isize;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i as usize;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(v: u8) -> Frame {
        Frame::filled(6, 5, [v, v / 2, 255 - v])
    }

    #[test]
    fn test_kernel_new_validates_shape() {
        assert!(Kernel::new(3, 3, vec![0.0; 9]).is_some());
        assert!(Kernel::new(1, 5, vec![0.0; 5]).is_some());
        assert!(Kernel::new(2, 3, vec![0.0; 6]).is_none());
        assert!(Kernel::new(3, 3, vec![0.0; 8]).is_none());
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 5), 3);
        assert_eq!(reflect_101(-3, 2), 1);
        assert_eq!(reflect_101(-7, 1), 0);
    }

    #[test]
    fn test_weight_sum_one_kernels_keep_uniform_frames() {
        for kernel in [Kernel::sharpen(), Kernel::blur(), Kernel::emboss()] {
            let mut frame = uniform(120);
            let before = frame.data.clone();
            kernel.apply(&mut frame);
            assert_eq!(frame.data, before, "kernel {:?}", kernel);
        }
    }

    #[test]
    fn test_find_edges_blacks_out_flat_regions() {
        let mut frame = uniform(200);
        Kernel::find_edges().apply(&mut frame);
        assert!(frame.data.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_find_edges_highlights_isolated_pixel() {
        let mut frame = Frame::gray(5, 5, vec![0; 25]).unwrap();
        frame.pixel_mut(2, 2)[0] = 100;
        Kernel::find_edges().apply(&mut frame);
        assert_eq!(frame.pixel(2, 2), &[255]);
        // Neighbours go negative and saturate to zero.
        assert_eq!(frame.pixel(1, 2), &[0]);
        assert_eq!(frame.pixel(0, 0), &[0]);
    }

    #[test]
    fn test_blur_spreads_a_bright_pixel() {
        let mut frame = Frame::gray(9, 9, vec![0; 81]).unwrap();
        frame.pixel_mut(4, 4)[0] = 250;
        Kernel::blur().apply(&mut frame);
        // 250 * 0.04 = 10 across the 5x5 neighbourhood
        assert_eq!(frame.pixel(4, 4), &[10]);
        assert_eq!(frame.pixel(2, 6), &[10]);
        assert_eq!(frame.pixel(1, 4), &[0]);
    }

    #[test]
    fn test_empty_frame_is_untouched() {
        let mut frame = Frame::rgb(0, 0, vec![]).unwrap();
        Kernel::sharpen().apply(&mut frame);
        assert!(frame.data.is_empty());
    }
}
