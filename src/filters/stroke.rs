//! Edge stroking: darken the frame along detected edges, like ink lines.

use image::{GrayImage, RgbImage};
use imageproc::filter::median_filter;
use thiserror::Error;

use crate::camera::{to_grayscale, Frame, FrameFormat};

use super::convolution::reflect_101;

/// Largest aperture accepted for either stage.
pub const MAX_KSIZE: usize = 31;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("{stage} kernel size must be odd and at most 31, got {ksize}")]
    InvalidKernelSize { stage: &'static str, ksize: usize },
}

/// Median-blur, find edges with a Laplacian, then scale every channel of the
/// original frame by the inverse edge strength.
#[derive(Debug, Clone)]
pub struct StrokeEdges {
    blur_ksize: usize,
    edge_ksize: usize,
    laplacian: Vec<i32>,
}

impl StrokeEdges {
    pub const DEFAULT_BLUR_KSIZE: usize = 7;
    pub const DEFAULT_EDGE_KSIZE: usize = 5;

    /// A `blur_ksize` below 3 disables the median blur.
    pub fn new(blur_ksize: usize, edge_ksize: usize) -> Result<Self, FilterError> {
        if blur_ksize >= 3 && (blur_ksize % 2 == 0 || blur_ksize > MAX_KSIZE) {
            return Err(FilterError::InvalidKernelSize {
                stage: "blur",
                ksize: blur_ksize,
            });
        }
        if edge_ksize % 2 == 0 || edge_ksize > MAX_KSIZE {
            return Err(FilterError::InvalidKernelSize {
                stage: "edge",
                ksize: edge_ksize,
            });
        }
        Ok(StrokeEdges {
            blur_ksize,
            edge_ksize,
            laplacian: laplacian_kernel(edge_ksize),
        })
    }

    pub fn blur_ksize(&self) -> usize {
        self.blur_ksize
    }

    pub fn edge_ksize(&self) -> usize {
        self.edge_ksize
    }

    pub fn apply(&self, frame: &mut Frame) {
        if frame.pixel_count() == 0 {
            return;
        }

        let gray = if self.blur_ksize >= 3 {
            let mut blurred = frame.clone();
            median_blur(&mut blurred, self.blur_ksize);
            to_grayscale(&blurred)
        } else {
            to_grayscale(frame)
        };

        let edges = self.laplacian(&gray, frame.width as usize, frame.height as usize);

        let bpp = frame.bytes_per_pixel();
        for (px, &edge) in frame.data.chunks_exact_mut(bpp).zip(edges.iter()) {
            for v in px.iter_mut() {
                *v = darken(*v, edge);
            }
        }
    }

    /// Second-derivative response of a single-channel plane, saturated to u8.
    fn laplacian(&self, plane: &[u8], width: usize, height: usize) -> Vec<u8> {
        // size 1 still uses a 3x3 stencil
        let k = self.edge_ksize.max(3);
        let anchor = (k / 2) as isize;
        let mut out = vec![0u8; plane.len()];

        for y in 0..height {
            for x in 0..width {
                let mut sum = 0i32;
                for ky in 0..k {
                    let sy = reflect_101(y as isize + ky as isize - anchor, height);
                    for kx in 0..k {
                        let w = self.laplacian[ky * k + kx];
                        if w == 0 {
                            continue;
                        }
                        let sx = reflect_101(x as isize + kx as isize - anchor, width);
                        sum += w * plane[sy * width + sx] as i32;
                    }
                }
                out[y * width + x] = sum.clamp(0, 255) as u8;
            }
        }
        out
    }
}

impl Default for StrokeEdges {
    fn default() -> Self {
        let ksize = Self::DEFAULT_EDGE_KSIZE;
        StrokeEdges {
            blur_ksize: Self::DEFAULT_BLUR_KSIZE,
            edge_ksize: ksize,
            laplacian: laplacian_kernel(ksize),
        }
    }
}

/// Row `n` of Pascal's triangle.
fn binomial(n: usize) -> Vec<i32> {
    let mut row = vec![1i32];
    for _ in 0..n {
        let mut next = vec![1i32; row.len() + 1];
        for i in 1..row.len() {
            next[i] = row[i - 1] + row[i];
        }
        row = next;
    }
    row
}

fn convolve_1d(a: &[i32], b: &[i32]) -> Vec<i32> {
    let mut out = vec![0i32; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Square Laplacian aperture of odd size `ksize`, row-major.
///
/// Size 1 is the 4-neighbour stencil. Larger sizes sum the separable second
/// derivatives in x and y, each smoothed by a binomial in the other axis.
fn laplacian_kernel(ksize: usize) -> Vec<i32> {
    if ksize <= 1 {
        return vec![0, 1, 0, 1, -4, 1, 0, 1, 0];
    }
    let smooth = binomial(ksize - 1);
    let deriv = convolve_1d(&binomial(ksize - 3), &[1, -2, 1]);

    let mut kernel = Vec::with_capacity(ksize * ksize);
    for y in 0..ksize {
        for x in 0..ksize {
            kernel.push(smooth[y] * deriv[x] + deriv[y] * smooth[x]);
        }
    }
    kernel
}

/// Scale `value` by the inverse edge strength, truncating.
fn darken(value: u8, edge: u8) -> u8 {
    let alpha = (1.0 / 255.0) * f64::from(255 - edge);
    (f64::from(value) * alpha) as u8
}

/// Per-channel median over a `ksize` square window, edges replicated.
pub fn median_blur(frame: &mut Frame, ksize: usize) {
    if ksize < 3 || frame.pixel_count() == 0 {
        return;
    }
    let radius = (ksize / 2) as u32;
    let (width, height) = (frame.width, frame.height);
    let blurred = match frame.format {
        FrameFormat::Rgb => RgbImage::from_raw(width, height, frame.data.clone())
            .map(|img| median_filter(&img, radius, radius).into_raw()),
        FrameFormat::Gray => GrayImage::from_raw(width, height, frame.data.clone())
            .map(|img| median_filter(&img, radius, radius).into_raw()),
    };
    if let Some(data) = blurred {
        frame.data = data;
    }
}
