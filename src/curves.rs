//! Control-point curves and the 256-entry lookup tables built from them.
//!
//! A curve is fitted once, composed with other curves if needed, and then
//! tabulated at every 8-bit input. Applying a table is a single indexed load
//! per byte, so composition always happens before tabulation.

use thiserror::Error;

/// Number of entries in an 8-bit lookup table.
pub const TABLE_LEN: usize = 256;

/// Errors raised while fitting a curve.
#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    #[error("control point inputs must be strictly increasing (point {index}: {x} after {prev})")]
    NotIncreasing { index: usize, prev: f64, x: f64 },

    #[error("control points must be finite numbers")]
    NonFinite,
}

/// An interpolating function through a set of control points.
#[derive(Debug, Clone)]
pub enum Curve {
    /// Straight segments between neighbouring points (2 or 3 points)
    Linear { xs: Vec<f64>, ys: Vec<f64> },
    /// Not-a-knot cubic spline (4 or more points); `m` holds the second
    /// derivative at each knot
    Spline { xs: Vec<f64>, ys: Vec<f64>, m: Vec<f64> },
    /// `outer(inner(x))`
    Composite { outer: Box<Curve>, inner: Box<Curve> },
}

impl Curve {
    /// Fit a curve through `points`, given as `(input, output)` pairs.
    ///
    /// Fewer than two points is not an error: there is simply no curve, and
    /// `Ok(None)` is returned. Inputs must be strictly increasing.
    pub fn from_points<P>(points: &[(P, P)]) -> Result<Option<Curve>, CurveError>
    where
        P: Into<f64> + Copy,
    {
        if points.len() < 2 {
            return Ok(None);
        }

        let xs: Vec<f64> = points.iter().map(|p| p.0.into()).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1.into()).collect();

        if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return Err(CurveError::NonFinite);
        }
        for (index, pair) in xs.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(CurveError::NotIncreasing {
                    index: index + 1,
                    prev: pair[0],
                    x: pair[1],
                });
            }
        }

        if points.len() < 4 {
            Ok(Some(Curve::Linear { xs, ys }))
        } else {
            let m = not_a_knot_second_derivatives(&xs, &ys);
            Ok(Some(Curve::Spline { xs, ys, m }))
        }
    }

    /// Compose two optional curves into `outer(inner(x))`.
    ///
    /// Both sides are needed; if either is missing there is no curve.
    pub fn compose(outer: Option<Curve>, inner: Option<Curve>) -> Option<Curve> {
        match (outer, inner) {
            (Some(outer), Some(inner)) => Some(Curve::Composite {
                outer: Box::new(outer),
                inner: Box::new(inner),
            }),
            _ => None,
        }
    }

    /// Evaluate the curve at `x`.
    ///
    /// Returns `None` outside the span of the control points.
    pub fn eval(&self, x: f64) -> Option<f64> {
        match self {
            Curve::Linear { xs, ys } => {
                let i = segment(xs, x)?;
                let t = (ys[i + 1] - ys[i]) * (x - xs[i]);
                Some(ys[i] + t / (xs[i + 1] - xs[i]))
            }
            Curve::Spline { xs, ys, m } => {
                let i = segment(xs, x)?;
                let h = xs[i + 1] - xs[i];
                let a = xs[i + 1] - x;
                let b = x - xs[i];
                // exact at the knots
                if b == 0.0 {
                    return Some(ys[i]);
                }
                if a == 0.0 {
                    return Some(ys[i + 1]);
                }
                Some(
                    m[i] * a * a * a / (6.0 * h)
                        + m[i + 1] * b * b * b / (6.0 * h)
                        + (ys[i] / h - m[i] * h / 6.0) * a
                        + (ys[i + 1] / h - m[i + 1] * h / 6.0) * b,
                )
            }
            Curve::Composite { outer, inner } => inner.eval(x).and_then(|y| outer.eval(y)),
        }
    }
}

/// Index of the segment `[xs[i], xs[i+1]]` containing `x`.
fn segment(xs: &[f64], x: f64) -> Option<usize> {
    let first = *xs.first()?;
    let last = *xs.last()?;
    if !(first..=last).contains(&x) {
        return None;
    }
    let upper = xs.partition_point(|&v| v <= x);
    Some(upper.saturating_sub(1).min(xs.len() - 2))
}

/// Solve for the knot second derivatives of a not-a-knot cubic spline.
///
/// The third derivative is continuous across the second and the
/// second-to-last knots; interior knots carry the usual C2 equations.
fn not_a_knot_second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let slope: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

    let mut a = vec![vec![0.0; n]; n];
    let mut rhs = vec![0.0; n];

    a[0][0] = h[1];
    a[0][1] = -(h[0] + h[1]);
    a[0][2] = h[0];

    for i in 1..n - 1 {
        a[i][i - 1] = h[i - 1];
        a[i][i] = 2.0 * (h[i - 1] + h[i]);
        a[i][i + 1] = h[i];
        rhs[i] = 6.0 * (slope[i] - slope[i - 1]);
    }

    a[n - 1][n - 3] = h[n - 2];
    a[n - 1][n - 2] = -(h[n - 3] + h[n - 2]);
    a[n - 1][n - 1] = h[n - 3];

    solve_dense(a, rhs)
}

/// Gaussian elimination with partial pivoting. The systems here are tiny.
fn solve_dense(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r, &s| a[r][col].abs().total_cmp(&a[s][col].abs()))
            .unwrap_or(col);
        a.swap(col, pivot);
        b.swap(col, pivot);

        let p = a[col][col];
        if p.abs() < f64::EPSILON {
            continue;
        }
        for row in col + 1..n {
            let factor = a[row][col] / p;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        let p = a[row][row];
        x[row] = if p.abs() < f64::EPSILON {
            0.0
        } else {
            (b[row] - tail) / p
        };
    }
    x
}

/// A dense 8-bit remapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable([u8; TABLE_LEN]);

impl LookupTable {
    /// The table that maps every value to itself.
    pub fn identity() -> Self {
        let mut table = [0u8; TABLE_LEN];
        for (i, v) in table.iter_mut().enumerate() {
            *v = i as u8;
        }
        LookupTable(table)
    }

    /// Tabulate `curve` at every integer input, clamped into `[0, 255]`.
    ///
    /// Inputs outside the curve's span tabulate as 0. Fractional outputs are
    /// truncated.
    pub fn from_curve(curve: &Curve) -> Self {
        let mut table = [0u8; TABLE_LEN];
        for (i, v) in table.iter_mut().enumerate() {
            let y = curve.eval(i as f64).unwrap_or(0.0);
            *v = y.clamp(0.0, (TABLE_LEN - 1) as f64) as u8;
        }
        LookupTable(table)
    }

    /// Fit and tabulate in one step. `Ok(None)` for fewer than two points.
    pub fn from_points<P>(points: &[(P, P)]) -> Result<Option<Self>, CurveError>
    where
        P: Into<f64> + Copy,
    {
        Ok(Curve::from_points(points)?.map(|c| LookupTable::from_curve(&c)))
    }

    #[inline]
    pub fn get(&self, value: u8) -> u8 {
        self.0[value as usize]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Map `src` through the table into `dst`, element by element.
    ///
    /// Only `min(src.len(), dst.len())` elements are written.
    pub fn apply(&self, src: &[u8], dst: &mut [u8]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = self.0[s as usize];
        }
    }

    /// Map every byte of `buf` through the table.
    pub fn apply_in_place(&self, buf: &mut [u8]) {
        for v in buf.iter_mut() {
            *v = self.0[*v as usize];
        }
    }

    /// Map one channel of interleaved pixel data.
    ///
    /// `channel` is the byte offset within each pixel, `stride` the bytes per pixel.
    pub fn apply_channel(&self, data: &mut [u8], channel: usize, stride: usize) {
        for px in data.chunks_exact_mut(stride) {
            px[channel] = self.0[px[channel] as usize];
        }
    }
}
