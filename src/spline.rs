//! Curve fitting through sparse control points.
//!
//! Every coordinate axis gets its own natural cubic spline over the uniform
//! parameter `t = 0, 1, .., N - 1` (one knot per control point). The dense
//! curve evaluates all axes at evenly spaced parameters, so its samples
//! follow the control points in insertion order and start and end exactly on
//! the first and last control point.

use crate::error::{Result, SamplingError};

use glam::DVec2;
use tracing::{debug, warn};

/// Ordered waypoints picked by the host, duplicates allowed
#[derive(Clone, Debug, PartialEq)]
pub struct ControlPoints<const K: usize> {
    points: Vec<[f64; K]>,
}

impl<const K: usize> Default for ControlPoints<K> {
    fn default() -> Self {
        Self { points: Vec::new() }
    }
}

impl<const K: usize> ControlPoints<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: [f64; K]) {
        self.points.push(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether there are enough points for [`fit`] to interpolate
    pub fn can_interpolate(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn as_slice(&self) -> &[[f64; K]] {
        &self.points
    }
}

impl<const K: usize> From<Vec<[f64; K]>> for ControlPoints<K> {
    fn from(points: Vec<[f64; K]>) -> Self {
        Self { points }
    }
}

/// Densely sampled curve produced by [`fit`] or [`fit_with_count`]
#[derive(Clone, Debug, PartialEq)]
pub struct DenseCurve<const K: usize> {
    positions: Vec<[f64; K]>,
    parameters: Vec<f64>,
}

impl<const K: usize> DenseCurve<K> {
    pub fn positions(&self) -> &[[f64; K]] {
        &self.positions
    }

    /// Spline parameter of every sample, increasing from `0` to `N - 1`
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Centered finite differences of the samples, one-sided at both ends.
    pub fn tangents(&self) -> Vec<[f64; K]> {
        let n = self.positions.len();
        if n < 2 {
            return vec![[0.0; K]; n];
        }

        (0..n)
            .map(|i| {
                let (lo, hi, scale) = match i {
                    0 => (0, 1, 1.0),
                    i if i == n - 1 => (n - 2, n - 1, 1.0),
                    i => (i - 1, i + 1, 0.5),
                };
                let mut tangent = [0.0; K];
                for (axis, value) in tangent.iter_mut().enumerate() {
                    *value = (self.positions[hi][axis] - self.positions[lo][axis]) * scale;
                }
                tangent
            })
            .collect()
    }
}

/// Relative tangent length below which a sample has no direction
pub const DEGENERATE_TOLERANCE: f64 = 1e-12;

impl DenseCurve<2> {
    /// Unit normals `(-dy, dx)`.
    ///
    /// A tangent no longer than [`DEGENERATE_TOLERANCE`] times the curve's
    /// coordinate scale counts as zero and gets a zero normal.
    pub fn normals(&self) -> Vec<DVec2> {
        let scale = self
            .positions
            .iter()
            .flat_map(|p| p.iter())
            .fold(1.0_f64, |scale, v| scale.max(v.abs()));
        let tolerance = DEGENERATE_TOLERANCE * scale;

        self.tangents()
            .into_iter()
            .map(|tangent| {
                let tangent = DVec2::from_array(tangent);
                if tangent.length() <= tolerance {
                    DVec2::ZERO
                } else {
                    tangent.perp().normalize_or_zero()
                }
            })
            .collect()
    }
}

/// Fit a curve with `samples_per_segment` steps between neighbouring points.
///
/// The result has `(N - 1) * samples_per_segment + 1` samples. Fewer than two
/// points are returned unchanged without interpolation. A
/// `samples_per_segment` of zero is raised to one and logged; use
/// [`try_fit`] to reject it instead.
pub fn fit<const K: usize>(points: &[[f64; K]], samples_per_segment: usize) -> DenseCurve<K> {
    if samples_per_segment == 0 {
        warn!("samples_per_segment of 0 raised to 1");
    }
    if points.len() < 2 {
        return passthrough(points);
    }
    let sample_count = (points.len() - 1) * samples_per_segment.max(1) + 1;
    fit_with_count(points, sample_count)
}

/// Like [`fit`], but a `samples_per_segment` of zero is an error.
pub fn try_fit<const K: usize>(
    points: &[[f64; K]],
    samples_per_segment: usize,
) -> Result<DenseCurve<K>> {
    if samples_per_segment == 0 {
        return Err(SamplingError::InvalidParameter {
            name: "samples_per_segment",
            value: samples_per_segment,
        });
    }
    Ok(fit(points, samples_per_segment))
}

/// Fit a curve and evaluate it at `sample_count` evenly spaced parameters.
///
/// With at least two points the count is raised to two so both endpoints are
/// always present.
pub fn fit_with_count<const K: usize>(points: &[[f64; K]], sample_count: usize) -> DenseCurve<K> {
    if points.len() < 2 {
        return passthrough(points);
    }

    let splines: Vec<NaturalSpline> = (0..K)
        .map(|axis| NaturalSpline::new(points.iter().map(|p| p[axis]).collect()))
        .collect();

    let sample_count = sample_count.max(2);
    let span = (points.len() - 1) as f64;
    let denominator = (sample_count - 1) as f64;
    let parameters: Vec<f64> = (0..sample_count)
        .map(|i| (i as f64 * span) / denominator)
        .collect();

    let positions = parameters
        .iter()
        .map(|&t| {
            let mut position = [0.0; K];
            for (value, spline) in position.iter_mut().zip(&splines) {
                *value = spline.evaluate(t);
            }
            position
        })
        .collect();

    debug!(
        control_points = points.len(),
        samples = sample_count,
        "fitted natural cubic spline"
    );

    DenseCurve {
        positions,
        parameters,
    }
}

fn passthrough<const K: usize>(points: &[[f64; K]]) -> DenseCurve<K> {
    DenseCurve {
        positions: points.to_vec(),
        parameters: (0..points.len()).map(|i| i as f64).collect(),
    }
}

/// Interpolating cubic with zero second derivative at both ends, unit knot spacing
struct NaturalSpline {
    values: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl NaturalSpline {
    fn new(values: Vec<f64>) -> Self {
        let n = values.len();
        let mut second_derivatives = vec![0.0; n];

        if n > 2 {
            // Tridiagonal system M[i-1] + 4 M[i] + M[i+1] = 6 (y[i+1] - 2 y[i] + y[i-1])
            // over the interior knots, solved with the Thomas algorithm.
            let interior = n - 2;
            let mut upper = vec![0.0; interior];
            let mut rhs = vec![0.0; interior];

            for k in 0..interior {
                let i = k + 1;
                let d = 6.0 * (values[i + 1] - 2.0 * values[i] + values[i - 1]);
                let (prev_upper, prev_rhs) = if k == 0 {
                    (0.0, 0.0)
                } else {
                    (upper[k - 1], rhs[k - 1])
                };
                let denom = 4.0 - prev_upper;
                upper[k] = 1.0 / denom;
                rhs[k] = (d - prev_rhs) / denom;
            }

            let mut next = 0.0;
            for k in (0..interior).rev() {
                let m = rhs[k] - upper[k] * next;
                second_derivatives[k + 1] = m;
                next = m;
            }
        }

        Self {
            values,
            second_derivatives,
        }
    }

    #[inline]
    fn evaluate(&self, t: f64) -> f64 {
        let last = self.values.len() - 1;
        let t = t.clamp(0.0, last as f64);
        let j = (t.floor() as usize).min(last - 1);

        let u = t - j as f64;
        let w = 1.0 - u;
        let (y0, y1) = (self.values[j], self.values[j + 1]);
        let (m0, m1) = (self.second_derivatives[j], self.second_derivatives[j + 1]);

        // Lerp from the nearer knot: exact at both knots and on flat segments
        let delta = y1 - y0;
        let linear = if u < 0.5 {
            u.mul_add(delta, y0)
        } else {
            (-w).mul_add(delta, y1)
        };
        linear + ((w * w * w - w) * m0 + (u * u * u - u) * m1) / 6.0
    }
}
