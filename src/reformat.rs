//! Curved planar and panoramic reformation.
//!
//! A path drawn on an axial slice is fitted with [`spline::fit_with_count`]
//! and turned into a [`SliceGrid`] of `(depth, row, column)` coordinates:
//!
//!  - [`ReformationMode::CurvedPlanar`] sweeps the path sideways along its
//!    normals at one fixed depth. Rows run from `-half_width` to
//!    `+half_width`, columns follow the path.
//!  - [`ReformationMode::Panoramic`] keeps the path as centerline and stacks
//!    it over every depth of the volume, deepest slice in the top row.
//!
//! The grid is resampled with trilinear interpolation (see
//! [`Volume::resample`]) and stretched to 8 bit for display.

use crate::error::{Result, SamplingError};
use crate::params::ReformatParams;
use crate::spline::{self, DenseCurve};
use crate::volume::Volume;

use glam::DVec2;
use image::{GrayImage, ImageBuffer};
use ndarray::{Array2, Array3};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReformationMode {
    CurvedPlanar {
        depth_index: usize,
        half_width: usize,
    },
    Panoramic,
}

/// A fitted reformation path with its unit normals, independent of depth
#[derive(Clone, Debug)]
pub struct CurvedPath {
    curve: DenseCurve<2>,
    normals: Vec<DVec2>,
    degenerate_normals: usize,
}

impl CurvedPath {
    /// Fit `path_samples` samples through `(column, row)` control points.
    pub fn fit(control_points: &[[f64; 2]], path_samples: usize) -> Result<Self> {
        if control_points.len() < 2 {
            return Err(SamplingError::InsufficientPoints {
                found: control_points.len(),
            });
        }
        if path_samples < 2 {
            return Err(SamplingError::InvalidParameter {
                name: "path_samples",
                value: path_samples,
            });
        }

        let curve = spline::fit_with_count(control_points, path_samples);
        let normals = curve.normals();
        let degenerate_normals = normals.iter().filter(|n| **n == DVec2::ZERO).count();
        if degenerate_normals > 0 {
            warn!(
                degenerate_normals,
                samples = path_samples,
                "path has samples without direction, sweeping them along the centerline"
            );
        }

        Ok(Self {
            curve,
            normals,
            degenerate_normals,
        })
    }

    pub fn curve(&self) -> &DenseCurve<2> {
        &self.curve
    }

    pub fn normals(&self) -> &[DVec2] {
        &self.normals
    }

    /// Number of samples whose normal was replaced by the zero vector
    pub fn degenerate_normals(&self) -> usize {
        self.degenerate_normals
    }

    pub fn len(&self) -> usize {
        self.curve.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curve.is_empty()
    }

    /// Build the sampling grid for `mode` over a volume `depth_extent` slices deep.
    pub fn grid(&self, mode: ReformationMode, depth_extent: usize) -> Result<SliceGrid> {
        let positions = self.curve.positions();
        let cols = positions.len();

        let coords = match mode {
            ReformationMode::CurvedPlanar {
                depth_index,
                half_width,
            } => {
                if half_width == 0 {
                    return Err(SamplingError::InvalidParameter {
                        name: "half_width",
                        value: half_width,
                    });
                }
                let rows = 2 * half_width;
                let reach = half_width as f64;
                let step = 2.0 * reach / (rows - 1) as f64;
                let depth = depth_index as f32;

                Array3::from_shape_fn((rows, cols, 3), |(row, col, axis)| {
                    let offset = row as f64 * step - reach;
                    let [x, y] = positions[col];
                    let normal = self.normals[col];
                    match axis {
                        0 => depth,
                        1 => offset.mul_add(normal.y, y) as f32,
                        _ => offset.mul_add(normal.x, x) as f32,
                    }
                })
            }
            ReformationMode::Panoramic => {
                if depth_extent == 0 {
                    return Err(SamplingError::EmptyVolume);
                }
                Array3::from_shape_fn((depth_extent, cols, 3), |(row, col, axis)| {
                    let [x, y] = positions[col];
                    match axis {
                        0 => (depth_extent - 1 - row) as f32,
                        1 => y as f32,
                        _ => x as f32,
                    }
                })
            }
        };

        debug!(?mode, shape = ?coords.dim(), "built slice grid");
        Ok(SliceGrid { coords })
    }
}

/// `rows x cols` sample coordinates in `(depth, row, column)` voxel order
#[derive(Clone, Debug)]
pub struct SliceGrid {
    coords: Array3<f32>,
}

impl SliceGrid {
    pub fn rows(&self) -> usize {
        self.coords.dim().0
    }

    pub fn cols(&self) -> usize {
        self.coords.dim().1
    }

    pub fn coordinate(&self, row: usize, col: usize) -> [f32; 3] {
        [
            self.coords[[row, col, 0]],
            self.coords[[row, col, 1]],
            self.coords[[row, col, 2]],
        ]
    }

    pub(crate) fn coords(&self) -> &Array3<f32> {
        &self.coords
    }
}

/// Refits a path only when its control points or sample count change.
#[derive(Debug, Default)]
pub struct CurvedPathCache {
    control_points: Vec<[f64; 2]>,
    path_samples: usize,
    path: Option<CurvedPath>,
    fits: usize,
}

impl CurvedPathCache {
    pub fn get_or_fit(
        &mut self,
        control_points: &[[f64; 2]],
        path_samples: usize,
    ) -> Result<&CurvedPath> {
        let stale = self.path.is_none()
            || self.path_samples != path_samples
            || self.control_points.as_slice() != control_points;

        if stale {
            let path = CurvedPath::fit(control_points, path_samples)?;
            self.control_points = control_points.to_vec();
            self.path_samples = path_samples;
            self.fits += 1;
            let path = self.path.insert(path);
            return Ok(&*path);
        }

        self.path
            .as_ref()
            .ok_or(SamplingError::InsufficientPoints {
                found: control_points.len(),
            })
    }

    pub fn invalidate(&mut self) {
        self.path = None;
        self.control_points.clear();
    }

    /// How many times a path was actually fitted
    pub fn fits(&self) -> usize {
        self.fits
    }
}

/// Resample `volume` along `path` and return the display image.
pub fn reform(volume: &Volume, path: &CurvedPath, mode: ReformationMode) -> Result<GrayImage> {
    let grid = path.grid(mode, volume.dim().0)?;
    let samples = volume.resample(&grid)?;
    to_display_image(&samples)
}

/// Curved planar image at `depth_index`, `2 * half_width` rows by the default path length.
pub fn reform_curved_plane(
    volume: &Volume,
    control_points: &[[f64; 2]],
    depth_index: usize,
    half_width: usize,
) -> Result<GrayImage> {
    let path = CurvedPath::fit(control_points, ReformatParams::default().path_samples)?;
    reform(
        volume,
        &path,
        ReformationMode::CurvedPlanar {
            depth_index,
            half_width,
        },
    )
}

/// Panoramic image with one row per depth slice, deepest slice on top.
pub fn reform_panoramic(volume: &Volume, control_points: &[[f64; 2]]) -> Result<GrayImage> {
    let path = CurvedPath::fit(control_points, ReformatParams::default().path_samples)?;
    reform(volume, &path, ReformationMode::Panoramic)
}

/// Min-max stretch to `[0, 1]`; a flat image maps to zero.
pub fn normalize(samples: &Array2<f32>) -> Array2<f32> {
    let (min, max) = value_range(samples.iter().copied());
    if max > min {
        let scale = 1.0 / (max - min);
        samples.mapv(|v| (v - min) * scale)
    } else {
        Array2::zeros(samples.dim())
    }
}

/// Min-max stretch to 8 bit grey.
pub fn to_display_image(samples: &Array2<f32>) -> Result<GrayImage> {
    let (rows, cols) = samples.dim();
    let pixel_data: Vec<u8> = normalize(samples)
        .iter()
        .map(|&v| (v * 255.0).clamp(0.0, 255.0) as u8)
        .collect();
    ImageBuffer::from_raw(cols as u32, rows as u32, pixel_data).ok_or(SamplingError::Shape(
        ndarray::ShapeError::from_kind(ndarray::ErrorKind::IncompatibleShape),
    ))
}

pub(crate) fn value_range(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values.fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), v| {
        (min.min(v), max.max(v))
    })
}
