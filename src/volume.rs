use crate::enums::Interpolation;
use crate::enums::Orientation;
use crate::error::{Result, SamplingError};
use crate::interpolator::Interpolator;
use crate::reformat::{self, ReformationMode, SliceGrid};

use image::GrayImage;
use ndarray::Array2;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::s;
use rayon::prelude::*;
use tracing::{debug, warn};
use web_time::Instant;

/// Read-only scalar field in (depth, row, column) order
#[derive(Debug, Default)]
pub struct Volume {
    data: Array3<f32>,
    spacing: (f32, f32, f32),
    interpolated_dim: (u32, u32, u32),
    min_value: f32,
}

impl Volume {
    /// `spacing` is the physical voxel size along (x, y, z)
    pub fn new(data: Array3<f32>, spacing: (f32, f32, f32)) -> Self {
        let original_dim = data.dim();
        let (min_value, _) = reformat::value_range(data.iter().copied());
        Self {
            interpolated_dim: Interpolator::get_isotropic_dimensions(spacing, original_dim),
            min_value: if data.is_empty() { 0.0 } else { min_value },
            data,
            spacing,
        }
    }

    /// Build a volume from integer or float samples
    pub fn from_samples<T>(data: Array3<T>, spacing: (f32, f32, f32)) -> Self
    where
        T: Copy + Into<f32>,
    {
        Self::new(data.mapv(Into::into), spacing)
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn spacing(&self) -> (f32, f32, f32) {
        self.spacing
    }

    /// Smallest sample, used as fill value outside the volume
    pub fn min_value(&self) -> f32 {
        self.min_value
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn ensure_not_empty(&self) -> Result<()> {
        if self.is_empty() {
            return Err(SamplingError::EmptyVolume);
        }
        Ok(())
    }

    pub fn get_slice_from_axis(
        &self,
        index: usize,
        orientation: &Orientation,
    ) -> Option<ArrayView2<'_, f32>> {
        if !self.is_valid_index(index, orientation) {
            return None;
        }
        let slice_result = match orientation {
            Orientation::Axial => self.data.slice(s![index, .., ..]),
            Orientation::Coronal => self.data.slice(s![.., index, ..]),
            Orientation::Sagittal => self.data.slice(s![.., .., index]),
        };
        Some(slice_result)
    }

    /// Height over width of one display pixel for `orientation`
    pub fn aspect_ratio(&self, orientation: Orientation) -> f32 {
        let (x_spacing, y_spacing, z_spacing) = self.spacing;
        match orientation {
            Orientation::Axial => y_spacing / x_spacing,
            Orientation::Coronal => z_spacing / x_spacing,
            Orientation::Sagittal => z_spacing / y_spacing,
        }
    }

    /// Height over width of one display pixel for a reformatted image
    pub fn reformation_aspect_ratio(&self, mode: &ReformationMode) -> f32 {
        match mode {
            ReformationMode::CurvedPlanar { .. } => 1.0,
            ReformationMode::Panoramic => self.spacing.2 / self.spacing.0,
        }
    }

    fn get_output_dimensions(&self, orientation: &Orientation) -> (u32, u32) {
        // Always return (width, height) - standard image convention
        match orientation {
            Orientation::Axial => (self.interpolated_dim.2, self.interpolated_dim.1),
            Orientation::Coronal => (self.interpolated_dim.2, self.interpolated_dim.0),
            Orientation::Sagittal => (self.interpolated_dim.1, self.interpolated_dim.0),
        }
    }

    /// Orthogonal slice as a min-max stretched display image.
    ///
    /// Coronal and sagittal slices are flipped so depth grows upwards.
    /// `None` for an out of range index or a slice without pixels.
    pub fn get_image_from_axis(
        &self,
        index: usize,
        orientation: Orientation,
        interpolation: Interpolation,
    ) -> Option<GrayImage> {
        let slice = self.get_slice_from_axis(index, &orientation)?;
        if slice.is_empty() {
            return None;
        }
        let slice = match orientation {
            Orientation::Axial => slice,
            Orientation::Coronal | Orientation::Sagittal => slice.slice_move(s![..;-1, ..]),
        };

        let pixels = match interpolation {
            // Axial doesn't need interpolation (already isotropic in-plane)
            Interpolation::Linear if !matches!(orientation, Orientation::Axial) => {
                let (width, height) = self.get_output_dimensions(&orientation);
                Self::interpolate_slice(&slice, width, height)
            }
            _ => slice.to_owned(),
        };

        match reformat::to_display_image(&pixels) {
            Ok(image) => Some(image),
            Err(err) => {
                warn!(%err, ?orientation, index, "failed to build slice image");
                None
            }
        }
    }

    fn interpolate_slice(slice: &ArrayView2<'_, f32>, width: u32, height: u32) -> Array2<f32> {
        let (slice_height, slice_width) = slice.dim();
        if slice_height == 0 || slice_width == 0 {
            return Array2::zeros((0, 0));
        }
        let (width, height) = (width.max(1) as usize, height.max(1) as usize);

        let pixel_data: Vec<f32> = (0..height)
            .into_par_iter()
            .flat_map_iter(|y| {
                (0..width).map(move |x| {
                    // Normalized coordinates with half-pixel offset
                    let norm_x = (x as f32 + 0.5) / width as f32;
                    let norm_y = (y as f32 + 0.5) / height as f32;

                    let src_x = norm_x * slice_width as f32 - 0.5;
                    let src_y = norm_y * slice_height as f32 - 0.5;

                    let src_x = src_x.max(0.0).min((slice_width - 1) as f32);
                    let src_y = src_y.max(0.0).min((slice_height - 1) as f32);

                    Interpolator::bilinear_interpolate(slice, src_y, src_x)
                })
            })
            .collect();

        Array2::from_shape_vec((height, width), pixel_data).unwrap_or_default()
    }

    fn is_valid_index(&self, index: usize, orientation: &Orientation) -> bool {
        let dim = self.data.dim();
        let max_index = match orientation {
            Orientation::Axial => dim.0,
            Orientation::Coronal => dim.1,
            Orientation::Sagittal => dim.2,
        };
        index < max_index
    }

    /// Trilinear samples at every grid coordinate; outside points get [`Volume::min_value`].
    pub fn resample(&self, grid: &SliceGrid) -> Result<Array2<f32>> {
        self.ensure_not_empty()?;
        let started = Instant::now();

        let (rows, cols) = (grid.rows(), grid.cols());
        let coords = grid.coords();
        let view = self.data.view();
        let fill = self.min_value;

        let pixel_data: Vec<f32> = (0..rows)
            .into_par_iter()
            .flat_map_iter(|row| {
                let view = &view;
                (0..cols).map(move |col| {
                    Interpolator::trilinear_interpolate(
                        view,
                        coords[[row, col, 0]],
                        coords[[row, col, 1]],
                        coords[[row, col, 2]],
                        fill,
                    )
                })
            })
            .collect();

        debug!(
            rows,
            cols,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "resampled slice grid on cpu"
        );
        Ok(Array2::from_shape_vec((rows, cols), pixel_data)?)
    }
}
