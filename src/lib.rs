//! # volume-path
//!
//! Path-driven sampling for medical volumes. A handful of picked waypoints
//! are fitted with a natural cubic spline and the dense curve is consumed in
//! two ways:
//!
//!  - as a camera fly-through: [`CameraAnimator`] steps a cursor along the
//!    curve and hands a position and a look-ahead focal point to the host's
//!    camera on every tick
//!  - as a reformation surface: [`CurvedPath`] sweeps a path drawn on an
//!    axial slice sideways at one depth (curved planar) or down through every
//!    depth (panoramic) and resamples the [`Volume`] with trilinear
//!    interpolation
//!
//! Volumes are read-only `(depth, row, column)` arrays of `f32`. Samples that
//! fall outside the volume take its minimum value. Resampling runs on the CPU
//! with rayon, or on the GPU through [`GpuResampler`].
//!
//! Orthogonal axial, coronal and sagittal slices are available as well and
//! can be interpolated to preserve the aspect ratio between the axes.
//!
//! # Examples
//!
//! ## Curved planar reformation
//!
//! ```no_run
//! # use volume_path::{Volume, reformat};
//! # use ndarray::Array3;
//! let volume = Volume::new(Array3::zeros((64, 256, 256)), (0.5, 0.5, 1.0));
//! let path = [[40.0, 180.0], [128.0, 90.0], [216.0, 180.0]];
//! let image = reformat::reform_curved_plane(&volume, &path, 32, 165)
//!     .expect("path has enough points");
//! image.save("curved.png").expect("image should have been written");
//! ```
//!
//! ## Camera fly-through
//!
//! ```
//! # use volume_path::{CameraAnimator, CameraPose, EasingMode};
//! # use glam::DVec3;
//! let mut animator = CameraAnimator::new(CameraPose::default(), EasingMode::EaseInOut);
//! let waypoints = [
//!     DVec3::ZERO,
//!     DVec3::new(10.0, 0.0, 0.0),
//!     DVec3::new(10.0, 10.0, 5.0),
//! ];
//! animator.set_path(&waypoints, 20);
//! while animator.step(false) {
//!     let pose = animator.camera();
//!     // hand pose.position and pose.focal_point to the renderer
//! #   let _ = pose;
//! }
//! assert_eq!(animator.progress(), 1.0);
//! ```

pub mod camera;
pub mod enums;
pub mod error;
mod gpu_interpolator;
mod interpolator;
pub mod params;
pub mod reformat;
pub mod spline;
pub mod volume;

pub use camera::{CameraAnimator, CameraPose, CameraRig, ClipPlane};
pub use enums::{AnimationState, EasingMode, Interpolation, Orientation};
pub use error::{Result, SamplingError};
pub use gpu_interpolator::{GpuResampler, WGPU};
pub use params::{FlythroughParams, ReformatParams};
pub use reformat::{CurvedPath, CurvedPathCache, ReformationMode, SliceGrid};
pub use spline::{ControlPoints, DenseCurve};
pub use volume::Volume;
