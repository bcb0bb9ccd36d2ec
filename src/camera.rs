//! Camera fly-through along a spline through picked waypoints.
//!
//! The animator owns a stepping cursor over a [`DenseCurve`] and pushes one
//! pose per [`CameraAnimator::step`] into a [`CameraRig`]. It has no clock of
//! its own; the host calls `step` once per timer tick (see
//! [`FlythroughParams::frame_interval`](crate::params::FlythroughParams::frame_interval)).

use crate::enums::{AnimationState, EasingMode};
use crate::spline::{self, DenseCurve};

use glam::DVec3;
use tracing::{debug, trace};

/// Number of samples the focal point runs ahead of the camera
pub const LOOK_AHEAD: usize = 5;

/// Receiver of the poses emitted while stepping, usually the host's camera object
pub trait CameraRig {
    fn set_pose(&mut self, position: DVec3, focal_point: DVec3);
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraPose {
    pub position: DVec3,
    pub focal_point: DVec3,
}

impl CameraRig for CameraPose {
    fn set_pose(&mut self, position: DVec3, focal_point: DVec3) {
        self.position = position;
        self.focal_point = focal_point;
    }
}

/// Plane through `origin` with unit `normal`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipPlane {
    pub origin: DVec3,
    pub normal: DVec3,
}

impl CameraPose {
    /// Unit vector from the focal point back to the camera, `None` when both coincide
    pub fn view_plane_normal(&self) -> Option<DVec3> {
        (self.position - self.focal_point).try_normalize()
    }

    /// Clipping plane that follows the camera.
    ///
    /// The origin is `offset` along the view-plane normal from the camera
    /// position, so a positive offset puts it behind the camera, away from
    /// the focal point, and a negative one between camera and focal point.
    pub fn clip_plane(&self, offset: f64) -> Option<ClipPlane> {
        let normal = self.view_plane_normal()?;
        Some(ClipPlane {
            origin: self.position + normal * offset,
            normal,
        })
    }
}

pub struct CameraAnimator<R: CameraRig> {
    camera: R,
    path: DenseCurve<3>,
    current_index: usize,
    easing: EasingMode,
    state: AnimationState,
}

impl<R: CameraRig> CameraAnimator<R> {
    pub fn new(camera: R, easing: EasingMode) -> Self {
        Self {
            camera,
            path: spline::fit(&[], 1),
            current_index: 0,
            easing,
            state: AnimationState::Idle,
        }
    }

    /// Replace the path with a spline through `points` and rewind.
    ///
    /// Fewer than two points are kept as they are, giving an empty or
    /// single-pose path.
    pub fn set_path(&mut self, points: &[DVec3], steps_per_segment: usize) {
        let waypoints: Vec<[f64; 3]> = points.iter().map(DVec3::to_array).collect();
        self.path = spline::fit(&waypoints, steps_per_segment);
        self.current_index = 0;
        self.state = AnimationState::Stepping;
        debug!(
            waypoints = points.len(),
            samples = self.path.len(),
            "camera path set"
        );
    }

    /// Move the camera to the next sample.
    ///
    /// Returns `false` without touching the camera when the path is empty, or
    /// when the end was reached and `looping` is off. Without looping the
    /// state drops to [`AnimationState::Idle`] as soon as the last sample
    /// has been shown.
    pub fn step(&mut self, looping: bool) -> bool {
        let samples = self.path.positions();
        let total = samples.len();
        if total == 0 {
            self.state = AnimationState::Idle;
            return false;
        }

        if self.current_index >= total {
            if looping {
                self.current_index = 0;
            } else {
                self.state = AnimationState::Idle;
                return false;
            }
        }

        let last = total - 1;
        let position = DVec3::from_array(samples[self.current_index]);
        let mut focal_index = (self.current_index + LOOK_AHEAD).min(last);
        if focal_index == self.current_index && total > 1 {
            focal_index = last - 1;
        }
        let focal_point = DVec3::from_array(samples[focal_index]);

        trace!(index = self.current_index, focal_index, "camera step");
        self.camera.set_pose(position, focal_point);

        self.current_index += 1;
        self.state = AnimationState::Stepping;
        if self.current_index >= total {
            if looping {
                self.current_index = 0;
            } else {
                self.state = AnimationState::Idle;
            }
        }
        true
    }

    pub fn reset(&mut self) {
        self.current_index = 0;
    }

    /// Apply the configured easing to `t`, clamped to `[0, 1]`.
    ///
    /// Stepping always advances one sample per call; this curve is available
    /// to hosts that drive the cursor by elapsed time instead.
    pub fn ease(&self, t: f64) -> f64 {
        self.easing.ease(t.clamp(0.0, 1.0))
    }

    pub fn progress(&self) -> f64 {
        match self.path.len() {
            0 => 0.0,
            total => self.current_index as f64 / total as f64,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_steps(&self) -> usize {
        self.path.len()
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn easing(&self) -> EasingMode {
        self.easing
    }

    pub fn set_easing(&mut self, easing: EasingMode) {
        self.easing = easing;
    }

    pub fn path(&self) -> &DenseCurve<3> {
        &self.path
    }

    pub fn camera(&self) -> &R {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut R {
        &mut self.camera
    }

    pub fn into_camera(self) -> R {
        self.camera
    }
}
