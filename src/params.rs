//! Host-facing configuration for reformation and fly-through.

use crate::enums::EasingMode;

use std::time::Duration;

/// Parameters for curved-planar and panoramic reformation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReformatParams {
    /// Number of samples along the fitted path (image width).
    pub path_samples: usize,

    /// Perpendicular reach on each side of the path in voxels; the curved
    /// planar image is `2 * half_width` rows tall.
    pub half_width: usize,
}

impl Default for ReformatParams {
    fn default() -> Self {
        Self {
            path_samples: 800,
            half_width: 165,
        }
    }
}

impl ReformatParams {
    #[must_use]
    pub fn with_path_samples(mut self, path_samples: usize) -> Self {
        self.path_samples = path_samples;
        self
    }

    #[must_use]
    pub fn with_half_width(mut self, half_width: usize) -> Self {
        self.half_width = half_width;
        self
    }
}

/// Parameters for a camera fly-through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlythroughParams {
    pub easing: EasingMode,

    /// Interpolated steps between waypoints; `None` picks
    /// [`FlythroughParams::steps_per_segment_for`] from the waypoint count.
    pub steps_per_segment: Option<usize>,

    pub looping: bool,

    /// Timer rate, clamped to `1..=100`.
    pub fps: u32,
}

impl Default for FlythroughParams {
    fn default() -> Self {
        Self {
            easing: EasingMode::EaseInOut,
            steps_per_segment: None,
            looping: true,
            fps: 30,
        }
    }
}

impl FlythroughParams {
    pub const DEFAULT_STEPS_PER_SEGMENT: usize = 20;

    /// Longer paths get fewer steps per segment, never below 10.
    pub fn steps_per_segment_for(point_count: usize) -> usize {
        (100 / point_count.max(1)).max(10)
    }

    pub fn resolve_steps_per_segment(&self, point_count: usize) -> usize {
        self.steps_per_segment
            .unwrap_or_else(|| Self::steps_per_segment_for(point_count))
            .max(1)
    }

    /// Delay between two `step` calls
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.clamp(1, 100)))
    }

    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: EasingMode) -> Self {
        self.easing = easing;
        self
    }
}
