#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Resize coronal and sagittal slices to isotropic pixel spacing
    Linear,
    #[default]
    None,
}

/// Timing curve applied to a normalized parameter in `[0, 1]`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EasingMode {
    #[default]
    EaseInOut,
    EaseIn,
    EaseOut,
    Linear,
}

impl EasingMode {
    pub fn ease(self, t: f64) -> f64 {
        match self {
            EasingMode::EaseInOut => t * t * (3.0 - 2.0 * t),
            EasingMode::EaseIn => t * t,
            EasingMode::EaseOut => t * (2.0 - t),
            EasingMode::Linear => t,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimationState {
    #[default]
    Idle,
    Stepping,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [EasingMode; 4] = [
        EasingMode::EaseInOut,
        EasingMode::EaseIn,
        EasingMode::EaseOut,
        EasingMode::Linear,
    ];

    #[test]
    fn easing_hits_both_ends_exactly() {
        for mode in MODES {
            assert_eq!(mode.ease(0.0), 0.0, "{mode:?}");
            assert_eq!(mode.ease(1.0), 1.0, "{mode:?}");
        }
    }

    #[test]
    fn ease_in_out_is_symmetric_about_the_midpoint() {
        assert_eq!(EasingMode::EaseInOut.ease(0.5), 0.5);
        let a = EasingMode::EaseInOut.ease(0.2);
        let b = EasingMode::EaseInOut.ease(0.8);
        assert!((a + b - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ease_in_starts_slow_and_ease_out_starts_fast() {
        assert!(EasingMode::EaseIn.ease(0.25) < 0.25);
        assert!(EasingMode::EaseOut.ease(0.25) > 0.25);
        assert_eq!(EasingMode::Linear.ease(0.25), 0.25);
    }
}
