use approx::assert_abs_diff_eq;
use glam::DVec3;
use volume_path::{AnimationState, CameraAnimator, CameraPose, CameraRig, EasingMode};

#[derive(Default)]
struct RecordingCamera {
    poses: Vec<(DVec3, DVec3)>,
}

impl CameraRig for RecordingCamera {
    fn set_pose(&mut self, position: DVec3, focal_point: DVec3) {
        self.poses.push((position, focal_point));
    }
}

fn five_sample_animator() -> CameraAnimator<RecordingCamera> {
    let mut animator = CameraAnimator::new(RecordingCamera::default(), EasingMode::EaseInOut);
    animator.set_path(&[DVec3::ZERO, DVec3::new(4.0, 0.0, 0.0)], 4);
    assert_eq!(animator.total_steps(), 5);
    animator
}

#[test]
fn stops_after_the_last_sample_without_loop() {
    let mut animator = five_sample_animator();
    let results: Vec<(bool, AnimationState)> = (0..6)
        .map(|_| (animator.step(false), animator.state()))
        .collect();
    assert_eq!(
        results,
        [
            (true, AnimationState::Stepping),
            (true, AnimationState::Stepping),
            (true, AnimationState::Stepping),
            (true, AnimationState::Stepping),
            (true, AnimationState::Idle),
            (false, AnimationState::Idle),
        ]
    );
    assert_eq!(animator.current_index(), 5);
    assert_eq!(animator.camera().poses.len(), 5);
    assert_eq!(animator.state(), AnimationState::Idle);
    assert_eq!(animator.progress(), 1.0);

    // Further calls keep refusing without moving the camera
    assert!(!animator.step(false));
    assert_eq!(animator.camera().poses.len(), 5);
}

#[test]
fn looping_returns_to_the_start_after_one_lap() {
    let mut animator = five_sample_animator();
    for lap in 0..3 {
        for _ in 0..5 {
            assert!(animator.step(true));
        }
        assert_eq!(animator.current_index(), 0, "lap {lap}");
        assert_eq!(animator.state(), AnimationState::Stepping);
    }
    let poses = &animator.camera().poses;
    assert_eq!(poses.len(), 15);
    assert_eq!(poses[5], poses[0]);
}

#[test]
fn looping_resumes_a_finished_path() {
    let mut animator = five_sample_animator();
    while animator.step(false) {}
    assert!(animator.step(true));
    assert_eq!(animator.current_index(), 1);
    assert_eq!(animator.camera().poses.last().map(|p| p.0), Some(DVec3::ZERO));
}

#[test]
fn emitted_poses_follow_the_path_with_look_ahead() {
    let mut animator = five_sample_animator();
    while animator.step(false) {}
    let expected_focal = [4.0, 4.0, 4.0, 4.0, 3.0];
    for (i, (position, focal)) in animator.camera().poses.iter().enumerate() {
        assert_abs_diff_eq!(position.x, i as f64, epsilon = 1e-12);
        assert_abs_diff_eq!(focal.x, expected_focal[i], epsilon = 1e-12);
    }
}

#[test]
fn set_path_rewinds_a_running_animation() {
    let mut animator = five_sample_animator();
    animator.step(false);
    animator.step(false);
    animator.set_path(
        &[
            DVec3::ZERO,
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(2.0, 0.0, 2.0),
        ],
        10,
    );
    assert_eq!(animator.current_index(), 0);
    assert_eq!(animator.total_steps(), 21);
    assert_eq!(animator.state(), AnimationState::Stepping);
}

#[test]
fn easing_boundaries_hold_for_every_mode() {
    for mode in [
        EasingMode::EaseInOut,
        EasingMode::EaseIn,
        EasingMode::EaseOut,
        EasingMode::Linear,
    ] {
        let animator = CameraAnimator::new(CameraPose::default(), mode);
        assert_eq!(animator.ease(0.0), 0.0);
        assert_eq!(animator.ease(1.0), 1.0);
    }
    let animator = CameraAnimator::new(CameraPose::default(), EasingMode::EaseInOut);
    assert_eq!(animator.ease(0.5), 0.5);
}
