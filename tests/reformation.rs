use approx::assert_abs_diff_eq;
use glam::DVec2;
use ndarray::Array3;
use volume_path::{
    CurvedPath, GpuResampler, ReformationMode, SamplingError, Volume, WGPU, reformat,
};

/// Value equals the column index, so samples report where they were taken
fn column_ramp(depth: usize, height: usize, width: usize) -> Volume {
    Volume::new(
        Array3::from_shape_fn((depth, height, width), |(_, _, x)| x as f32 + 5.0),
        (1.0, 1.0, 1.0),
    )
}

fn depth_ramp(depth: usize, height: usize, width: usize) -> Volume {
    Volume::new(
        Array3::from_shape_fn((depth, height, width), |(z, _, _)| 10.0 * z as f32),
        (0.5, 0.5, 2.0),
    )
}

#[test]
fn curved_planar_samples_follow_the_path() {
    let volume = column_ramp(3, 40, 40);
    let path = CurvedPath::fit(&[[5.0, 20.0], [25.0, 20.0]], 21).expect("fit");
    let grid = path
        .grid(
            ReformationMode::CurvedPlanar {
                depth_index: 1,
                half_width: 2,
            },
            3,
        )
        .expect("grid");
    let samples = volume.resample(&grid).expect("resample");
    assert_eq!(samples.dim(), (4, 21));
    for row in 0..4 {
        for col in 0..21 {
            assert_abs_diff_eq!(samples[[row, col]], 10.0 + col as f32, epsilon = 1e-4);
        }
    }
}

#[test]
fn vertical_path_sweeps_across_columns() {
    let volume = column_ramp(1, 40, 40);
    let path = CurvedPath::fit(&[[20.0, 5.0], [20.0, 30.0]], 10).expect("fit");
    let grid = path
        .grid(
            ReformationMode::CurvedPlanar {
                depth_index: 0,
                half_width: 3,
            },
            1,
        )
        .expect("grid");
    let samples = volume.resample(&grid).expect("resample");
    // Normal of a downward path is (-1, 0): the first row sits at column 23
    assert_abs_diff_eq!(samples[[0, 4]], 28.0, epsilon = 1e-4);
    assert_abs_diff_eq!(samples[[5, 4]], 22.0, epsilon = 1e-4);
}

#[test]
fn out_of_range_coordinates_resolve_to_the_minimum() {
    let volume = column_ramp(2, 10, 10);
    let path = CurvedPath::fit(&[[1.0, 5.0], [8.0, 5.0]], 8).expect("fit");

    // Depth outside the volume: every sample is filled
    let grid = path
        .grid(
            ReformationMode::CurvedPlanar {
                depth_index: 7,
                half_width: 2,
            },
            2,
        )
        .expect("grid");
    let samples = volume.resample(&grid).expect("resample");
    assert!(samples.iter().all(|&v| v == volume.min_value()));

    // Wide sweep: rows beyond the volume edge are filled, the centre is not
    let grid = path
        .grid(
            ReformationMode::CurvedPlanar {
                depth_index: 1,
                half_width: 20,
            },
            2,
        )
        .expect("grid");
    let samples = volume.resample(&grid).expect("resample");
    assert_eq!(samples[[0, 3]], 5.0);
    assert_eq!(samples[[39, 3]], 5.0);
    assert!(samples[[20, 3]] > 5.0);
}

#[test]
fn panoramic_has_one_row_per_slice_deepest_on_top() {
    let volume = depth_ramp(7, 16, 16);
    let path = CurvedPath::fit(&[[2.0, 2.0], [8.0, 12.0], [14.0, 3.0]], 50).expect("fit");
    let samples = volume
        .resample(&path.grid(ReformationMode::Panoramic, 7).expect("grid"))
        .expect("resample");
    assert_eq!(samples.dim(), (7, 50));
    for row in 0..7 {
        assert_eq!(samples[[row, 10]], 10.0 * (6 - row) as f32);
    }

    let image = reformat::reform_panoramic(&volume, &[[2.0, 2.0], [14.0, 3.0]]).expect("image");
    assert_eq!(image.dimensions(), (800, 7));
    assert_eq!(image.get_pixel(0, 0).0[0], 255);
    assert_eq!(image.get_pixel(799, 6).0[0], 0);
}

#[test]
fn curved_planar_image_has_default_shape() {
    let volume = depth_ramp(4, 64, 64);
    let image = reformat::reform_curved_plane(&volume, &[[10.0, 30.0], [50.0, 30.0]], 2, 165)
        .expect("image");
    assert_eq!(image.dimensions(), (800, 330));
}

#[test]
fn coincident_points_still_resample() {
    let volume = column_ramp(2, 8, 8);
    let path = CurvedPath::fit(&[[3.0, 3.0], [3.0, 3.0]], 800).expect("fit");
    assert!(path.normals().iter().all(|n| *n == DVec2::ZERO));

    let samples = volume
        .resample(
            &path
                .grid(
                    ReformationMode::CurvedPlanar {
                        depth_index: 0,
                        half_width: 165,
                    },
                    2,
                )
                .expect("grid"),
        )
        .expect("resample");
    assert_eq!(samples.dim(), (330, 800));
    assert!(samples.iter().all(|&v| v == 8.0));

    let image = reformat::reform_curved_plane(&volume, &[[3.0, 3.0], [3.0, 3.0]], 0, 165)
        .expect("image");
    assert!(image.as_raw().iter().all(|&v| v == 0));
}

#[test]
fn too_few_points_are_reported() {
    let volume = column_ramp(2, 8, 8);
    assert!(matches!(
        reformat::reform_curved_plane(&volume, &[[1.0, 1.0]], 0, 165),
        Err(SamplingError::InsufficientPoints { found: 1 })
    ));
    assert!(matches!(
        reformat::reform_panoramic(&volume, &[]),
        Err(SamplingError::InsufficientPoints { found: 0 })
    ));
}

#[test]
fn empty_volume_fails_loudly() {
    let volume = Volume::new(Array3::zeros((0, 8, 8)), (1.0, 1.0, 1.0));
    assert!(matches!(
        reformat::reform_panoramic(&volume, &[[1.0, 1.0], [2.0, 2.0]]),
        Err(SamplingError::EmptyVolume)
    ));
}

#[test]
#[ignore = "requires a GPU adapter"]
fn gpu_matches_cpu() {
    let volume = column_ramp(6, 48, 48);
    let path = CurvedPath::fit(&[[4.0, 30.0], [24.0, 10.0], [44.0, 30.0]], 120).expect("fit");
    let modes = [
        ReformationMode::CurvedPlanar {
            depth_index: 2,
            half_width: 30,
        },
        ReformationMode::Panoramic,
    ];

    let Ok(wgpu) = futures::executor::block_on(WGPU::request()) else {
        return;
    };
    let resampler = GpuResampler::new(&volume, wgpu).expect("upload");
    for mode in modes {
        let grid = path.grid(mode, 6).expect("grid");
        let cpu = volume.resample(&grid).expect("cpu");
        let gpu = futures::executor::block_on(resampler.resample(&grid)).expect("gpu");
        assert_eq!(cpu.dim(), gpu.dim());
        for (a, b) in cpu.iter().zip(gpu.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-3);
        }
    }
}
