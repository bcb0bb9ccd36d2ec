use glam::DVec3;
use ndarray::Array3;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use volume_path::{
    CameraAnimator, CameraPose, CurvedPathCache, FlythroughParams, GpuResampler,
    ReformatParams, ReformationMode, Result, Volume, WGPU, reformat,
};

/// Synthetic scan: a bright arch with intensity growing towards deeper slices
fn phantom(depth: usize, height: usize, width: usize) -> Volume {
    let data = Array3::from_shape_fn((depth, height, width), |(z, y, x)| {
        let u = (x as f32 - width as f32 / 2.0) / (width as f32 * 0.4);
        let v = (y as f32 - height as f32 * 0.8) / (height as f32 * 0.5);
        let ring = ((u * u + v * v).sqrt() - 1.0).abs();
        if ring < 0.08 && v < 0.0 {
            1000.0 + 10.0 * z as f32
        } else {
            z as f32
        }
    });
    Volume::new(data, (0.4, 0.4, 1.0))
}

fn arch_points(height: usize, width: usize) -> Vec<[f64; 2]> {
    (0..5)
        .map(|i| {
            let angle = std::f64::consts::PI * (1.0 + i as f64 / 4.0);
            [
                width as f64 / 2.0 + width as f64 * 0.4 * angle.cos(),
                height as f64 * 0.8 + height as f64 * 0.5 * angle.sin(),
            ]
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let volume = phantom(48, 256, 256);
    let points = arch_points(256, 256);
    let params = ReformatParams::default();

    let mut cache = CurvedPathCache::default();
    let path = cache.get_or_fit(&points, params.path_samples)?;

    let curved = ReformationMode::CurvedPlanar {
        depth_index: volume.dim().0 / 2,
        half_width: params.half_width,
    };
    let image = reformat::reform(&volume, path, curved)?;
    save(&image, "curved_planar.png");
    let image = reformat::reform(&volume, path, ReformationMode::Panoramic)?;
    save(&image, "panoramic.png");

    match WGPU::request().await {
        Ok(wgpu) => {
            let resampler = GpuResampler::new(&volume, wgpu)?;
            let image = resampler.reform(path, ReformationMode::Panoramic).await?;
            save(&image, "panoramic_gpu.png");
        }
        Err(err) => warn!(%err, "skipping gpu reformation"),
    }

    let flythrough = FlythroughParams::default();
    let waypoints: Vec<DVec3> = points.iter().map(|[x, y]| DVec3::new(*x, *y, 24.0)).collect();
    let mut animator = CameraAnimator::new(CameraPose::default(), flythrough.easing);
    animator.set_path(
        &waypoints,
        flythrough.resolve_steps_per_segment(waypoints.len()),
    );
    info!(
        frames = animator.total_steps(),
        interval_ms = flythrough.frame_interval().as_millis() as u64,
        "starting fly-through"
    );
    for _ in 0..animator.total_steps() {
        if !animator.step(flythrough.looping) {
            break;
        }
        if animator.current_index() % 20 == 0 {
            let pose = animator.camera();
            info!(
                progress = animator.progress(),
                position = ?pose.position,
                clip_plane = ?pose.clip_plane(0.1),
                "camera"
            );
        }
    }

    Ok(())
}

fn save(image: &image::GrayImage, path: &str) {
    match image.save(path) {
        Ok(()) => info!(path, width = image.width(), height = image.height(), "saved image"),
        Err(err) => warn!(%err, path, "failed to save image"),
    }
}
