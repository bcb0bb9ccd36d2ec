use std::borrow::Cow;

use image::GrayImage;
use ndarray::Array2;
use tracing::{debug, warn};
use web_time::Instant;
use wgpu::{PollType, util::DeviceExt};

use crate::error::{Result, SamplingError};
use crate::reformat::{self, CurvedPath, ReformationMode, SliceGrid};
use crate::volume::Volume;

pub struct WGPU {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl WGPU {
    /// Open the default adapter and device
    pub async fn request() -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .map_err(|_| SamplingError::NoAdapter)?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await?;
        Ok(Self { device, queue })
    }
}

/// Trilinear resampler running as a compute shader.
///
/// The volume is uploaded once as a storage buffer; every [`SliceGrid`] is
/// sampled with the same fill and clamping rules as [`Volume::resample`].
pub struct GpuResampler {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    volume_buffer: wgpu::Buffer,
    dimensions: (u32, u32, u32), // (depth, height, width)
    fill: f32,
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    rows: u32,
    cols: u32,
    depth: u32,
    height: u32,
    width: u32,
    fill: f32,
    _padding: [u32; 2],
}

const WORKGROUP_SIZE: u32 = 8;

impl GpuResampler {
    pub fn new(volume: &Volume, wgpu: WGPU) -> Result<Self> {
        if volume.is_empty() {
            return Err(SamplingError::EmptyVolume);
        }
        let (depth, height, width) = volume.dim();
        let WGPU { device, queue } = wgpu;

        let samples: Cow<'_, [f32]> = match volume.data().as_slice() {
            Some(samples) => Cow::Borrowed(samples),
            None => Cow::Owned(volume.data().iter().copied().collect()),
        };
        Self::check_binding_size(&device, samples.len())?;

        let volume_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Volume Buffer"),
            contents: bytemuck::cast_slice(&samples),
            usage: wgpu::BufferUsages::STORAGE,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Trilinear Resample Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "shaders/trilinear_resample.wgsl"
            ))),
        });

        let storage_entry = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Trilinear Resample Bind Group Layout"),
            entries: &[
                // Volume samples
                storage_entry(0, true),
                // Grid coordinates
                storage_entry(1, true),
                // Output samples
                storage_entry(2, false),
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Trilinear Resample Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Trilinear Resample Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            volume_buffer,
            dimensions: (depth as u32, height as u32, width as u32),
            fill: volume.min_value(),
        })
    }

    fn check_binding_size(device: &wgpu::Device, floats: usize) -> Result<()> {
        let bytes = (floats * std::mem::size_of::<f32>()) as u64;
        let limit = u64::from(device.limits().max_storage_buffer_binding_size);
        if bytes > limit {
            return Err(SamplingError::GpuBufferTooLarge { bytes, limit });
        }
        Ok(())
    }

    /// Get the dimensions of the uploaded volume (depth, height, width)
    pub fn dimensions(&self) -> (u32, u32, u32) {
        self.dimensions
    }

    pub async fn resample(&self, grid: &SliceGrid) -> Result<Array2<f32>> {
        let started = Instant::now();
        let (rows, cols) = (grid.rows(), grid.cols());
        let output_size = rows * cols;
        if output_size == 0 {
            return Ok(Array2::zeros((rows, cols)));
        }

        let coords: Cow<'_, [f32]> = match grid.coords().as_slice() {
            Some(coords) => Cow::Borrowed(coords),
            None => Cow::Owned(grid.coords().iter().copied().collect()),
        };
        Self::check_binding_size(&self.device, coords.len())?;
        Self::check_binding_size(&self.device, output_size)?;

        let uniforms = Uniforms {
            rows: rows as u32,
            cols: cols as u32,
            depth: self.dimensions.0,
            height: self.dimensions.1,
            width: self.dimensions.2,
            fill: self.fill,
            _padding: [0; 2],
        };
        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Uniform Buffer"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        let coords_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Grid Coordinates Buffer"),
                contents: bytemuck::cast_slice(&coords),
                usage: wgpu::BufferUsages::STORAGE,
            });
        let output_bytes = (output_size * std::mem::size_of::<f32>()) as u64;
        let output_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Output Buffer"),
            size: output_bytes,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let staging_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Staging Buffer"),
            size: output_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Trilinear Resample Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.volume_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: coords_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: output_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Trilinear Resample Encoder"),
            });
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Trilinear Resample Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &bind_group, &[]);
            let dispatch_x = (cols as u32).div_ceil(WORKGROUP_SIZE);
            let dispatch_y = (rows as u32).div_ceil(WORKGROUP_SIZE);
            compute_pass.dispatch_workgroups(dispatch_x, dispatch_y, 1);
        }
        encoder.copy_buffer_to_buffer(&output_buffer, 0, &staging_buffer, 0, output_bytes);
        self.queue.submit(Some(encoder.finish()));

        let buffer_slice = staging_buffer.slice(..);
        let (sender, receiver) = futures::channel::oneshot::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        if let Err(err) = self.device.poll(PollType::Wait {
            submission_index: None,
            timeout: None,
        }) {
            warn!(%err, "device poll failed while waiting for resample readback");
        }
        receiver.await??;

        let data = buffer_slice.get_mapped_range();
        let pixel_data: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging_buffer.unmap();

        debug!(
            rows,
            cols,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "resampled slice grid on gpu"
        );
        Ok(Array2::from_shape_vec((rows, cols), pixel_data)?)
    }

    /// GPU counterpart of [`reformat::reform`]
    pub async fn reform(&self, path: &CurvedPath, mode: ReformationMode) -> Result<GrayImage> {
        let grid = path.grid(mode, self.dimensions.0 as usize)?;
        let samples = self.resample(&grid).await?;
        reformat::to_display_image(&samples)
    }
}
