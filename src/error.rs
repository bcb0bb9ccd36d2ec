use thiserror::Error;

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("At least 2 control points are required, found {found}")]
    InsufficientPoints { found: usize },

    #[error("Volume has no samples")]
    EmptyVolume,

    #[error("Invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: usize },

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Failed to request GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("GPU buffer of {bytes} bytes exceeds the storage binding limit of {limit} bytes")]
    GpuBufferTooLarge { bytes: u64, limit: u64 },

    #[error("GPU readback failed: {0}")]
    GpuReadback(#[from] wgpu::BufferAsyncError),

    #[error("GPU readback was canceled")]
    GpuCanceled(#[from] futures::channel::oneshot::Canceled),
}

pub type Result<T> = std::result::Result<T, SamplingError>;
