//! Error types for GPU setup and the buffer-exchange protocol.

use std::fmt;

use particle_physics::StepError;

/// Errors that can occur while setting up or talking to the GPU.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    AdapterRequest(wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The physics kernel did not compile; carries the compiler output.
    KernelCompile(String),
    /// Blocking on queued GPU work failed.
    DeviceWait(String),
    /// Failed to map a staging buffer for reading.
    BufferMapping(String),
    /// Downloading step results from the device failed.
    Readback(String),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::AdapterRequest(e) => write!(
                f,
                "No compatible GPU adapter found ({}). Ensure your system has Vulkan/Metal/DX12 support.",
                e
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::KernelCompile(log) => {
                write!(f, "Physics kernel failed to compile:\n{}", log)
            }
            GpuError::DeviceWait(msg) => write!(f, "Waiting for GPU work failed: {}", msg),
            GpuError::BufferMapping(msg) => write!(f, "Failed to map GPU buffer: {}", msg),
            GpuError::Readback(msg) => write!(f, "Failed to read step results back: {}", msg),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::AdapterRequest(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestAdapterError> for GpuError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        GpuError::AdapterRequest(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

impl From<GpuError> for StepError {
    fn from(e: GpuError) -> Self {
        StepError::Device(e.to_string())
    }
}
