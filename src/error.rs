//! Error types for drape.
//!
//! The physics step itself never fails. Everything here is a startup
//! concern: bad configuration, GPU initialization, window creation, or the
//! input device refusing to open.

use std::fmt;
use std::path::PathBuf;

/// Errors produced while validating or loading a [`ClothConfig`](crate::ClothConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The grid needs at least 2 cells along each axis.
    GridTooSmall { cols: usize, rows: usize },
    /// A scalar parameter must be positive and finite.
    NotPositive { name: &'static str, value: f32 },
    /// A parameter must be finite.
    NotFinite { name: &'static str },
    /// A pinned index lies outside the point grid.
    PinOutOfBounds { index: usize, count: usize },
    /// Failed to read or write a config file.
    Io { path: PathBuf, source: std::io::Error },
    /// Config file is not valid JSON for [`ClothConfig`](crate::ClothConfig).
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::GridTooSmall { cols, rows } => write!(
                f,
                "Cloth grid must have at least 2x2 cells, got {}x{}",
                cols, rows
            ),
            ConfigError::NotPositive { name, value } => {
                write!(f, "`{}` must be positive and finite, got {}", name, value)
            }
            ConfigError::NotFinite { name } => write!(f, "`{}` must be finite", name),
            ConfigError::PinOutOfBounds { index, count } => write!(
                f,
                "Pinned point {} is out of bounds (cloth has {} points)",
                index, count
            ),
            ConfigError::Io { path, source } => {
                write!(f, "Failed to access config file {}: {}", path.display(), source)
            }
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// Surface reports no usable texture format.
    NoSurfaceFormat,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::NoSurfaceFormat => write!(f, "Surface does not support any texture format"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
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

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors reported by a [`HapticDevice`](crate::device::HapticDevice).
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// The device could not be opened.
    Open(String),
    /// Calibration failed.
    Calibrate(String),
    /// The sampling thread could not be spawned.
    Spawn(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Open(msg) => write!(f, "Failed to open input device: {}", msg),
            DeviceError::Calibrate(msg) => write!(f, "Failed to calibrate input device: {}", msg),
            DeviceError::Spawn(msg) => write!(f, "Failed to start device sampling thread: {}", msg),
        }
    }
}

impl std::error::Error for DeviceError {}

/// Errors that can occur when running the simulator.
#[derive(Debug)]
pub enum SimulationError {
    /// Failed to create or run the event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Input device failed to start.
    Device(DeviceError),
    /// Configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            SimulationError::Window(e) => write!(f, "Failed to create window: {}", e),
            SimulationError::Gpu(e) => write!(f, "GPU error: {}", e),
            SimulationError::Device(e) => write!(f, "Device error: {}", e),
            SimulationError::Config(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::EventLoop(e) => Some(e),
            SimulationError::Window(e) => Some(e),
            SimulationError::Gpu(e) => Some(e),
            SimulationError::Device(e) => Some(e),
            SimulationError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for SimulationError {
    fn from(e: winit::error::EventLoopError) -> Self {
        SimulationError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for SimulationError {
    fn from(e: winit::error::OsError) -> Self {
        SimulationError::Window(e)
    }
}

impl From<GpuError> for SimulationError {
    fn from(e: GpuError) -> Self {
        SimulationError::Gpu(e)
    }
}

impl From<DeviceError> for SimulationError {
    fn from(e: DeviceError) -> Self {
        SimulationError::Device(e)
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        SimulationError::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error_messages() {
        let e = ConfigError::GridTooSmall { cols: 1, rows: 5 };
        assert!(e.to_string().contains("1x5"));

        let e = ConfigError::NotPositive { name: "mass", value: -1.0 };
        assert!(e.to_string().contains("mass"));
    }

    #[test]
    fn test_simulation_error_source_chain() {
        let e = SimulationError::from(ConfigError::NotFinite { name: "gravity" });
        assert!(e.to_string().contains("gravity"));
        assert!(e.source().is_some());
    }
}
