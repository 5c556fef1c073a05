//! Error types for the simulation engine
//!
//! Everything that can go wrong happens at startup: the window, the device,
//! or one of the shader programs. Once the loop is running, driver errors are
//! logged by the device's uncaptured-error handler and never surface here.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Exit status used when a kernel or render program fails to compile or link.
pub const SHADER_FAILURE_EXIT_CODE: u8 = 41;

/// Exit status for every other startup failure.
pub const STARTUP_FAILURE_EXIT_CODE: u8 = 1;

#[derive(Debug, Error)]
pub enum LifeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("grid {width}x{height} exceeds the device texture limit of {limit}")]
    GridTooLarge { width: u32, height: u32, limit: u32 },

    #[error("failed to compile {label}:\n{message}")]
    ShaderCompile { label: String, message: String },

    #[error("failed to read shader {path}: {source}")]
    ShaderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pattern has {actual} cells, grid needs {expected}")]
    PatternSize { expected: usize, actual: usize },

    #[error("surface supports no {0} for this adapter")]
    SurfaceIncompatible(&'static str),

    #[error("failed to read grid back from the GPU: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    #[error("surface ran out of memory while acquiring a frame")]
    SurfaceOutOfMemory,

    #[error("window closed before the GPU was initialized")]
    ClosedDuringStartup,
}

impl LifeError {
    /// Process exit status for this error.
    ///
    /// Compile and link failures get a distinguished status so scripts can
    /// tell a broken shader apart from a missing GPU.
    pub fn exit_code(&self) -> u8 {
        match self {
            LifeError::ShaderCompile { .. } | LifeError::ShaderIo { .. } => {
                SHADER_FAILURE_EXIT_CODE
            }
            _ => STARTUP_FAILURE_EXIT_CODE,
        }
    }
}

pub type Result<T> = std::result::Result<T, LifeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_errors_use_distinguished_exit_code() {
        let err = LifeError::ShaderCompile {
            label: "Transition Kernel".to_string(),
            message: "unknown identifier".to_string(),
        };
        assert_eq!(err.exit_code(), SHADER_FAILURE_EXIT_CODE);
        assert!(err.to_string().contains("Transition Kernel"));
    }

    #[test]
    fn test_other_errors_use_generic_exit_code() {
        assert_eq!(
            LifeError::SurfaceOutOfMemory.exit_code(),
            STARTUP_FAILURE_EXIT_CODE
        );
        assert_eq!(
            LifeError::Config(ConfigError::ZeroTicksPerFrame).exit_code(),
            STARTUP_FAILURE_EXIT_CODE
        );
        assert_eq!(
            LifeError::SurfaceIncompatible("texture formats").exit_code(),
            STARTUP_FAILURE_EXIT_CODE
        );
    }
}
