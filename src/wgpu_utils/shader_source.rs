// src/wgpu_utils/shader_source.rs
//! WGSL source loading and specialization
//!
//! Kernel sources refer to the grid size through the `BUFFER_WIDTH` and
//! `BUFFER_HEIGHT` tokens and to the edge policy through `EDGE_WRAP`. They
//! are replaced with literals before compilation so the shaders see them as
//! constants.

use std::path::Path;

use crate::error::{LifeError, Result};
use crate::simulation::rule::EdgePolicy;
use crate::simulation::GridExtent;

pub const WIDTH_TOKEN: &str = "BUFFER_WIDTH";
pub const HEIGHT_TOKEN: &str = "BUFFER_HEIGHT";
pub const EDGE_TOKEN: &str = "EDGE_WRAP";

/// The three programs the engine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    Transition,
    Randomizer,
    Present,
}

impl ShaderKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ShaderKind::Transition => "transition.wgsl",
            ShaderKind::Randomizer => "randomizer.wgsl",
            ShaderKind::Present => "present.wgsl",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShaderKind::Transition => "Transition Kernel",
            ShaderKind::Randomizer => "Randomizer Kernel",
            ShaderKind::Present => "Presentation Shader",
        }
    }

    fn embedded(self) -> &'static str {
        match self {
            ShaderKind::Transition => include_str!("../shaders/transition.wgsl"),
            ShaderKind::Randomizer => include_str!("../shaders/randomizer.wgsl"),
            ShaderKind::Present => include_str!("../shaders/present.wgsl"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShaderSource {
    kind: ShaderKind,
    text: String,
}

impl ShaderSource {
    pub fn embedded(kind: ShaderKind) -> Self {
        Self {
            kind,
            text: kind.embedded().to_string(),
        }
    }

    /// Read `<dir>/<file_name>` if a directory is given, otherwise fall back
    /// to the source compiled into the binary
    pub fn load(kind: ShaderKind, dir: Option<&Path>) -> Result<Self> {
        let Some(dir) = dir else {
            return Ok(Self::embedded(kind));
        };

        let path = dir.join(kind.file_name());
        let text = std::fs::read_to_string(&path)
            .map_err(|source| LifeError::ShaderIo { path: path.clone(), source })?;
        log::info!("loaded {} from {}", kind.label(), path.display());
        Ok(Self { kind, text })
    }

    /// Substitute grid dimensions and edge policy
    pub fn specialize(mut self, extent: GridExtent, edges: EdgePolicy) -> Self {
        self.text = self
            .text
            .replace(WIDTH_TOKEN, &extent.width.to_string())
            .replace(HEIGHT_TOKEN, &extent.height.to_string())
            .replace(EDGE_TOKEN, edges.wgsl_literal());
        self
    }

    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Compile into a module, failing instead of panicking on invalid WGSL
    pub fn compile(&self, device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
        validated(device, self.kind.label(), || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(self.kind.label()),
                source: wgpu::ShaderSource::Wgsl(self.text.as_str().into()),
            })
        })
    }
}

/// Run `create` inside a validation error scope.
///
/// wgpu reports shader and pipeline errors asynchronously; without a scope
/// they would reach the uncaptured-error handler and only be logged.
pub fn validated<T>(device: &wgpu::Device, label: &str, create: impl FnOnce() -> T) -> Result<T> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(LifeError::ShaderCompile {
            label: label.to_string(),
            message: error.to_string(),
        }),
        None => Ok(value),
    }
}
