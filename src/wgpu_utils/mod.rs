// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Binding layout shorthands, typed uniform buffers and shader loading.

pub mod binding_types;
pub mod shader_source;
pub mod uniform_buffer;

// Re-export main types
pub use binding_types::*;
pub use shader_source::{ShaderKind, ShaderSource};
pub use uniform_buffer::UniformBuffer;
