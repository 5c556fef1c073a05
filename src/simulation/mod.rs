// src/simulation/mod.rs
//! Simulation engine
//!
//! Two world buffers trade input/output roles every step while the
//! transition kernel writes the next generation from one into the other.
//! Nothing here touches cell data on the CPU except explicit pattern loads
//! and readbacks.

pub mod engine;
pub mod gpu;
pub mod grid_buffer;
pub mod randomizer;
pub mod rule;
pub mod transition;

pub use engine::LifeSimulation;
pub use grid_buffer::{BufferPair, GridBuffer, Role};
pub use rule::{EdgePolicy, Rule};

/// Fixed size of both world buffers, in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridExtent {
    pub width: u32,
    pub height: u32,
}

impl GridExtent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major index of `(x, y)`
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn to_extent3d(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}
