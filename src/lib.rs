// src/lib.rs
//! GPU Game of Life
//!
//! Conway's Game of Life stepped by wgpu compute shaders over a pair of
//! ping-pong world textures, drawn to a winit window every few ticks.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod performance;
pub mod prelude;
pub mod scheduler;
pub mod simulation;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::LifeApp;
pub use config::LifeConfig;
pub use error::LifeError;
pub use simulation::LifeSimulation;

/// Creates an application with the default configuration
pub fn default() -> LifeApp {
    LifeApp::new(LifeConfig::default())
}
