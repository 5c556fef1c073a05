//! # Graphics Module
//!
//! GPU device setup and the presentation pass.
//!
//! - **GPU Context** ([`gpu_context`]) - adapter and device, windowed or headless
//! - **Presenter** ([`presenter`]) - draws the current world buffer with aspect correction

pub mod gpu_context;
pub mod presenter;

// Re-export commonly used types
pub use gpu_context::GpuContext;
pub use presenter::{AspectRatio, Presenter, ResizeEvent};
