//! # Prelude
//!
//! Commonly used types in one import.
//!
//! ```no_run
//! use gpu_life::prelude::*;
//!
//! fn main() -> Result<(), LifeError> {
//!     let config = LifeConfig {
//!         rule: Rule::highlife(),
//!         edges: EdgePolicy::Dead,
//!         ..LifeConfig::default()
//!     };
//!     let summary = LifeApp::new(config).run()?;
//!     println!("{} ticks, {} frames", summary.ticks, summary.frames);
//!     Ok(())
//! }
//! ```

// Re-export core application types
pub use crate::app::LifeApp;
pub use crate::config::{Command, LifeConfig};
pub use crate::default;
pub use crate::error::LifeError;

// Re-export simulation types
pub use crate::simulation::{BufferPair, EdgePolicy, GridExtent, LifeSimulation, Role, Rule};

// Re-export loop and graphics types
pub use crate::gfx::GpuContext;
pub use crate::performance::{ThroughputMonitor, ThroughputReport};
pub use crate::scheduler::{LoopDriver, LoopSummary, TickScheduler};
