//! # Throughput Monitoring
//!
//! Counts simulation ticks and presented frames and reports both once per
//! elapsed second:
//!
//! ```text
//! 58 fps - 1764 ticks/s
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use gpu_life::performance::ThroughputMonitor;
//! use std::time::Instant;
//!
//! let mut monitor = ThroughputMonitor::new(Instant::now());
//!
//! // In your main loop
//! monitor.record_tick();
//! monitor.record_frame();
//! if let Some(report) = monitor.poll(Instant::now()) {
//!     println!("{report}");
//! }
//! ```
//!
//! Reporting is purely observational; nothing in the loop depends on it.

use std::fmt;
use std::time::{Duration, Instant};

/// Counts gathered over one reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThroughputReport {
    /// Presentations in the window
    pub frames: u32,
    /// Simulation steps in the window
    pub ticks: u32,
}

impl fmt::Display for ThroughputReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fps - {} ticks/s", self.frames, self.ticks)
    }
}

pub struct ThroughputMonitor {
    window_start: Instant,
    /// Length of a reporting window
    window: Duration,
    frames: u32,
    ticks: u32,
    last_report: Option<ThroughputReport>,
}

impl ThroughputMonitor {
    pub fn new(now: Instant) -> Self {
        Self::with_window(now, Duration::from_secs(1))
    }

    pub fn with_window(now: Instant, window: Duration) -> Self {
        Self {
            window_start: now,
            window,
            frames: 0,
            ticks: 0,
            last_report: None,
        }
    }

    pub fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn record_frame(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    /// Close the window once more than its length has elapsed.
    ///
    /// Logs and returns the finished window's counts, then starts a new
    /// window at `now` with both counts cleared.
    pub fn poll(&mut self, now: Instant) -> Option<ThroughputReport> {
        if now.saturating_duration_since(self.window_start) <= self.window {
            return None;
        }

        let report = ThroughputReport {
            frames: self.frames,
            ticks: self.ticks,
        };
        log::info!("{report}");

        self.window_start = now;
        self.frames = 0;
        self.ticks = 0;
        self.last_report = Some(report);
        Some(report)
    }

    /// Most recently completed window
    pub fn last_report(&self) -> Option<ThroughputReport> {
        self.last_report
    }
}
