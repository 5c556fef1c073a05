//! Tick/draw scheduling
//!
//! Every loop iteration advances the simulation by one tick. Only every
//! `ticks_per_frame`-th iteration also presents and polls window events.
//! The loop never sleeps; the only waits are the ones the GPU imposes.

use std::num::NonZeroU32;
use std::time::Instant;

use crate::error::Result;
use crate::performance::ThroughputMonitor;

/// Decides which ticks are followed by a presentation
#[derive(Debug, Clone)]
pub struct TickScheduler {
    ticks_per_frame: NonZeroU32,
    ticks_in_frame: u32,
}

impl TickScheduler {
    pub fn new(ticks_per_frame: NonZeroU32) -> Self {
        Self {
            ticks_per_frame,
            ticks_in_frame: 0,
        }
    }

    /// Count one tick. Returns `true` when this tick completes a frame, in
    /// which case the counter is already back at zero.
    pub fn tick(&mut self) -> bool {
        self.ticks_in_frame += 1;
        if self.ticks_in_frame >= self.ticks_per_frame.get() {
            self.ticks_in_frame = 0;
            true
        } else {
            false
        }
    }

    pub fn ticks_in_frame(&self) -> u32 {
        self.ticks_in_frame
    }
}

/// What the loop drives each iteration
pub trait LoopDriver {
    /// Dispatch one generation, wait for the barrier, swap roles
    fn step(&mut self);

    /// Draw the current generation and present it
    fn present(&mut self) -> Result<()>;

    /// Let the window deliver pending events
    fn poll_events(&mut self);

    /// Checked once per iteration, before the step
    fn stop_requested(&self) -> bool;
}

/// Totals over a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopSummary {
    pub ticks: u64,
    pub frames: u64,
}

/// Run until the driver reports a stop request.
///
/// A present error ends the loop; everything else keeps going.
pub fn run_loop<D: LoopDriver>(
    driver: &mut D,
    scheduler: &mut TickScheduler,
    monitor: &mut ThroughputMonitor,
) -> Result<LoopSummary> {
    let mut summary = LoopSummary::default();

    while !driver.stop_requested() {
        driver.step();
        summary.ticks += 1;
        monitor.record_tick();

        if scheduler.tick() {
            driver.present()?;
            driver.poll_events();
            summary.frames += 1;
            monitor.record_frame();
        }

        monitor.poll(Instant::now());
    }

    log::info!(
        "loop stopped after {} ticks and {} frames",
        summary.ticks,
        summary.frames
    );
    Ok(summary)
}
