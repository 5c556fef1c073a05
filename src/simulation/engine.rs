//! The double-buffered simulation engine

use std::sync::Arc;

use crate::config::LifeConfig;
use crate::error::Result;
use crate::gfx::GpuContext;
use crate::wgpu_utils::shader_source::{ShaderKind, ShaderSource};

use super::grid_buffer::{BufferPair, GridBuffer, Role};
use super::randomizer::{RandomizerKernel, SeedParams};
use super::transition::TransitionKernel;

/// Owns the world buffers and the transition kernel.
///
/// Every call to [`step`](Self::step) submits exactly one dispatch and then
/// swaps roles, so [`current`](Self::current) always holds the newest
/// generation.
pub struct LifeSimulation {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pair: BufferPair,
    transition: TransitionKernel,
}

impl LifeSimulation {
    /// Build the engine and seed it with the randomizer kernel
    pub fn new(gpu: &GpuContext, config: &LifeConfig) -> Result<Self> {
        let simulation = Self::build(gpu, config)?;

        let source = ShaderSource::load(ShaderKind::Randomizer, config.shader_dir.as_deref())?
            .specialize(config.grid, config.edges);
        let randomizer = RandomizerKernel::new(&simulation.device, &source)?;
        let params = SeedParams {
            seed: config.seed.unwrap_or_else(rand::random),
            density: config.density,
        };
        randomizer.run(&simulation.device, &simulation.queue, &simulation.pair, params);

        Ok(simulation)
    }

    /// Build the engine with a known starting pattern instead of random cells
    pub fn from_cells(gpu: &GpuContext, config: &LifeConfig, cells: &[i32]) -> Result<Self> {
        let simulation = Self::build(gpu, config)?;
        simulation
            .pair
            .bind(Role::Input)
            .write_cells(&simulation.queue, cells)?;
        if let Err(err) = simulation.device.poll(wgpu::PollType::Wait) {
            log::warn!("waiting for pattern upload failed: {err}");
        }
        Ok(simulation)
    }

    fn build(gpu: &GpuContext, config: &LifeConfig) -> Result<Self> {
        config.validate()?;
        gpu.check_grid(config.grid)?;

        let device = gpu.device().clone();
        let queue = gpu.queue().clone();
        let pair = BufferPair::new(&device, config.grid);

        let source = ShaderSource::load(ShaderKind::Transition, config.shader_dir.as_deref())?
            .specialize(config.grid, config.edges);
        let transition = TransitionKernel::new(&device, &pair, &source, config.rule)?;

        Ok(Self {
            device,
            queue,
            pair,
            transition,
        })
    }

    /// One tick: dispatch, barrier, role swap
    pub fn step(&mut self) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Transition Encoder"),
            });
        self.transition.encode(&mut encoder, &self.pair);
        self.queue.submit(std::iter::once(encoder.finish()));

        self.pair.swap();
    }

    /// Buffer holding the newest generation
    pub fn current(&self) -> &GridBuffer {
        self.pair.bind(Role::Input)
    }

    pub fn read_current(&self) -> Result<Vec<i32>> {
        self.current().read_cells(&self.device, &self.queue)
    }

    pub fn generation(&self) -> u64 {
        self.pair.steps()
    }

    pub fn pair(&self) -> &BufferPair {
        &self.pair
    }
}
