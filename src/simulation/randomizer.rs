//! One-shot randomizer kernel
//!
//! Fills the buffer holding the input role before the first step. The
//! kernel is consumed by [`RandomizerKernel::run`], so it cannot be
//! dispatched twice.

use crate::error::Result;
use crate::wgpu_utils::binding_types::{image_2d, layout_entry, uniform};
use crate::wgpu_utils::shader_source::ShaderSource;
use crate::wgpu_utils::UniformBuffer;

use super::gpu::{create_compute_pipeline, workgroup_count};
use super::grid_buffer::{BufferPair, GridBuffer, Role};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedParams {
    pub seed: u32,
    /// Probability that a cell starts live
    pub density: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SeedUniform {
    pub seed: u32,
    pub threshold: u32,
    pub _padding: [u32; 2],
}

impl From<SeedParams> for SeedUniform {
    fn from(params: SeedParams) -> Self {
        Self {
            seed: params.seed,
            threshold: density_threshold(params.density),
            _padding: [0; 2],
        }
    }
}

/// Hash threshold below which a cell is live
pub fn density_threshold(density: f32) -> u32 {
    let scaled = density.clamp(0.0, 1.0) as f64 * 4_294_967_296.0;
    scaled.min(u32::MAX as f64) as u32
}

pub struct RandomizerKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl RandomizerKernel {
    pub fn new(device: &wgpu::Device, source: &ShaderSource) -> Result<Self> {
        let stages = wgpu::ShaderStages::COMPUTE;
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Randomizer Bind Group Layout"),
            entries: &[
                layout_entry(
                    0,
                    stages,
                    image_2d(GridBuffer::FORMAT, wgpu::StorageTextureAccess::WriteOnly),
                ),
                layout_entry(1, stages, uniform()),
            ],
        });
        let pipeline = create_compute_pipeline(device, source, "main", &bind_group_layout)?;

        Ok(Self {
            pipeline,
            bind_group_layout,
        })
    }

    /// Seed the input buffer and wait until the writes have landed
    pub fn run(
        self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pair: &BufferPair,
        params: SeedParams,
    ) {
        let target = pair.bind(Role::Input);
        let seed_buffer =
            UniformBuffer::new_with_data(device, "Seed Uniform", &SeedUniform::from(params));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Randomizer Bind Group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(target.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: seed_buffer.binding_resource(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Randomizer Encoder"),
        });
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Randomizer Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &bind_group, &[]);
            let (x, y, z) = workgroup_count(pair.extent());
            compute_pass.dispatch_workgroups(x, y, z);
        }
        queue.submit(std::iter::once(encoder.finish()));

        // full barrier: nothing reads the grid until seeding is complete
        if let Err(err) = device.poll(wgpu::PollType::Wait) {
            log::warn!("waiting for randomizer failed: {err}");
        }

        log::info!(
            "seeded world buffer {} (seed {}, density {:.2})",
            pair.binding_index(Role::Input),
            params.seed,
            params.density
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds() {
        assert_eq!(density_threshold(0.0), 0);
        assert_eq!(density_threshold(1.0), u32::MAX);
        assert_eq!(density_threshold(0.5), 1 << 31);
    }

    #[test]
    fn test_threshold_clamps_out_of_range() {
        assert_eq!(density_threshold(-1.0), 0);
        assert_eq!(density_threshold(3.0), u32::MAX);
    }
}
