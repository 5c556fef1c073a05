//! Compute pipeline helpers shared by the kernels

use crate::error::Result;
use crate::wgpu_utils::shader_source::{validated, ShaderSource};

use super::GridExtent;

/// Workgroup tile, must match `@workgroup_size` in the kernels
pub const TILE_SIZE: (u32, u32) = (8, 8);

/// Workgroups needed to cover the grid; partial tiles are clipped in the
/// kernels
pub fn workgroup_count(extent: GridExtent) -> (u32, u32, u32) {
    (
        extent.width.div_ceil(TILE_SIZE.0),
        extent.height.div_ceil(TILE_SIZE.1),
        1,
    )
}

/// Create a compute pipeline from shader source with an explicit layout
pub fn create_compute_pipeline(
    device: &wgpu::Device,
    source: &ShaderSource,
    entry_point: &str,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> Result<wgpu::ComputePipeline> {
    let label = source.kind().label();
    let shader = source.compile(device)?;

    validated(device, label, || {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            cache: None,
        })
    })
}
