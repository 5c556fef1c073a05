//! Transition kernel: one generation per dispatch

use crate::error::Result;
use crate::wgpu_utils::binding_types::{image_2d, itexture_2d, layout_entry, uniform};
use crate::wgpu_utils::shader_source::ShaderSource;
use crate::wgpu_utils::UniformBuffer;

use super::gpu::{create_compute_pipeline, workgroup_count};
use super::grid_buffer::{BufferPair, GridBuffer, Role};
use super::rule::{Rule, RuleUniform};

pub struct TransitionKernel {
    pipeline: wgpu::ComputePipeline,
    /// Index `i` reads world buffer `i` and writes the other one
    bind_groups: [wgpu::BindGroup; 2],
    _rule: UniformBuffer<RuleUniform>,
    workgroups: (u32, u32, u32),
}

impl TransitionKernel {
    pub fn new(
        device: &wgpu::Device,
        pair: &BufferPair,
        source: &ShaderSource,
        rule: Rule,
    ) -> Result<Self> {
        let stages = wgpu::ShaderStages::COMPUTE;
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Transition Bind Group Layout"),
            entries: &[
                layout_entry(0, stages, itexture_2d()),
                layout_entry(
                    1,
                    stages,
                    image_2d(GridBuffer::FORMAT, wgpu::StorageTextureAccess::WriteOnly),
                ),
                layout_entry(2, stages, uniform()),
            ],
        });

        let pipeline = create_compute_pipeline(device, source, "main", &bind_group_layout)?;
        let rule_buffer =
            UniformBuffer::new_with_data(device, "Rule Uniform", &RuleUniform::from(rule));

        let [buffer_0, buffer_1] = pair.buffers();
        let bind_group = |input: &GridBuffer, output: &GridBuffer, label: &str| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(input.view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(output.view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: rule_buffer.binding_resource(),
                    },
                ],
            })
        };
        let bind_groups = [
            bind_group(buffer_0, buffer_1, "Transition Bind Group 0->1"),
            bind_group(buffer_1, buffer_0, "Transition Bind Group 1->0"),
        ];

        log::debug!("transition kernel ready, rule {rule}");

        Ok(Self {
            pipeline,
            bind_groups,
            _rule: rule_buffer,
            workgroups: workgroup_count(pair.extent()),
        })
    }

    /// Record one dispatch reading the pair's current input buffer.
    ///
    /// The compute pass ends before this returns; wgpu orders it ahead of
    /// every later pass that reads the output buffer.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, pair: &BufferPair) {
        let bind_group = &self.bind_groups[pair.binding_index(Role::Input)];

        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Transition Pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&self.pipeline);
        compute_pass.set_bind_group(0, bind_group, &[]);
        compute_pass.dispatch_workgroups(self.workgroups.0, self.workgroups.1, self.workgroups.2);
    }
}
