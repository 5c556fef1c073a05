// src/wgpu_utils/uniform_buffer.rs
use wgpu::util::DeviceExt;

/// A uniform buffer holding exactly one `Content`, which it mirrors on the
/// CPU so unchanged values are never re-uploaded.
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content: Content,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    /// Create the buffer already holding `content`
    pub fn new_with_data(device: &wgpu::Device, label: &str, content: &Content) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(content),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            buffer,
            content: *content,
        }
    }

    /// Queue a write if `content` differs bytewise from what the GPU holds.
    /// Returns whether a write was queued.
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) -> bool {
        if bytemuck::bytes_of(&self.content) == bytemuck::bytes_of(&content) {
            return false;
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&content));
        self.content = content;
        true
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }
}
