//! Grid buffers and the ping-pong pair
//!
//! Each grid buffer is an `R32Sint` texture holding one generation. The
//! kernels read it as a sampled integer texture and write it as a write-only
//! storage image, so a single texture serves both roles depending on which
//! bind group is active.

use crate::error::{LifeError, Result};

use super::GridExtent;

/// Which side of a simulation step a buffer sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Read by the current step, and by the presentation pass
    Input,
    /// Fully overwritten by the current step
    Output,
}

/// One generation of cells in GPU memory
pub struct GridBuffer {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    extent: GridExtent,
}

impl GridBuffer {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Sint;
    const BYTES_PER_CELL: u32 = 4;

    pub fn new(device: &wgpu::Device, extent: GridExtent, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent.to_extent3d(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            extent,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    /// Overwrite the whole grid from row-major cell states.
    ///
    /// Only used to load known patterns; normal seeding happens on the GPU.
    pub fn write_cells(&self, queue: &wgpu::Queue, cells: &[i32]) -> Result<()> {
        let expected = self.extent.cell_count();
        if cells.len() != expected {
            return Err(LifeError::PatternSize {
                expected,
                actual: cells.len(),
            });
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(cells),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.extent.width * Self::BYTES_PER_CELL),
                rows_per_image: Some(self.extent.height),
            },
            self.extent.to_extent3d(),
        );
        Ok(())
    }

    /// Copy the grid back to the CPU (blocking)
    pub fn read_cells(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Vec<i32>> {
        let unpadded_row = self.extent.width * Self::BYTES_PER_CELL;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row = unpadded_row.div_ceil(align) * align;
        let size = padded_row as u64 * self.extent.height as u64;

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Grid Readback Buffer"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Grid Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(self.extent.height),
                },
            },
            self.extent.to_extent3d(),
        );
        queue.submit(std::iter::once(encoder.finish()));

        let slice = staging_buffer.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        if let Err(err) = device.poll(wgpu::PollType::Wait) {
            log::warn!("device poll during readback failed: {err}");
        }

        futures::executor::block_on(rx)
            .unwrap_or(Err(wgpu::BufferAsyncError))?;

        let cells = {
            let mapped = slice.get_mapped_range();
            mapped
                .chunks(padded_row as usize)
                .flat_map(|row| {
                    bytemuck::cast_slice::<u8, i32>(&row[..unpadded_row as usize]).to_vec()
                })
                .collect()
        };
        staging_buffer.unmap();
        Ok(cells)
    }
}

/// Role bookkeeping for a pair of buffers: an index naming the input side.
///
/// Kept apart from the textures so the alternation can be reasoned about
/// without a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PingPong {
    input: usize,
    swaps: u64,
}

impl PingPong {
    pub fn index_of(&self, role: Role) -> usize {
        match role {
            Role::Input => self.input,
            Role::Output => 1 - self.input,
        }
    }

    pub fn swap(&mut self) {
        self.input ^= 1;
        self.swaps += 1;
    }

    pub fn swaps(&self) -> u64 {
        self.swaps
    }
}

/// Two grid buffers plus the index of the one currently holding the input
/// role. Buffer 0 starts as input.
pub struct BufferPair {
    buffers: [GridBuffer; 2],
    roles: PingPong,
}

impl BufferPair {
    pub fn new(device: &wgpu::Device, extent: GridExtent) -> Self {
        log::debug!("allocating world buffers {}x{}", extent.width, extent.height);
        Self {
            buffers: [
                GridBuffer::new(device, extent, "World Buffer 0"),
                GridBuffer::new(device, extent, "World Buffer 1"),
            ],
            roles: PingPong::default(),
        }
    }

    /// Buffer currently holding `role`.
    ///
    /// Kernels bind the input buffer at binding 0 and the output buffer at
    /// binding 1.
    pub fn bind(&self, role: Role) -> &GridBuffer {
        &self.buffers[self.roles.index_of(role)]
    }

    /// Arena index of the buffer currently holding `role`
    pub fn binding_index(&self, role: Role) -> usize {
        self.roles.index_of(role)
    }

    /// Exchange input and output roles. No data moves.
    pub fn swap(&mut self) {
        self.roles.swap();
    }

    /// Number of swaps so far, which is also the generation shown by the
    /// input buffer
    pub fn steps(&self) -> u64 {
        self.roles.swaps()
    }

    pub fn buffers(&self) -> &[GridBuffer; 2] {
        &self.buffers
    }

    pub fn extent(&self) -> GridExtent {
        self.buffers[0].extent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_start_on_buffer_zero() {
        let roles = PingPong::default();
        assert_eq!(roles.index_of(Role::Input), 0);
        assert_eq!(roles.index_of(Role::Output), 1);
        assert_eq!(roles.swaps(), 0);
    }

    #[test]
    fn test_roles_alternate_every_step() {
        let mut roles = PingPong::default();
        for _ in 0..100 {
            let input = roles.index_of(Role::Input);
            let output = roles.index_of(Role::Output);
            assert_ne!(input, output);

            roles.swap();

            assert_eq!(roles.index_of(Role::Output), input);
            assert_eq!(roles.index_of(Role::Input), output);
        }
        assert_eq!(roles.swaps(), 100);
    }
}
