//! Presentation pipeline
//!
//! Draws whichever world buffer holds the input role as a full-screen quad.
//! Window size changes arrive as [`ResizeEvent`]s over a channel and are
//! applied at draw time.

use std::iter;
use std::sync::mpsc::Receiver;

use crate::error::{LifeError, Result};
use crate::simulation::{BufferPair, GridExtent, Role};
use crate::wgpu_utils::binding_types::{itexture_2d, layout_entry, uniform};
use crate::wgpu_utils::shader_source::{validated, ShaderSource};
use crate::wgpu_utils::UniformBuffer;

use super::GpuContext;

/// New framebuffer size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub width: u32,
    pub height: u32,
}

impl ResizeEvent {
    /// A minimized window reports a zero dimension and has nothing to draw on
    pub fn is_minimized(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// `(w / W) / (h / H)` for window size `(w, h)` and grid size `(W, H)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio(f32);

impl AspectRatio {
    pub fn new(window_width: u32, window_height: u32, grid: GridExtent) -> Self {
        if window_width == 0 || window_height == 0 {
            return Self(1.0);
        }
        let horizontal = window_width as f32 / grid.width as f32;
        let vertical = window_height as f32 / grid.height as f32;
        Self(horizontal / vertical)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Clip-space scale that letterboxes the grid instead of stretching it
    pub fn clip_scale(self) -> [f32; 2] {
        if self.0 > 1.0 {
            [1.0 / self.0, 1.0]
        } else {
            [1.0, self.0]
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self(1.0)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct ViewUniform {
    scale: [f32; 2],
    _padding: [f32; 2],
}

impl From<AspectRatio> for ViewUniform {
    fn from(aspect: AspectRatio) -> Self {
        Self {
            scale: aspect.clip_scale(),
            _padding: [0.0; 2],
        }
    }
}

/// Pick surface settings from what the adapter reports.
///
/// Prefers a linear format and immediate presentation so the swap does not
/// throttle the tick rate.
pub fn surface_configuration(
    capabilities: &wgpu::SurfaceCapabilities,
    (width, height): (u32, u32),
) -> Result<wgpu::SurfaceConfiguration> {
    let format = capabilities
        .formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| capabilities.formats.first().copied())
        .ok_or(LifeError::SurfaceIncompatible("texture formats"))?;
    let alpha_mode = capabilities
        .alpha_modes
        .first()
        .copied()
        .ok_or(LifeError::SurfaceIncompatible("alpha modes"))?;
    let present_mode = if capabilities
        .present_modes
        .contains(&wgpu::PresentMode::Immediate)
    {
        wgpu::PresentMode::Immediate
    } else {
        wgpu::PresentMode::Fifo
    };

    Ok(wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    })
}

/// Build the full-screen quad pipeline drawing into `format` targets
pub fn create_present_pipeline(
    device: &wgpu::Device,
    source: &ShaderSource,
    format: wgpu::TextureFormat,
) -> Result<(wgpu::RenderPipeline, wgpu::BindGroupLayout)> {
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Present Bind Group Layout"),
        entries: &[
            layout_entry(0, wgpu::ShaderStages::FRAGMENT, itexture_2d()),
            layout_entry(1, wgpu::ShaderStages::VERTEX, uniform()),
        ],
    });

    let shader = source.compile(device)?;
    let pipeline = validated(device, source.kind().label(), || {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Present Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Present Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        })
    })?;

    Ok((pipeline, bind_group_layout))
}

/// Newest size waiting on the channel, dropping the ones it supersedes
fn latest_resize(resizes: &Receiver<ResizeEvent>) -> Option<ResizeEvent> {
    resizes.try_iter().last()
}

pub struct Presenter {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    /// Index `i` samples world buffer `i`
    bind_groups: [wgpu::BindGroup; 2],
    view: UniformBuffer<ViewUniform>,
    aspect: AspectRatio,
    grid: GridExtent,
    resizes: Receiver<ResizeEvent>,
    minimized: bool,
}

impl Presenter {
    pub fn new(
        gpu: &GpuContext,
        surface: wgpu::Surface<'static>,
        (width, height): (u32, u32),
        pair: &BufferPair,
        source: &ShaderSource,
        resizes: Receiver<ResizeEvent>,
    ) -> Result<Self> {
        let device = gpu.device();
        let grid = pair.extent();

        let config =
            surface_configuration(&surface.get_capabilities(gpu.adapter()), (width, height))?;
        surface.configure(device, &config);

        let (pipeline, bind_group_layout) = create_present_pipeline(device, source, config.format)?;

        let aspect = AspectRatio::new(width, height, grid);
        let view = UniformBuffer::new_with_data(device, "View Uniform", &ViewUniform::from(aspect));

        let bind_groups = pair.buffers().each_ref().map(|buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Present Bind Group"),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(buffer.view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: view.binding_resource(),
                    },
                ],
            })
        });

        Ok(Self {
            surface,
            config,
            pipeline,
            bind_groups,
            view,
            aspect,
            grid,
            resizes,
            minimized: ResizeEvent { width, height }.is_minimized(),
        })
    }

    pub fn aspect(&self) -> AspectRatio {
        self.aspect
    }

    /// Apply the most recent pending resize, if any
    fn apply_resizes(&mut self, gpu: &GpuContext) {
        let Some(resize) = latest_resize(&self.resizes) else {
            return;
        };

        self.minimized = resize.is_minimized();
        if self.minimized {
            log::debug!("window minimized, presentation paused");
            return;
        }

        let ResizeEvent { width, height } = resize;
        self.aspect = AspectRatio::new(width, height, self.grid);
        self.view
            .update_content(gpu.queue(), ViewUniform::from(self.aspect));

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(gpu.device(), &self.config);
        log::debug!(
            "resized to {width}x{height}, aspect {:.3}",
            self.aspect.value()
        );
    }

    /// Draw the pair's input buffer and hand the frame to the display.
    ///
    /// Does nothing while the window is minimized.
    pub fn present(&mut self, gpu: &GpuContext, pair: &BufferPair) -> Result<()> {
        self.apply_resizes(gpu);
        if self.minimized {
            return Ok(());
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(gpu.device(), &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(LifeError::SurfaceOutOfMemory),
            Err(err) => {
                log::warn!("skipping frame: {err}");
                return Ok(());
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Present Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.1,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_groups[pair.binding_index(Role::Input)], &[]);
            render_pass.draw(0..6, 0..1);
        }

        gpu.queue().submit(iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: GridExtent = GridExtent::new(1504, 1024);

    #[test]
    fn test_matching_window_has_unit_aspect() {
        let aspect = AspectRatio::new(1504, 1024, GRID);
        assert!((aspect.value() - 1.0).abs() < f32::EPSILON);
        assert_eq!(aspect.clip_scale(), [1.0, 1.0]);
    }

    #[test]
    fn test_aspect_formula() {
        // (3008 / 1504) / (1024 / 1024) = 2
        let wide = AspectRatio::new(3008, 1024, GRID);
        assert!((wide.value() - 2.0).abs() < 1e-6);
        assert_eq!(wide.clip_scale(), [0.5, 1.0]);

        let tall = AspectRatio::new(1504, 2048, GRID);
        assert!((tall.value() - 0.5).abs() < 1e-6);
        assert_eq!(tall.clip_scale(), [1.0, 0.5]);
    }

    #[test]
    fn test_scaled_window_keeps_unit_aspect() {
        let aspect = AspectRatio::new(1504 * 2, 1024 * 2, GRID);
        assert!((aspect.value() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_minimized_window_falls_back() {
        assert_eq!(AspectRatio::new(0, 0, GRID), AspectRatio::default());
    }

    #[test]
    fn test_zero_sized_resize_pauses_presentation() {
        let (tx, rx) = std::sync::mpsc::channel();
        tx.send(ResizeEvent { width: 800, height: 600 }).unwrap();
        tx.send(ResizeEvent { width: 0, height: 0 }).unwrap();

        let latest = latest_resize(&rx).unwrap();
        assert!(latest.is_minimized());
        assert!(ResizeEvent { width: 800, height: 0 }.is_minimized());
        assert_eq!(latest_resize(&rx), None);

        tx.send(ResizeEvent { width: 640, height: 480 }).unwrap();
        assert!(!latest_resize(&rx).unwrap().is_minimized());
    }

    fn capabilities(formats: Vec<wgpu::TextureFormat>) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            present_modes: vec![wgpu::PresentMode::Fifo, wgpu::PresentMode::Immediate],
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            usages: wgpu::TextureUsages::RENDER_ATTACHMENT,
        }
    }

    #[test]
    fn test_surface_prefers_linear_format_and_immediate_mode() {
        let caps = capabilities(vec![
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Bgra8Unorm,
        ]);
        let config = surface_configuration(&caps, (0, 480)).unwrap();
        assert_eq!(config.format, wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(config.present_mode, wgpu::PresentMode::Immediate);
        assert_eq!((config.width, config.height), (1, 480));
    }

    #[test]
    fn test_incompatible_surface_is_an_error() {
        let err = surface_configuration(&capabilities(vec![]), (640, 480)).unwrap_err();
        assert!(matches!(err, LifeError::SurfaceIncompatible(_)));

        let mut caps = capabilities(vec![wgpu::TextureFormat::Rgba8Unorm]);
        caps.alpha_modes.clear();
        let err = surface_configuration(&caps, (640, 480)).unwrap_err();
        assert!(matches!(err, LifeError::SurfaceIncompatible("alpha modes")));
    }
}
