//! Instance, adapter and device setup

use std::sync::Arc;

use crate::error::{LifeError, Result};
use crate::simulation::GridExtent;

/// Device and queue shared by the simulation and the presenter
pub struct GpuContext {
    _instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    pub fn create_instance() -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        })
    }

    /// Open a device, optionally one able to present to `compatible_surface`
    pub async fn new(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Life Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: adapter.limits().max_texture_dimension_2d,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        // errors outside an error scope are logged and the loop carries on
        device.on_uncaptured_error(Box::new(|error| {
            log::error!("GPU error: {error}");
        }));

        Ok(Self {
            _instance: instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Device without a window, for tests and offscreen runs
    pub fn headless() -> Result<Self> {
        pollster::block_on(Self::new(Self::create_instance(), None))
    }

    /// Reject grids the device cannot hold in a single texture
    pub fn check_grid(&self, extent: GridExtent) -> Result<()> {
        let limit = self.device.limits().max_texture_dimension_2d;
        if extent.width > limit || extent.height > limit {
            return Err(LifeError::GridTooLarge {
                width: extent.width,
                height: extent.height,
                limit,
            });
        }
        Ok(())
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }
}
