//! Window and event-loop glue
//!
//! The loop is driven from our side rather than by winit: events are pumped
//! only on presenting iterations, so the simulation can run many ticks per
//! displayed frame. Requires a desktop platform with winit's pump-events
//! support.

use std::num::NonZeroU32;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::{ConfigError, LifeConfig};
use crate::error::{LifeError, Result};
use crate::gfx::{GpuContext, Presenter, ResizeEvent};
use crate::performance::ThroughputMonitor;
use crate::scheduler::{run_loop, LoopDriver, LoopSummary, TickScheduler};
use crate::simulation::LifeSimulation;
use crate::wgpu_utils::shader_source::{ShaderKind, ShaderSource};

pub struct LifeApp {
    config: LifeConfig,
}

/// Everything that exists once the window is up
struct Runtime {
    window: Arc<Window>,
    gpu: GpuContext,
    simulation: LifeSimulation,
    presenter: Presenter,
}

struct AppState {
    config: LifeConfig,
    runtime: Option<Runtime>,
    startup_error: Option<LifeError>,
    stop_requested: bool,
    resize_tx: Sender<ResizeEvent>,
    resize_rx: Option<Receiver<ResizeEvent>>,
}

impl LifeApp {
    pub fn new(config: LifeConfig) -> Self {
        Self { config }
    }

    /// Open the window, seed the grid and run until Escape or close
    pub fn run(self) -> Result<LoopSummary> {
        self.config.validate()?;
        let ticks_per_frame =
            NonZeroU32::new(self.config.ticks_per_frame).ok_or(ConfigError::ZeroTicksPerFrame)?;

        let mut event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let (resize_tx, resize_rx) = mpsc::channel();
        let mut state = AppState {
            config: self.config,
            runtime: None,
            startup_error: None,
            stop_requested: false,
            resize_tx,
            resize_rx: Some(resize_rx),
        };

        while state.runtime.is_none() {
            let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut state);
            if let Some(err) = state.startup_error.take() {
                return Err(err);
            }
            if state.stop_requested || matches!(status, PumpStatus::Exit(_)) {
                return Err(LifeError::ClosedDuringStartup);
            }
        }

        log::info!("entering main loop");

        let mut scheduler = TickScheduler::new(ticks_per_frame);
        let mut monitor = ThroughputMonitor::new(Instant::now());
        let mut driver = WindowDriver {
            event_loop: &mut event_loop,
            state: &mut state,
        };
        run_loop(&mut driver, &mut scheduler, &mut monitor)
    }
}

impl AppState {
    fn init_runtime(&mut self, event_loop: &ActiveEventLoop) -> Result<Runtime> {
        let (width, height) = self.config.window_size();
        let window = Arc::new(
            event_loop.create_window(
                WindowAttributes::default()
                    .with_title("Game of Life")
                    .with_inner_size(PhysicalSize::new(width, height)),
            )?,
        );

        let instance = GpuContext::create_instance();
        let surface = instance.create_surface(window.clone())?;
        let gpu = pollster::block_on(GpuContext::new(instance, Some(&surface)))?;

        let simulation = LifeSimulation::new(&gpu, &self.config)?;

        let source = ShaderSource::load(ShaderKind::Present, self.config.shader_dir.as_deref())?
            .specialize(self.config.grid, self.config.edges);
        let resizes = self.resize_rx.take().unwrap_or_else(|| {
            // a second resume gets a fresh channel
            let (tx, rx) = mpsc::channel();
            self.resize_tx = tx;
            rx
        });
        let size = window.inner_size();
        let presenter = Presenter::new(
            &gpu,
            surface,
            (size.width, size.height),
            simulation.pair(),
            &source,
            resizes,
        )?;

        Ok(Runtime {
            window,
            gpu,
            simulation,
            presenter,
        })
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.runtime.is_some() {
            return;
        }

        match self.init_runtime(event_loop) {
            Ok(runtime) => self.runtime = Some(runtime),
            Err(err) => {
                self.startup_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                self.stop_requested = true;
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                // the presenter may already be gone during shutdown
                let _ = self.resize_tx.send(ResizeEvent { width, height });
            }
            _ => (),
        }
    }
}

/// Connects the scheduler loop to the window and GPU
struct WindowDriver<'a> {
    event_loop: &'a mut EventLoop<()>,
    state: &'a mut AppState,
}

impl LoopDriver for WindowDriver<'_> {
    fn step(&mut self) {
        if let Some(runtime) = self.state.runtime.as_mut() {
            runtime.simulation.step();
        }
    }

    fn present(&mut self) -> Result<()> {
        let Some(runtime) = self.state.runtime.as_mut() else {
            return Ok(());
        };
        runtime.window.pre_present_notify();
        runtime
            .presenter
            .present(&runtime.gpu, runtime.simulation.pair())
    }

    fn poll_events(&mut self) {
        if let PumpStatus::Exit(code) = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut *self.state)
        {
            log::debug!("event loop exited with status {code}");
            self.state.stop_requested = true;
        }
    }

    fn stop_requested(&self) -> bool {
        self.state.stop_requested
    }
}
