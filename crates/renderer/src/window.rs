use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::capability::AcquireError;
use crate::gpu::GpuBackend;
use crate::runtime::{BackdropRuntime, Page, Stage};
use crate::types::{BackdropOptions, Viewport};

const WINDOW_TITLE: &str = "Backdrop Preview";

/// Settings for the native preview window.
#[derive(Clone, Debug)]
pub struct PreviewConfig {
    pub options: BackdropOptions,
    pub surface_size: (u32, u32),
    /// Skip acceleration entirely and show the fallback state.
    pub force_fallback: bool,
}

/// A desktop window standing in for the page and its canvas.
///
/// The window reports its physical size with a pixel ratio of one, so the
/// backing store always matches the window exactly.
pub struct WindowPage {
    window: Arc<Window>,
    origin: Instant,
    visible: bool,
    force_fallback: bool,
}

impl WindowPage {
    pub fn new(window: Arc<Window>, force_fallback: bool) -> Self {
        Self {
            window,
            origin: Instant::now(),
            visible: true,
            force_fallback,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            tracing::debug!(visible, "preview visibility changed");
        }
        self.visible = visible;
    }

    /// Converts a cursor position in physical pixels to unit coordinates.
    fn normalize(&self, x: f64, y: f64) -> (f32, f32) {
        let size = self.window.inner_size();
        let width = f64::from(size.width.max(1));
        let height = f64::from(size.height.max(1));
        ((x / width) as f32, (y / height) as f32)
    }
}

impl Page for WindowPage {
    type Canvas = Arc<Window>;
    type Backend = GpuBackend;

    fn find_canvas(&self, _id: &str) -> Option<Arc<Window>> {
        Some(self.window.clone())
    }

    fn supports_acceleration(&self) -> bool {
        !self.force_fallback
    }

    async fn acquire(&mut self, canvas: &Arc<Window>) -> Result<GpuBackend, AcquireError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(canvas.clone())?;
        GpuBackend::acquire(instance, surface).await
    }

    fn apply_fallback(&mut self, class: &str) {
        self.window.set_title(&format!("{WINDOW_TITLE} [{class}]"));
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn viewport(&self) -> Viewport {
        let size = self.window.inner_size();
        Viewport::new(f64::from(size.width), f64::from(size.height), 1.0)
    }

    fn prefers_reduced_motion(&self) -> bool {
        false
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Opens the preview window and runs the backdrop until it is closed.
pub fn run_preview(config: PreviewConfig) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .with_inner_size(PhysicalSize::new(
            config.surface_size.0.max(1),
            config.surface_size.1.max(1),
        ))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create preview window: {err}"))?;
    let window = Arc::new(window);

    let page = WindowPage::new(window.clone(), config.force_fallback);
    let mut runtime = pollster::block_on(BackdropRuntime::start(page, config.options));
    tracing::info!(stage = runtime.stage().name(), "preview started");
    if let Stage::Fallback(reason) = runtime.stage() {
        tracing::warn!(%reason, "preview is showing the fallback state");
    }

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                runtime.teardown();
                elwt.exit();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = runtime.page().normalize(position.x, position.y);
                runtime.pointer_moved(x, y);
            }
            WindowEvent::CursorLeft { .. } => runtime.pointer_left(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                runtime.resize();
            }
            WindowEvent::Occluded(occluded) => runtime.page_mut().set_visible(!occluded),
            WindowEvent::RedrawRequested => {
                runtime.tick();
            }
            _ => {}
        },
        Event::AboutToWait => match runtime.next_frame_in() {
            Some(wait) if wait.is_zero() => {
                window.request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            }
            Some(wait) => {
                tracing::trace!(wait_ms = wait.as_millis() as u64, "waiting for next frame");
                elwt.set_control_flow(ControlFlow::WaitUntil(Instant::now() + wait));
            }
            None => elwt.set_control_flow(ControlFlow::Wait),
        },
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
