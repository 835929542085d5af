use std::time::Duration;

use crate::backend::RenderBackend;
use crate::capability::{AcquireError, Capability, FallbackReason};
use crate::renderer::{BackdropRenderer, FrameOutcome};
use crate::types::{BackdropOptions, Viewport};

/// The host the backdrop is drawn into: a browser page or a native window.
#[allow(async_fn_in_trait)]
pub trait Page {
    /// Handle to the drawing surface the host exposes.
    type Canvas;
    type Backend: RenderBackend;

    fn find_canvas(&self, id: &str) -> Option<Self::Canvas>;

    /// Whether the host advertises GPU acceleration at all.
    fn supports_acceleration(&self) -> bool;

    /// Acquires a backend bound to `canvas`.
    async fn acquire(&mut self, canvas: &Self::Canvas) -> Result<Self::Backend, AcquireError>;

    /// Switches the page to its static appearance.
    fn apply_fallback(&mut self, class: &str);

    fn is_visible(&self) -> bool;

    fn viewport(&self) -> Viewport;

    fn prefers_reduced_motion(&self) -> bool;

    /// Current host time, measured from an arbitrary fixed epoch.
    fn now(&self) -> Duration;
}

pub enum Stage<B: RenderBackend> {
    /// No canvas was found; the backdrop never started.
    Inactive,
    Fallback(FallbackReason),
    Running(BackdropRenderer<B>),
    /// Torn down by the host.
    Stopped,
}

impl<B: RenderBackend> Stage<B> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Inactive => "inactive",
            Self::Fallback(_) => "fallback",
            Self::Running(_) => "running",
            Self::Stopped => "stopped",
        }
    }
}

/// Owns the host handle and the renderer, and routes host events to it.
pub struct BackdropRuntime<P: Page> {
    page: P,
    options: BackdropOptions,
    stage: Stage<P::Backend>,
}

impl<P: Page> BackdropRuntime<P> {
    /// Locates the canvas, resolves capability and sizes the renderer.
    ///
    /// Never fails: a missing canvas leaves the runtime inactive without
    /// touching the host, and every other failure lands in the fallback stage.
    pub async fn start(mut page: P, options: BackdropOptions) -> Self {
        let Some(canvas) = page.find_canvas(&options.canvas_id) else {
            tracing::info!(canvas_id = %options.canvas_id, "no backdrop canvas; staying inactive");
            return Self {
                page,
                options,
                stage: Stage::Inactive,
            };
        };

        let stage = match Capability::<P::Backend>::probe(&mut page, &canvas).await {
            Capability::Accelerated(backend) => {
                let motion = options.motion_profile(page.prefers_reduced_motion());
                let mut renderer = BackdropRenderer::new(
                    backend,
                    page.now(),
                    motion,
                    options.pointer_smoothing,
                    options.max_device_pixel_ratio,
                );
                renderer.resize(page.viewport());
                let (width, height) = renderer.state().pixel_size();
                tracing::info!(
                    width,
                    height,
                    reduced_motion = motion.reduced,
                    frame_interval_ms = motion.frame_interval.as_millis() as u64,
                    "backdrop running"
                );
                Stage::Running(renderer)
            }
            Capability::Fallback(reason) => {
                tracing::warn!(%reason, "backdrop falling back to static appearance");
                page.apply_fallback(&options.fallback_class);
                Stage::Fallback(reason)
            }
        };

        Self {
            page,
            options,
            stage,
        }
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if let Stage::Running(renderer) = &mut self.stage {
            renderer.pointer_moved(x, y);
        }
    }

    pub fn pointer_left(&mut self) {
        if let Stage::Running(renderer) = &mut self.stage {
            renderer.pointer_left();
        }
    }

    /// Re-reads the host viewport; returns whether the backend was resized.
    pub fn resize(&mut self) -> bool {
        let viewport = self.page.viewport();
        match &mut self.stage {
            Stage::Running(renderer) => renderer.resize(viewport),
            _ => false,
        }
    }

    /// Runs one frame at the host's current time.
    ///
    /// A frame error is logged once, the backend released and the page moved
    /// to its fallback appearance; the runtime stays in the fallback stage.
    pub fn tick(&mut self) -> FrameOutcome {
        let now = self.page.now();
        let visible = self.page.is_visible();
        let Stage::Running(renderer) = &mut self.stage else {
            return FrameOutcome::Idle;
        };

        match renderer.frame(now, visible) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.fail(format!("frame failed: {err}"));
                FrameOutcome::Idle
            }
        }
    }

    /// Abandons a running backdrop after a host or device failure.
    ///
    /// Releases the backend once and moves the page to its fallback
    /// appearance. Does nothing unless the backdrop is running.
    pub fn fail(&mut self, message: impl Into<String>) {
        let Stage::Running(renderer) = &mut self.stage else {
            return;
        };
        let message = message.into();
        tracing::error!(error = %message, "backdrop failed; switching to fallback");
        renderer.release();
        self.page.apply_fallback(&self.options.fallback_class);
        self.stage = Stage::Fallback(FallbackReason::Runtime(message));
    }

    /// Time until the next frame should run, or `None` once the loop is over.
    ///
    /// While the host is hidden this returns the full interval so the caller
    /// polls at the frame rate without drawing.
    pub fn next_frame_in(&self) -> Option<Duration> {
        let Stage::Running(renderer) = &self.stage else {
            return None;
        };
        if !self.page.is_visible() {
            return Some(renderer.state().frame_interval());
        }
        Some(renderer.state().next_frame_in(self.page.now()))
    }

    /// Releases GPU resources once; later calls and ticks are no-ops.
    pub fn teardown(&mut self) {
        if let Stage::Running(renderer) = &mut self.stage {
            renderer.release();
            tracing::info!("backdrop torn down");
        }
        if matches!(self.stage, Stage::Running(_)) {
            self.stage = Stage::Stopped;
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.stage, Stage::Running(_))
    }

    pub fn stage(&self) -> &Stage<P::Backend> {
        &self.stage
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }
}
