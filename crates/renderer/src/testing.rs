//! Test doubles: a backend that records device calls and a page with a
//! scripted clock, viewport and capability.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::backend::{RenderBackend, RenderError};
use crate::capability::AcquireError;
use crate::gpu::BackdropUniforms;
use crate::runtime::Page;
use crate::types::Viewport;

#[derive(Default)]
struct Recorded {
    calls: Vec<&'static str>,
    configures: Vec<(u32, u32)>,
    uploads: Vec<BackdropUniforms>,
    submits: usize,
    releases: usize,
    fail_next_submit: bool,
}

/// Shared view of everything a [`RecordingBackend`] was asked to do.
#[derive(Clone, Default)]
pub(crate) struct BackendLog(Rc<RefCell<Recorded>>);

impl BackendLog {
    pub fn calls(&self) -> Vec<&'static str> {
        self.0.borrow().calls.clone()
    }

    pub fn configures(&self) -> Vec<(u32, u32)> {
        self.0.borrow().configures.clone()
    }

    pub fn uploads(&self) -> Vec<BackdropUniforms> {
        self.0.borrow().uploads.clone()
    }

    pub fn submits(&self) -> usize {
        self.0.borrow().submits
    }

    pub fn releases(&self) -> usize {
        self.0.borrow().releases
    }

    pub fn fail_next_submit(&self) {
        self.0.borrow_mut().fail_next_submit = true;
    }
}

pub(crate) struct RecordingBackend {
    log: BackendLog,
}

impl RecordingBackend {
    pub fn new(log: &BackendLog) -> Self {
        Self { log: log.clone() }
    }
}

impl RenderBackend for RecordingBackend {
    fn configure(&mut self, width: u32, height: u32) {
        let mut inner = self.log.0.borrow_mut();
        inner.calls.push("configure");
        inner.configures.push((width, height));
    }

    fn upload(&mut self, uniforms: &BackdropUniforms) {
        let mut inner = self.log.0.borrow_mut();
        inner.calls.push("upload");
        inner.uploads.push(*uniforms);
    }

    fn submit(&mut self) -> Result<(), RenderError> {
        let mut inner = self.log.0.borrow_mut();
        inner.calls.push("submit");
        if std::mem::take(&mut inner.fail_next_submit) {
            return Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory));
        }
        inner.submits += 1;
        Ok(())
    }

    fn release(&mut self) {
        let mut inner = self.log.0.borrow_mut();
        inner.calls.push("release");
        inner.releases += 1;
    }
}

pub(crate) struct ScriptedPage {
    pub has_canvas: bool,
    pub accelerated: bool,
    pub acquire_fails: bool,
    pub reduced_motion: bool,
    pub visible: bool,
    pub viewport: Viewport,
    pub now: Duration,
    canvas_lookups: RefCell<Vec<String>>,
    pub acquisitions: usize,
    pub fallback_classes: Vec<String>,
    log: BackendLog,
}

impl ScriptedPage {
    pub fn new() -> Self {
        Self {
            has_canvas: true,
            accelerated: true,
            acquire_fails: false,
            reduced_motion: false,
            visible: true,
            viewport: Viewport::new(800.0, 600.0, 1.0),
            now: Duration::from_secs(1),
            canvas_lookups: RefCell::new(Vec::new()),
            acquisitions: 0,
            fallback_classes: Vec::new(),
            log: BackendLog::default(),
        }
    }

    pub fn without_canvas(mut self) -> Self {
        self.has_canvas = false;
        self
    }

    pub fn unaccelerated(mut self) -> Self {
        self.accelerated = false;
        self
    }

    pub fn failing_acquire(mut self) -> Self {
        self.acquire_fails = true;
        self
    }

    pub fn reduced_motion(mut self) -> Self {
        self.reduced_motion = true;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn log(&self) -> BackendLog {
        self.log.clone()
    }

    pub fn canvas_lookups(&self) -> Vec<String> {
        self.canvas_lookups.borrow().clone()
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Page for ScriptedPage {
    type Canvas = ();
    type Backend = RecordingBackend;

    fn find_canvas(&self, id: &str) -> Option<()> {
        self.canvas_lookups.borrow_mut().push(id.to_string());
        self.has_canvas.then_some(())
    }

    fn supports_acceleration(&self) -> bool {
        self.accelerated
    }

    async fn acquire(&mut self, _canvas: &()) -> Result<RecordingBackend, AcquireError> {
        self.acquisitions += 1;
        if self.acquire_fails {
            return Err(AcquireError::Shader("scripted failure".into()));
        }
        Ok(RecordingBackend::new(&self.log))
    }

    fn apply_fallback(&mut self, class: &str) {
        self.fallback_classes.push(class.to_string());
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn now(&self) -> Duration {
        self.now
    }
}
