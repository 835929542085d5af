//! Browser host: binds the runtime to a DOM canvas and drives it from
//! `requestAnimationFrame`.
//!
//! All shared state lives in one `Rc<RefCell<BackdropRuntime<WebPage>>>` that
//! the frame callback and the DOM listeners clone. Everything runs on the one
//! JS thread, so borrows never overlap.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, Document, HtmlCanvasElement, PointerEvent, VisibilityState, Window,
};

use crate::backend::{RenderBackend, RenderError};
use crate::capability::AcquireError;
use crate::gpu::{BackdropUniforms, GpuBackend};
use crate::runtime::{BackdropRuntime, Page};
use crate::types::{BackdropOptions, Viewport};

type SharedRuntime = Rc<RefCell<BackdropRuntime<WebPage>>>;

pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    fn css_size(&self) -> (f64, f64) {
        let width = self
            .window
            .inner_width()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(1.0);
        let height = self
            .window
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(1.0);
        (width.max(1.0), height.max(1.0))
    }
}

impl Page for WebPage {
    type Canvas = HtmlCanvasElement;
    type Backend = CanvasBackend;

    fn find_canvas(&self, id: &str) -> Option<HtmlCanvasElement> {
        self.document
            .get_element_by_id(id)?
            .dyn_into::<HtmlCanvasElement>()
            .ok()
    }

    fn supports_acceleration(&self) -> bool {
        let navigator = self.window.navigator();
        js_sys::Reflect::get(&navigator, &JsValue::from_str("gpu"))
            .map(|gpu| !gpu.is_undefined() && !gpu.is_null())
            .unwrap_or(false)
    }

    async fn acquire(
        &mut self,
        canvas: &HtmlCanvasElement,
    ) -> Result<CanvasBackend, AcquireError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let gpu = GpuBackend::acquire(instance, surface).await?;
        Ok(CanvasBackend {
            canvas: canvas.clone(),
            gpu,
        })
    }

    fn apply_fallback(&mut self, class: &str) {
        let Some(body) = self.document.body() else {
            return;
        };
        if let Err(err) = body.class_list().add_1(class) {
            tracing::error!(error = ?err, class, "failed to mark fallback");
        }
    }

    fn is_visible(&self) -> bool {
        self.document.visibility_state() == VisibilityState::Visible
    }

    fn viewport(&self) -> Viewport {
        let (width, height) = self.css_size();
        Viewport::new(width, height, self.window.device_pixel_ratio())
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.window
            .match_media("(prefers-reduced-motion: reduce)")
            .ok()
            .flatten()
            .map(|query| query.matches())
            .unwrap_or(false)
    }

    fn now(&self) -> Duration {
        self.window
            .performance()
            .map(|performance| Duration::from_secs_f64(performance.now().max(0.0) / 1000.0))
            .unwrap_or_default()
    }
}

/// GPU backend that also keeps the canvas backing store in step with the
/// surface size.
pub struct CanvasBackend {
    canvas: HtmlCanvasElement,
    gpu: GpuBackend,
}

impl RenderBackend for CanvasBackend {
    fn configure(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.gpu.configure(width, height);
    }

    fn upload(&mut self, uniforms: &BackdropUniforms) {
        self.gpu.upload(uniforms);
    }

    fn submit(&mut self) -> Result<(), RenderError> {
        self.gpu.submit()
    }

    fn release(&mut self) {
        self.gpu.release();
    }
}

/// Starts the backdrop on the current page.
///
/// Called once by the page bootstrap script. `canvas_id` overrides the
/// default `backdrop-canvas` element id.
#[wasm_bindgen(js_name = startBackdrop)]
pub fn start_backdrop(canvas_id: Option<String>) {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second call keeps the subscriber that is already installed.
    let _ = tracing_wasm::try_set_as_global_default();

    let mut options = BackdropOptions::default();
    if let Some(id) = canvas_id.filter(|id| !id.trim().is_empty()) {
        options.canvas_id = id;
    }
    wasm_bindgen_futures::spawn_local(launch(options));
}

async fn launch(options: BackdropOptions) {
    let Some(page) = WebPage::new() else {
        tracing::error!("no window or document; backdrop not started");
        return;
    };
    let window = page.window.clone();
    let document = page.document.clone();

    let runtime = BackdropRuntime::start(page, options).await;
    if !runtime.is_running() {
        return;
    }

    let runtime: SharedRuntime = Rc::new(RefCell::new(runtime));
    if let Err(err) = install(&window, &document, &runtime) {
        runtime
            .borrow_mut()
            .fail(format!("failed to install page hooks: {err:?}"));
    }
}

fn install(window: &Window, document: &Document, runtime: &SharedRuntime) -> Result<(), JsValue> {
    install_pointer_listeners(window, document, runtime)?;
    install_resize_listener(window, runtime)?;
    let pending = start_frame_loop(window, runtime)?;
    install_teardown(window, runtime, pending)
}

fn passive() -> AddEventListenerOptions {
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    options
}

fn install_pointer_listeners(
    window: &Window,
    document: &Document,
    runtime: &SharedRuntime,
) -> Result<(), JsValue> {
    let options = passive();

    let moved = {
        let runtime = runtime.clone();
        Closure::wrap(Box::new(move |event: PointerEvent| {
            let mut runtime = runtime.borrow_mut();
            let (width, height) = runtime.page().css_size();
            let x = (f64::from(event.client_x()) / width) as f32;
            let y = (f64::from(event.client_y()) / height) as f32;
            runtime.pointer_moved(x, y);
        }) as Box<dyn FnMut(_)>)
    };
    window.add_event_listener_with_callback_and_add_event_listener_options(
        "pointermove",
        moved.as_ref().unchecked_ref(),
        &options,
    )?;
    moved.forget();

    let left = {
        let runtime = runtime.clone();
        Closure::wrap(Box::new(move |_event: PointerEvent| {
            runtime.borrow_mut().pointer_left();
        }) as Box<dyn FnMut(_)>)
    };
    if let Some(root) = document.document_element() {
        root.add_event_listener_with_callback_and_add_event_listener_options(
            "pointerleave",
            left.as_ref().unchecked_ref(),
            &options,
        )?;
    }
    left.forget();
    Ok(())
}

fn install_resize_listener(window: &Window, runtime: &SharedRuntime) -> Result<(), JsValue> {
    let resized = {
        let runtime = runtime.clone();
        Closure::wrap(Box::new(move || {
            runtime.borrow_mut().resize();
        }) as Box<dyn FnMut()>)
    };
    window.add_event_listener_with_callback("resize", resized.as_ref().unchecked_ref())?;
    resized.forget();
    Ok(())
}

/// Schedules the self-rescheduling frame callback and returns the cell that
/// always holds the id of the pending request.
fn start_frame_loop(window: &Window, runtime: &SharedRuntime) -> Result<Rc<Cell<i32>>, JsValue> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let pending = Rc::new(Cell::new(0));

    let frame = {
        let callback = callback.clone();
        let pending = pending.clone();
        let runtime = runtime.clone();
        let window = window.clone();
        Closure::wrap(Box::new(move || {
            // Queue the next frame before doing this one's work.
            if let Some(next) = callback.borrow().as_ref() {
                match window.request_animation_frame(next.as_ref().unchecked_ref()) {
                    Ok(id) => pending.set(id),
                    Err(err) => tracing::error!(error = ?err, "failed to request animation frame"),
                }
            }

            runtime.borrow_mut().tick();
        }) as Box<dyn FnMut()>)
    };

    let id = window.request_animation_frame(frame.as_ref().unchecked_ref())?;
    pending.set(id);
    *callback.borrow_mut() = Some(frame);
    Ok(pending)
}

fn install_teardown(
    window: &Window,
    runtime: &SharedRuntime,
    pending: Rc<Cell<i32>>,
) -> Result<(), JsValue> {
    let hidden = {
        let runtime = runtime.clone();
        let window = window.clone();
        Closure::wrap(Box::new(move || {
            if let Err(err) = window.cancel_animation_frame(pending.get()) {
                tracing::warn!(error = ?err, "failed to cancel pending animation frame");
            }
            runtime.borrow_mut().teardown();
        }) as Box<dyn FnMut()>)
    };
    window.add_event_listener_with_callback("pagehide", hidden.as_ref().unchecked_ref())?;
    hidden.forget();
    Ok(())
}
