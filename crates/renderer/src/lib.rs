//! Renderer crate for the pointer-reactive backdrop.
//!
//! A host (browser page or native preview window) hands the runtime a canvas;
//! the runtime resolves capability once and then feeds frames to the renderer:
//!
//! ```text
//!   host events ──▶ BackdropRuntime<P: Page> ──▶ Capability::probe
//!                          │                         │
//!                          │                         ├─ Fallback ─▶ page.apply_fallback()
//!                          ▼                         └─ Accelerated(backend)
//!                    tick() ─▶ BackdropRenderer ─▶ upload(uniforms) ─▶ submit()
//! ```
//!
//! `RenderState` holds the pure per-frame logic (pixel-ratio capped sizing,
//! pointer smoothing, frame throttling). `GpuBackend` implements
//! `RenderBackend` over `wgpu`; the web host wraps it so the canvas backing
//! store follows the surface size.

mod backend;
mod capability;
pub mod gpu;
mod renderer;
mod runtime;
mod state;
mod types;

#[cfg(test)]
mod testing;

#[cfg(not(target_arch = "wasm32"))]
mod window;

#[cfg(target_arch = "wasm32")]
mod web;

pub use backend::{RenderBackend, RenderError};
pub use capability::{AcquireError, Capability, FallbackReason};
pub use gpu::{probe_adapter, BackdropUniforms, GpuBackend};
pub use renderer::{BackdropRenderer, FrameOutcome};
pub use runtime::{BackdropRuntime, Page, Stage};
pub use state::{RenderState, POINTER_REST};
pub use types::{
    AdapterProfile, BackdropOptions, MotionProfile, Viewport, DEFAULT_CANVAS_ID,
    DEFAULT_FALLBACK_CLASS,
};

#[cfg(not(target_arch = "wasm32"))]
pub use window::{run_preview, PreviewConfig, WindowPage};

#[cfg(target_arch = "wasm32")]
pub use web::{start_backdrop, CanvasBackend, WebPage};
