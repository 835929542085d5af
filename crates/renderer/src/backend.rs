use thiserror::Error;

use crate::gpu::BackdropUniforms;

/// Errors surfaced by a frame submission. Any of them ends the animation.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("render backend has been released")]
    Released,
}

/// Device-side operations the renderer needs from a drawing backend.
///
/// `GpuBackend` implements this over `wgpu`; tests use a recording double.
pub trait RenderBackend {
    /// Resizes the backing store. Called only when the size actually changed.
    fn configure(&mut self, width: u32, height: u32);

    /// Writes the frame's uniform block. Always precedes `submit`.
    fn upload(&mut self, uniforms: &BackdropUniforms);

    /// Clears the target, draws the full-viewport quad and presents it.
    fn submit(&mut self) -> Result<(), RenderError>;

    /// Drops device resources. Later calls on the backend are no-ops.
    fn release(&mut self);
}
