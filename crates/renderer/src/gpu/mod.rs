//! `wgpu` side of the backdrop.
//!
//! - `context` acquires adapter, device and queue for a surface and keeps the
//!   surface configuration in sync with the backing-store size.
//! - `pipeline` compiles `shader.wgsl` under a validation error scope and owns
//!   the 32-byte uniform buffer with its single bind group.
//! - `uniforms` is the host mirror of the WGSL uniform block.
//! - `state` ties them together as [`GpuBackend`].

mod context;
mod pipeline;
mod state;
mod uniforms;

pub use context::probe_adapter;
pub use pipeline::BACKDROP_SHADER;
pub use state::GpuBackend;
pub use uniforms::{BackdropUniforms, UNIFORM_SIZE};
