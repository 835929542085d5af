//! Capability resolution for the backdrop.
//!
//! The host is asked once whether it can accelerate drawing and, if so, to
//! hand over a ready backend. Everything downstream matches on the resulting
//! [`Capability`] instead of probing the host again.

use std::fmt;

use thiserror::Error;

use crate::runtime::Page;

/// Reasons acquiring the GPU pipeline can fail. All of them degrade to the
/// static appearance.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("no compatible GPU adapter: {0}")]
    Adapter(String),
    #[error("failed to bind a surface to the canvas: {0}")]
    Surface(String),
    #[error("failed to create GPU device: {0}")]
    Device(String),
    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,
    #[error("shader validation failed: {0}")]
    Shader(String),
}

impl From<wgpu::RequestAdapterError> for AcquireError {
    fn from(err: wgpu::RequestAdapterError) -> Self {
        Self::Adapter(err.to_string())
    }
}

impl From<wgpu::CreateSurfaceError> for AcquireError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        Self::Surface(err.to_string())
    }
}

impl From<wgpu::RequestDeviceError> for AcquireError {
    fn from(err: wgpu::RequestDeviceError) -> Self {
        Self::Device(err.to_string())
    }
}

/// Why the backdrop is showing its static appearance.
#[derive(Debug)]
pub enum FallbackReason {
    /// The host advertises no GPU acceleration; nothing was acquired.
    Unsupported,
    /// Acceleration was advertised but acquiring the pipeline failed.
    Acquire(AcquireError),
    /// A frame failed after the loop had started.
    Runtime(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("graphics acceleration unsupported"),
            Self::Acquire(err) => write!(f, "{err}"),
            Self::Runtime(message) => write!(f, "frame failed: {message}"),
        }
    }
}

/// Outcome of probing a host: a live backend or the reason there is none.
#[derive(Debug)]
pub enum Capability<B> {
    Accelerated(B),
    Fallback(FallbackReason),
}

impl<B> Capability<B> {
    /// Probes `page` for acceleration and acquires a backend bound to `canvas`.
    ///
    /// No acquisition is attempted when the host reports no support.
    pub async fn probe<P>(page: &mut P, canvas: &P::Canvas) -> Self
    where
        P: Page<Backend = B>,
    {
        if !page.supports_acceleration() {
            return Self::Fallback(FallbackReason::Unsupported);
        }
        match page.acquire(canvas).await {
            Ok(backend) => Self::Accelerated(backend),
            Err(err) => Self::Fallback(FallbackReason::Acquire(err)),
        }
    }
}
