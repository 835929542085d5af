use crate::backend::{RenderBackend, RenderError};
use crate::capability::AcquireError;

use super::context::GpuContext;
use super::pipeline::{BackdropPipeline, QUAD_VERTEX_COUNT};
use super::uniforms::BackdropUniforms;

/// `wgpu` implementation of [`RenderBackend`].
pub struct GpuBackend {
    context: GpuContext,
    pipeline: BackdropPipeline,
    configured: bool,
    released: bool,
}

impl GpuBackend {
    /// Acquires a device for `surface`, picks its preferred format and builds
    /// the backdrop pipeline. Any failure is reported, never retried.
    pub async fn acquire(
        instance: wgpu::Instance,
        surface: wgpu::Surface<'static>,
    ) -> Result<Self, AcquireError> {
        let context = GpuContext::new(instance, surface).await?;
        let pipeline = BackdropPipeline::new(&context.device, context.surface_format).await?;
        Ok(Self {
            context,
            pipeline,
            configured: false,
            released: false,
        })
    }
}

impl RenderBackend for GpuBackend {
    fn configure(&mut self, width: u32, height: u32) {
        if self.released {
            return;
        }
        self.context.resize(width, height);
        self.configured = true;
        tracing::debug!(width, height, "configured backdrop surface");
    }

    fn upload(&mut self, uniforms: &BackdropUniforms) {
        if self.released {
            return;
        }
        self.context
            .queue
            .write_buffer(&self.pipeline.uniform_buffer, 0, uniforms.as_bytes());
    }

    fn submit(&mut self) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        if !self.configured {
            return Ok(());
        }

        let frame = match self.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.context.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("surface timeout; skipping frame");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("backdrop encoder"),
                });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("backdrop pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline.pipeline);
            pass.set_bind_group(0, &self.pipeline.bind_group, &[]);
            pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.pipeline.uniform_buffer.destroy();
        self.context.device.destroy();
        tracing::debug!("released GPU resources");
    }
}
