use std::borrow::Cow;

use crate::capability::AcquireError;

use super::uniforms::UNIFORM_SIZE;

/// WGSL source for the backdrop program.
pub const BACKDROP_SHADER: &str = include_str!("shader.wgsl");

/// Vertices drawn per frame: two triangles covering the viewport.
pub(crate) const QUAD_VERTEX_COUNT: u32 = 6;

pub(crate) struct BackdropPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl BackdropPipeline {
    /// Compiles the shader and builds the pipeline inside a validation error
    /// scope, so a rejected program is reported instead of panicking later.
    pub async fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Result<Self, AcquireError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("backdrop shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(BACKDROP_SHADER)),
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("backdrop uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("backdrop uniforms"),
            size: UNIFORM_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("backdrop uniform bind group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("backdrop pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("backdrop pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                // The shader already writes premultiplied color.
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        if let Some(err) = device.pop_error_scope().await {
            return Err(AcquireError::Shader(err.to_string()));
        }

        Ok(Self {
            pipeline,
            uniform_buffer,
            bind_group,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse() -> naga::Module {
        naga::front::wgsl::parse_str(BACKDROP_SHADER).expect("shader parses")
    }

    #[test]
    fn shader_passes_validation() {
        let module = parse();
        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        );
        validator.validate(&module).expect("shader validates");
    }

    #[test]
    fn shader_exposes_both_entry_points() {
        let module = parse();
        let names: Vec<_> = module
            .entry_points
            .iter()
            .map(|entry| (entry.name.as_str(), entry.stage))
            .collect();
        assert!(names.contains(&("vs_main", naga::ShaderStage::Vertex)));
        assert!(names.contains(&("fs_main", naga::ShaderStage::Fragment)));
    }

    #[test]
    fn uniform_block_matches_host_layout() {
        let module = parse();
        let (_, global) = module
            .global_variables
            .iter()
            .find(|(_, var)| {
                var.binding
                    == Some(naga::ResourceBinding {
                        group: 0,
                        binding: 0,
                    })
            })
            .expect("uniform binding present");

        let naga::TypeInner::Struct { members, span } = &module.types[global.ty].inner else {
            panic!("uniform binding is not a struct");
        };
        assert_eq!(u64::from(*span), UNIFORM_SIZE);

        let layout: Vec<_> = members
            .iter()
            .map(|member| (member.name.as_deref().unwrap_or_default(), member.offset))
            .collect();
        assert_eq!(
            layout,
            vec![
                ("resolution", 0),
                ("pointer", 8),
                ("time", 16),
                ("intensity", 20),
                ("pointer_mix", 24),
                ("padding", 28),
            ]
        );
    }
}
