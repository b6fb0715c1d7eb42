use ledscreen_core::shader::{self, FRAGMENT_ENTRY, VERTEX_ENTRY};
use ledscreen_core::{PreviewError, Result};

pub(crate) struct FieldResources {
    pub(crate) pipeline: wgpu::RenderPipeline,
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
}

/// Compiles the generated light-field program and allocates its uniform.
///
/// Validation errors are captured instead of reaching wgpu's uncaptured-error
/// handler, so a broken shader surfaces as `ShaderCompile`.
pub(crate) async fn create_field_resources(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    num_leds: usize,
    roi: f32,
) -> Result<FieldResources> {
    let size = shader::field_uniform_size(num_leds);
    let max = device.limits().max_uniform_buffer_binding_size as u64;
    if size > max {
        return Err(PreviewError::Gpu(format!(
            "{} LEDs need a {} byte uniform, device allows {}",
            num_leds, size, max
        )));
    }

    let source = shader::light_field_wgsl(num_leds, roi);
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("light_field_shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("light_field_bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });
    let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("light_field_pl"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("light_field_pipeline"),
        layout: Some(&pl),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some(VERTEX_ENTRY),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some(FRAGMENT_ENTRY),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    });
    if let Some(err) = device.pop_error_scope().await {
        log::error!("[render] light field program rejected: {}", err);
        return Err(PreviewError::ShaderCompile(err.to_string()));
    }

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("light_field_uniforms"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("light_field_bg"),
        layout: &bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    Ok(FieldResources {
        pipeline,
        uniform_buffer,
        bind_group,
    })
}
