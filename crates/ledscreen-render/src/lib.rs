//! wgpu light-field renderer.
//!
//! One fullscreen pass: the fragment program sums every LED's sinc-squared
//! glow per pixel. LED positions are uploaded once; colors every frame.

use ledscreen_core::shader::{self, FieldHeader};
use ledscreen_core::{LedColors, LedPositions, PreviewError, Result, Viewport, CLEAR_COLOR};

mod field;
use field::{create_field_resources, FieldResources};

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    field: FieldResources,
    num_leds: usize,
    viewport: Viewport,
    clear_color: wgpu::Color,
}

impl<'a> GpuState<'a> {
    /// Sets up device, surface and the light-field program for `positions`.
    ///
    /// Fails with `ShaderCompile` when the generated program does not validate
    /// and with `Gpu` for adapter/device problems.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'a>,
        viewport: Viewport,
        positions: &LedPositions,
        roi: f32,
    ) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| PreviewError::Gpu("no GPU adapter".into()))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // default limits keep unknown fields away from older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| PreviewError::Gpu(format!("request_device error: {:?}", e)))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| PreviewError::Gpu("surface reports no formats".into()))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let viewport = Viewport {
            width: config.width,
            height: config.height,
            ..viewport
        };

        let num_leds = positions.len();
        let field = create_field_resources(&device, format, num_leds, roi).await?;
        queue.write_buffer(
            &field.uniform_buffer,
            shader::positions_offset(),
            bytemuck::cast_slice(&positions.packed()),
        );
        log::info!(
            "[render] light field ready: leds={} roi={} format={:?} {}x{}",
            num_leds,
            roi,
            format,
            config.width,
            config.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            field,
            num_leds,
            viewport,
            clear_color: wgpu::Color {
                r: CLEAR_COLOR[0],
                g: CLEAR_COLOR[1],
                b: CLEAR_COLOR[2],
                a: CLEAR_COLOR[3],
            },
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Reconfigures the surface so the viewport matches the new canvas size.
    pub fn resize(&mut self, viewport: Viewport) {
        let Some(viewport) = self.viewport.resized(viewport) else {
            return;
        };
        self.viewport = viewport;
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Draws one frame from `colors`, which must match the LED count the
    /// program was generated for.
    pub fn render(&mut self, colors: &LedColors) -> std::result::Result<(), wgpu::SurfaceError> {
        debug_assert_eq!(colors.len(), self.num_leds);
        let header = FieldHeader {
            resolution: [self.viewport.width as f32, self.viewport.height as f32],
            _pad: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.field.uniform_buffer, 0, bytemuck::bytes_of(&header));
        self.queue.write_buffer(
            &self.field.uniform_buffer,
            shader::colors_offset(self.num_leds),
            bytemuck::cast_slice(colors.as_floats()),
        );

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("light_field_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_viewport(
                self.viewport.x as f32,
                self.viewport.y as f32,
                self.viewport.width as f32,
                self.viewport.height as f32,
                0.0,
                1.0,
            );
            rpass.set_pipeline(&self.field.pipeline);
            rpass.set_bind_group(0, &self.field.bind_group, &[]);
            rpass.draw(0..3, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Re-applies the current configuration after `SurfaceError::Lost`.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}
