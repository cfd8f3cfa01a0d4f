pub mod trace;

use std::sync::Arc;

use anyhow::{Context, anyhow};
use tracemon_core::Segment;
use winit::window::Window;

use crate::ui::EguiRenderOutput;
use trace::{TraceParams, TracePipeline};

pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    trace: TracePipeline,
    egui_renderer: egui_wgpu::Renderer,
}

impl GpuState {
    pub fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter found")?;

        tracing::info!("GPU adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("tracemon"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            ..Default::default()
        }))
        .context("failed to create GPU device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let trace = TracePipeline::new(&device, format);
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, Default::default());

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            trace,
            egui_renderer,
        })
    }

    /// Zero-sized requests (minimised windows) leave the surface as is.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface.configure(&self.device, &self.surface_config);
        }
    }

    /// Clear, draw the chart segments, then composite the overlay if any.
    pub fn render(
        &mut self,
        segments: &[Segment],
        overlay: Option<&EguiRenderOutput>,
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame"),
            });

        let params = TraceParams::new(
            self.surface_config.width,
            self.surface_config.height,
            self.surface_config.format,
        );
        self.trace
            .render(&self.device, &mut encoder, &view, &params, segments);

        if let Some(overlay) = overlay {
            self.render_overlay(&mut encoder, &view, overlay);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(overlay) = overlay {
            for id in &overlay.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        Ok(())
    }

    fn render_overlay(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        output: &EguiRenderOutput,
    ) {
        for (id, delta) in &output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            encoder,
            &output.primitives,
            &output.screen_descriptor,
        );

        let mut rpass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("overlay"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            })
            .forget_lifetime();

        self.egui_renderer
            .render(&mut rpass, &output.primitives, &output.screen_descriptor);
    }
}
