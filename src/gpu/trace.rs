use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use tracemon_core::Segment;
use wgpu::util::DeviceExt;

/// One end of a line segment, in surface pixels.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TraceVertex {
    pub position: Vec2,
    /// sRGB-encoded colour, 0..1.
    pub color: [f32; 4],
}

impl TraceVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct TraceParams {
    pub size: [f32; 2],
    /// Non-zero when the target is an sRGB format and colours need decoding
    /// before the hardware re-encodes them.
    linearize: u32,
    _pad: u32,
}

impl TraceParams {
    pub fn new(width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        Self {
            size: [width as f32, height as f32],
            linearize: u32::from(format.is_srgb()),
            _pad: 0,
        }
    }
}

/// Expand segments into a line-list vertex stream, two vertices per segment.
pub fn segment_vertices(segments: &[Segment]) -> Vec<TraceVertex> {
    segments
        .iter()
        .flat_map(|s| {
            let [r, g, b] = s.rgb.map(|c| f32::from(c) / 255.0);
            let color = [r, g, b, 1.0];
            [
                TraceVertex {
                    position: s.from,
                    color,
                },
                TraceVertex {
                    position: s.to,
                    color,
                },
            ]
        })
        .collect()
}

pub struct TracePipeline {
    pipeline: wgpu::RenderPipeline,
    params_bind_group_layout: wgpu::BindGroupLayout,
}

impl TracePipeline {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("trace"),
            source: wgpu::ShaderSource::Wgsl(include_str!("trace.wgsl").into()),
        });

        let params_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("trace_params"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("trace"),
            bind_group_layouts: &[&params_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("trace"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[TraceVertex::layout()],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            params_bind_group_layout,
        }
    }

    /// Clear `target` to black and draw the segments over it in order.
    pub fn render(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        params: &TraceParams,
        segments: &[Segment],
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("trace"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });

        if segments.is_empty() {
            return;
        }

        let vertices = segment_vertices(segments);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("trace_vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("trace_params"),
            contents: bytemuck::bytes_of(params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trace_params"),
            layout: &self.params_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &params_bind_group, &[]);
        pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        pass.draw(0..vertices.len() as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_pod_and_tightly_packed() {
        assert_eq!(std::mem::size_of::<TraceVertex>(), 24);
        assert_eq!(std::mem::size_of::<TraceParams>(), 16);
    }

    #[test]
    fn two_vertices_per_segment_in_order() {
        let segments = [
            Segment {
                from: Vec2::new(0.0, 10.0),
                to: Vec2::new(0.0, 20.0),
                rgb: [255, 0, 51],
            },
            Segment {
                from: Vec2::new(1.0, 5.0),
                to: Vec2::new(2.0, 6.0),
                rgb: [0, 0, 0],
            },
        ];
        let vertices = segment_vertices(&segments);
        assert_eq!(vertices.len(), 4);
        assert_eq!(vertices[1].position, Vec2::new(0.0, 20.0));
        assert_eq!(vertices[0].color, [1.0, 0.0, 0.2, 1.0]);
        assert_eq!(vertices[2].position, Vec2::new(1.0, 5.0));
    }
}
