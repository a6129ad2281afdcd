//! wgpu renderer for particle scenes
//!
//! Frames are painted into a persistent canvas texture that is never cleared
//! between frames; the translucent fade overlay is what turns old frames into
//! motion trails. The canvas is then copied onto the swapchain image.

use common::{create_uniform_buffer, Camera2D, CameraUniform, GraphicsContext, Vertex};
use glam::Vec2;
use wgpu::util::DeviceExt;

use particle_lab::config::PARTICLE_CAP_LIMIT;
use particle_lab::palette::Rgba;
use particle_lab::scene::{FrameScene, Glyph, PointerRing};

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 10.0 / 255.0,
    g: 14.0 / 255.0,
    b: 23.0 / 255.0,
    a: 1.0,
};

/// Line vertices beyond this are dropped for the frame
const MAX_LINE_VERTICES: usize = 2_000_000;
const FADE_VERTICES: u32 = 6;
/// Width of the soft glow around each particle, in canvas units
const HALO_WIDTH: f32 = 10.0;

const KIND_FLAT: f32 = 0.0;
const KIND_GLOW: f32 = 1.0;
const KIND_RING: f32 = 2.0;

/// Per-instance glyph data
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlyphInstance {
    pub center: [f32; 2],
    /// radius, kind, dot radius, halo width
    pub params: [f32; 4],
    pub color: [f32; 4],
}

impl GlyphInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2,
        2 => Float32x4,
        3 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    fn particle(glyph: &Glyph) -> Self {
        let (kind, halo) = if glyph.glow {
            (KIND_GLOW, HALO_WIDTH)
        } else {
            (KIND_FLAT, 0.0)
        };
        Self {
            center: glyph.position.to_array(),
            params: [glyph.radius, kind, 0.0, halo],
            color: glyph.color,
        }
    }

    fn pointer(ring: &PointerRing) -> Self {
        Self {
            center: ring.position.to_array(),
            params: [ring.radius, KIND_RING, ring.dot_radius, 0.0],
            color: ring.color,
        }
    }
}

/// Quad vertex for instanced rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

// Unit quad vertices
const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, 1.0] },
];

/// Vertex and instance counts uploaded for one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDraw {
    pub line_vertices: u32,
    pub glyphs: u32,
}

/// Offscreen texture the scene accumulates into
struct Canvas {
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

impl Canvas {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Canvas Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Canvas Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self { view, bind_group }
    }
}

pub struct Renderer {
    fade_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    glyph_pipeline: wgpu::RenderPipeline,
    blit_pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    glyph_buffer: wgpu::Buffer,
    glyph_capacity: usize,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    canvas_layout: wgpu::BindGroupLayout,
    canvas_sampler: wgpu::Sampler,
    canvas: Canvas,
    format: wgpu::TextureFormat,
    needs_clear: bool,
    truncation_logged: bool,
}

impl Renderer {
    pub fn new(ctx: &GraphicsContext) -> Self {
        let device = &ctx.device;
        let format = ctx.config.format;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/particle.wgsl").into()),
        });
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blit.wgsl").into()),
        });

        let camera = Camera2D::new(ctx.config.width as f32, ctx.config.height as f32);
        let camera_buffer = create_uniform_buffer(device, &CameraUniform::from_camera_2d(&camera));

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let canvas_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Canvas Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let canvas_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Canvas Sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });
        let blit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Blit Pipeline Layout"),
            bind_group_layouts: &[&canvas_layout],
            push_constant_ranges: &[],
        });

        let fade_pipeline = shape_pipeline(
            device,
            &scene_layout,
            &shader,
            format,
            "Fade Pipeline",
            wgpu::PrimitiveTopology::TriangleList,
        );
        let line_pipeline = shape_pipeline(
            device,
            &scene_layout,
            &shader,
            format,
            "Line Pipeline",
            wgpu::PrimitiveTopology::LineList,
        );

        // Glyph render pipeline
        let glyph_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Glyph Pipeline"),
            layout: Some(&scene_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_glyph",
                buffers: &[QuadVertex::layout(), GlyphInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_glyph",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        // Canvas to swapchain copy
        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Blit Pipeline"),
            layout: Some(&blit_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: "vs_blit",
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: "fs_blit",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Room for the fade quad, a full grid and the default trails
        let vertex_capacity = 64 * 1024;
        let vertex_buffer = vertex_buffer(device, vertex_capacity);

        // Every particle plus the pointer ring
        let glyph_capacity = PARTICLE_CAP_LIMIT + 1;
        let glyph_buffer = glyph_buffer(device, glyph_capacity);

        let canvas = Canvas::new(
            device,
            &canvas_layout,
            &canvas_sampler,
            format,
            ctx.config.width,
            ctx.config.height,
        );

        Self {
            fade_pipeline,
            line_pipeline,
            glyph_pipeline,
            blit_pipeline,
            quad_buffer,
            vertex_buffer,
            vertex_capacity,
            glyph_buffer,
            glyph_capacity,
            camera_buffer,
            camera_bind_group,
            canvas_layout,
            canvas_sampler,
            canvas,
            format,
            needs_clear: true,
            truncation_logged: false,
        }
    }

    /// Recreate the canvas texture for a new surface size. The old contents
    /// are dropped, so the next frame starts from the background color.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.canvas = Canvas::new(
            device,
            &self.canvas_layout,
            &self.canvas_sampler,
            self.format,
            width,
            height,
        );
        self.needs_clear = true;
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &Camera2D) {
        let uniform = CameraUniform::from_camera_2d(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Upload the frame's geometry
    pub fn update_scene(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &FrameScene) -> FrameDraw {
        let mut vertices = Vec::with_capacity(FADE_VERTICES as usize + scene.line_count() * 2);
        push_fade_quad(&mut vertices, scene.extent, scene.fade);

        let limit = MAX_LINE_VERTICES.min(max_vertices(device));
        'layers: for layer in scene.line_layers() {
            for segment in layer {
                if vertices.len() + 2 > limit {
                    if !self.truncation_logged {
                        log::warn!("Line geometry exceeds {} vertices; dropping the rest", limit);
                        self.truncation_logged = true;
                    }
                    break 'layers;
                }
                vertices.push(Vertex::new(segment.from.to_array(), segment.color));
                vertices.push(Vertex::new(segment.to.to_array(), segment.color));
            }
        }

        if vertices.len() > self.vertex_capacity {
            self.vertex_capacity = vertices.len().next_power_of_two().min(limit);
            self.vertex_buffer = vertex_buffer(device, self.vertex_capacity);
            log::debug!("Line buffer grown to {} vertices", self.vertex_capacity);
        }
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));

        let mut glyphs: Vec<GlyphInstance> = scene.glyphs.iter().map(GlyphInstance::particle).collect();
        if let Some(ring) = &scene.pointer {
            glyphs.push(GlyphInstance::pointer(ring));
        }
        if glyphs.len() > self.glyph_capacity {
            self.glyph_capacity = glyphs.len().next_power_of_two();
            self.glyph_buffer = glyph_buffer(device, self.glyph_capacity);
        }
        if !glyphs.is_empty() {
            queue.write_buffer(&self.glyph_buffer, 0, bytemuck::cast_slice(&glyphs));
        }

        FrameDraw {
            line_vertices: (vertices.len() as u32).saturating_sub(FADE_VERTICES),
            glyphs: glyphs.len() as u32,
        }
    }

    pub fn render(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, draw: FrameDraw) {
        let load = if self.needs_clear {
            wgpu::LoadOp::Clear(BACKGROUND)
        } else {
            wgpu::LoadOp::Load
        };
        self.needs_clear = false;

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Canvas Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.canvas.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

            // Fade the previous frame
            render_pass.set_pipeline(&self.fade_pipeline);
            render_pass.draw(0..FADE_VERTICES, 0..1);

            // Grid, trails and links
            if draw.line_vertices > 0 {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.draw(FADE_VERTICES..FADE_VERTICES + draw.line_vertices, 0..1);
            }

            // Particles, then the pointer ring
            if draw.glyphs > 0 {
                render_pass.set_pipeline(&self.glyph_pipeline);
                render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.glyph_buffer.slice(..));
                render_pass.draw(0..6, 0..draw.glyphs);
            }
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Blit Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(BACKGROUND),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        render_pass.set_pipeline(&self.blit_pipeline);
        render_pass.set_bind_group(0, &self.canvas.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

fn shape_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    label: &str,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_shape",
            buffers: &[Vertex::LAYOUT],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_shape",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

fn vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Line Buffer"),
        size: (std::mem::size_of::<Vertex>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn glyph_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Glyph Buffer"),
        size: (std::mem::size_of::<GlyphInstance>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn max_vertices(device: &wgpu::Device) -> usize {
    (device.limits().max_buffer_size / std::mem::size_of::<Vertex>() as u64) as usize
}

/// Two triangles covering the whole canvas
fn push_fade_quad(vertices: &mut Vec<Vertex>, extent: Vec2, color: Rgba) {
    let (w, h) = (extent.x, extent.y);
    for corner in [[0.0, 0.0], [w, 0.0], [w, h], [0.0, 0.0], [w, h], [0.0, h]] {
        vertices.push(Vertex::new(corner, color));
    }
}
