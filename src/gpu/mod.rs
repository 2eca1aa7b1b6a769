//! wgpu renderer for the cloth viewer.
//!
//! Draws the floor grid and the cloth mesh as line lists, and mass points
//! plus the device cursor as screen-space billboards. The depth buffer is
//! kept copyable so [`DepthProbe`] can read the texel under the cursor.

mod depth_probe;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::cloth::ClothState;
use crate::error::GpuError;

pub use depth_probe::DepthProbe;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Point marker diameter in pixels.
const POINT_SIZE: f32 = 5.0;

const MESH_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
const FLOOR_COLOR: [f32; 3] = [0.5, 0.5, 0.5];
const POINT_COLOR: [f32; 3] = [1.0, 0.0, 0.0];
const SELECTED_COLOR: [f32; 3] = [0.0, 1.0, 1.0];
const CURSOR_COLOR: [f32; 3] = [1.0, 0.8, 0.2];

/// Floor grid spans `-FLOOR_EXTENT..=FLOOR_EXTENT` on X and Z.
const FLOOR_EXTENT: i32 = 10;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    viewport: [f32; 2],
    point_size: f32,
    _padding: f32,
}

/// Position and color. Used as a line vertex and as a point instance.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ColoredVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ColoredVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn new(position: Vec3, color: [f32; 3]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }

    fn layout(step_mode: wgpu::VertexStepMode) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// What one frame shows.
pub struct Scene<'a> {
    pub cloth: &'a ClothState,
    pub view_proj: Mat4,
    pub selected: Option<usize>,
    pub show_points: bool,
    /// Device cursor position, if a device is sampling.
    pub cursor: Option<Vec3>,
}

/// Edge list of the cloth mesh: three edges per triangle.
pub fn mesh_lines(cloth: &ClothState, out: &mut Vec<ColoredVertex>) {
    out.clear();
    for [a, b, c] in cloth.triangle_vertices() {
        for (p, q) in [(a, b), (b, c), (c, a)] {
            out.push(ColoredVertex::new(p, MESH_COLOR));
            out.push(ColoredVertex::new(q, MESH_COLOR));
        }
    }
}

/// Point billboards: one per mass point when enabled, then the cursor.
pub fn point_instances(scene: &Scene<'_>, out: &mut Vec<ColoredVertex>) {
    out.clear();
    if scene.show_points {
        out.extend(scene.cloth.positions().iter().enumerate().map(|(i, p)| {
            let color = if scene.selected == Some(i) {
                SELECTED_COLOR
            } else {
                POINT_COLOR
            };
            ColoredVertex::new(*p, color)
        }));
    }
    if let Some(cursor) = scene.cursor {
        out.push(ColoredVertex::new(cursor, CURSOR_COLOR));
    }
}

/// Floor grid lines on the `y = 0` plane.
pub fn floor_lines() -> Vec<ColoredVertex> {
    let e = FLOOR_EXTENT as f32;
    (-FLOOR_EXTENT..=FLOOR_EXTENT)
        .flat_map(|i| {
            let t = i as f32;
            [
                ColoredVertex::new(Vec3::new(t, 0.0, -e), FLOOR_COLOR),
                ColoredVertex::new(Vec3::new(t, 0.0, e), FLOOR_COLOR),
                ColoredVertex::new(Vec3::new(-e, 0.0, t), FLOOR_COLOR),
                ColoredVertex::new(Vec3::new(e, 0.0, t), FLOOR_COLOR),
            ]
        })
        .collect()
}

/// Vertex buffer rewritten every frame, grown when the data outgrows it.
struct StreamBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    len: u32,
    label: &'static str,
}

impl StreamBuffer {
    fn new(device: &wgpu::Device, label: &'static str, capacity: usize) -> Self {
        Self {
            buffer: Self::allocate(device, label, capacity),
            capacity,
            len: 0,
            label,
        }
    }

    fn allocate(device: &wgpu::Device, label: &'static str, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity.max(1) * std::mem::size_of::<ColoredVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[ColoredVertex]) {
        if data.len() > self.capacity {
            self.capacity = data.len().next_power_of_two();
            self.buffer = Self::allocate(device, self.label, self.capacity);
            log::debug!("Grew {} to {} vertices", self.label, self.capacity);
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
        self.len = data.len() as u32;
    }
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    line_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    floor_buffer: wgpu::Buffer,
    floor_len: u32,
    mesh: StreamBuffer,
    points: StreamBuffer,
    mesh_scratch: Vec<ColoredVertex>,
    point_scratch: Vec<ColoredVertex>,
    probe: DepthProbe,
    probe_result: Option<((u32, u32), f32)>,
}

impl Renderer {
    /// Create the surface, device and pipelines. `point_count` sizes the
    /// initial vertex buffers.
    pub async fn new(window: Arc<Window>, point_count: usize, triangle_count: usize) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("Using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let (depth_texture, depth_view) = create_depth_texture(&device, &config);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            config.format,
            "Line",
            LINE_SHADER,
            wgpu::PrimitiveTopology::LineList,
            wgpu::VertexStepMode::Vertex,
        );
        let point_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            config.format,
            "Point",
            POINT_SHADER,
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::VertexStepMode::Instance,
        );

        let floor = floor_lines();
        let floor_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Floor Buffer"),
            contents: bytemuck::cast_slice(&floor),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let probe = DepthProbe::new(&device, config.width, config.height);

        Ok(Self {
            surface,
            mesh: StreamBuffer::new(&device, "Mesh Buffer", triangle_count * 6),
            points: StreamBuffer::new(&device, "Point Buffer", point_count + 1),
            device,
            queue,
            config,
            line_pipeline,
            point_pipeline,
            uniform_buffer,
            uniform_bind_group,
            depth_texture,
            depth_view,
            floor_buffer,
            floor_len: floor.len() as u32,
            mesh_scratch: Vec::new(),
            point_scratch: Vec::new(),
            probe,
            probe_result: None,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            let (texture, view) = create_depth_texture(&self.device, &self.config);
            self.depth_texture = texture;
            self.depth_view = view;
            self.probe.resize(new_size.width, new_size.height);
        }
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.config.width as f32, self.config.height as f32)
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Ask for the scene depth under pixel `(x, y)`. The answer is available
    /// from [`take_depth_probe`](Self::take_depth_probe) after the next
    /// [`render`](Self::render).
    pub fn request_depth_probe(&mut self, x: u32, y: u32) {
        self.probe.request(x, y);
    }

    pub fn take_depth_probe(&mut self) -> Option<((u32, u32), f32)> {
        self.probe_result.take()
    }

    pub fn render(&mut self, scene: &Scene<'_>) -> Result<(), wgpu::SurfaceError> {
        let uniforms = Uniforms {
            view_proj: scene.view_proj.to_cols_array_2d(),
            viewport: self.viewport().to_array(),
            point_size: POINT_SIZE,
            _padding: 0.0,
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        mesh_lines(scene.cloth, &mut self.mesh_scratch);
        self.mesh.write(&self.device, &self.queue, &self.mesh_scratch);
        point_instances(scene, &mut self.point_scratch);
        self.points.write(&self.device, &self.queue, &self.point_scratch);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            render_pass.set_pipeline(&self.line_pipeline);
            render_pass.set_vertex_buffer(0, self.floor_buffer.slice(..));
            render_pass.draw(0..self.floor_len, 0..1);
            if self.mesh.len > 0 {
                render_pass.set_vertex_buffer(0, self.mesh.buffer.slice(..));
                render_pass.draw(0..self.mesh.len, 0..1);
            }

            if self.points.len > 0 {
                render_pass.set_pipeline(&self.point_pipeline);
                render_pass.set_vertex_buffer(0, self.points.buffer.slice(..));
                render_pass.draw(0..6, 0..self.points.len);
            }
        }

        self.probe.copy_texel(&mut encoder, &self.depth_texture);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(result) = self.probe.read(&self.device) {
            self.probe_result = Some(result);
        }

        Ok(())
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    label: &str,
    source: &str,
    topology: wgpu::PrimitiveTopology,
    step_mode: wgpu::VertexStepMode,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{label} Shader")),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{label} Pipeline")),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[ColoredVertex::layout(step_mode)],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        // COPY_SRC for the depth probe
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

const LINE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    viewport: vec2<f32>,
    point_size: f32,
    _padding: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;

const POINT_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    viewport: vec2<f32>,
    point_size: f32,
    _padding: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[vertex_index];

    // Fixed pixel size: offset in NDC, scaled by w to survive the divide
    let clip = uniforms.view_proj * vec4<f32>(position, 1.0);
    let offset = corner * uniforms.point_size / uniforms.viewport;

    var out: VertexOutput;
    out.clip_position = vec4<f32>(clip.xy + offset * clip.w, clip.z, clip.w);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;
