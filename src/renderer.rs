use std::borrow::Cow;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use glam::Mat4;
use wgpu::util::DeviceExt;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::camera::PerspectiveCamera;
use crate::config::TunnelConfig;
use crate::core::{Fade, FlightState, FrameState, GpuContext, SceneRenderer, Viewport};
use crate::error::{Result, TunnelError};
use crate::hud::{Hud, HudStatus};
use crate::math::Rgb8;
use crate::scenes::TunnelScene;
use crate::types::{SceneUniform, SpriteInstance, StarInstance, TubeVertex};

const SHADER_COMMON: &str = include_str!("shaders/common.wgsl");
const QUAD_VERTICES: u32 = 6;

const TUBE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const STAR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
// SpriteInstance pads position to 16 bytes
const SPRITE_ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x2,
        offset: 16,
        shader_location: 1,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x2,
        offset: 24,
        shader_location: 2,
    },
];

/// Material constants that do not change after mount
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub fog_density: f32,
    pub tube_opacity: f32,
    pub star_size: f32,
    pub star_opacity: f32,
    pub label_opacity: f32,
    pub max_pixel_ratio: f64,
    pub background: Rgb8,
    pub idle_intensity: f32,
    pub fade_seconds: f32,
}

impl RenderSettings {
    pub fn from_config(config: &TunnelConfig) -> Result<Self> {
        Ok(Self {
            fog_density: config.render.fog_density,
            tube_opacity: config.tube.opacity,
            star_size: config.stars.size,
            star_opacity: config.stars.opacity,
            label_opacity: config.labels.opacity,
            max_pixel_ratio: config.render.max_pixel_ratio,
            background: Rgb8::from_hex(&config.render.background)?,
            idle_intensity: config.render.idle_intensity,
            fade_seconds: config.render.fade_seconds,
        })
    }

    /// Brightness the scene fades towards in the given flight state
    pub fn intensity_target(&self, flight: FlightState) -> f32 {
        match flight {
            FlightState::Active => 1.0,
            FlightState::Idle | FlightState::Completed => self.idle_intensity,
        }
    }

    /// Clear color for an sRGB surface
    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b] = self.background.to_linear();
        wgpu::Color {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
            a: 1.0,
        }
    }
}

/// Uniform contents for one frame
pub fn scene_uniform(
    camera: &PerspectiveCamera,
    frame: &FrameState,
    settings: &RenderSettings,
    intensity: f32,
) -> SceneUniform {
    SceneUniform {
        view_proj: camera.view_proj().to_cols_array_2d(),
        tube_model: Mat4::from_rotation_z(frame.tube_angle).to_cols_array_2d(),
        camera_position: camera.position().to_array(),
        fog_density: settings.fog_density,
        camera_right: camera.right().to_array(),
        tube_opacity: settings.tube_opacity,
        camera_up: camera.up().to_array(),
        star_opacity: settings.star_opacity,
        label_opacity: settings.label_opacity,
        star_size: settings.star_size,
        intensity,
        _pad: 0.0,
    }
}

/// GPU-side copies of the scene
struct SceneBuffers {
    uniform: wgpu::Buffer,
    tube_vertices: wgpu::Buffer,
    tube_edges: wgpu::Buffer,
    edge_count: u32,
    stars: wgpu::Buffer,
    star_count: u32,
    sprites: wgpu::Buffer,
    sprite_count: u32,
    atlas: wgpu::Texture,
}

impl SceneBuffers {
    fn destroy(&self) {
        self.uniform.destroy();
        self.tube_vertices.destroy();
        self.tube_edges.destroy();
        self.stars.destroy();
        self.sprites.destroy();
        self.atlas.destroy();
    }
}

/// Draws the tunnel scene into a window surface
pub struct GpuTunnelRenderer {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    gpu: GpuContext,
    surface_config: wgpu::SurfaceConfiguration,
    settings: RenderSettings,
    tube_pipeline: wgpu::RenderPipeline,
    star_pipeline: wgpu::RenderPipeline,
    sprite_pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    buffers: SceneBuffers,
    hud: Option<Hud>,
    status: HudStatus,
    intensity: Fade,
    released: bool,
}

impl GpuTunnelRenderer {
    pub async fn new(
        window: Arc<Window>,
        scene: &TunnelScene,
        settings: RenderSettings,
        viewport: Viewport,
        with_hud: bool,
    ) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;
        let gpu = GpuContext::for_surface(&instance, &surface).await?;

        let (width, height) = viewport.surface_size(settings.max_pixel_ratio);
        let surface_config = gpu.surface_config(&surface, width, height)?;
        surface.configure(gpu.device(), &surface_config);

        let buffers = Self::create_buffers(&gpu, scene)?;
        let (bind_group_layout, bind_group) = Self::create_bind_group(gpu.device(), &buffers);

        let format = surface_config.format;
        let device = gpu.device();
        let tube_pipeline = Self::create_pipeline(
            device,
            &bind_group_layout,
            format,
            PipelineSpec {
                label: "Tube Pipeline",
                source: include_str!("shaders/tube.wgsl"),
                vs_entry: "vs_tube",
                fs_entry: "fs_tube",
                buffer: wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<TubeVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &TUBE_ATTRIBUTES,
                },
                topology: wgpu::PrimitiveTopology::LineList,
            },
        );
        let star_pipeline = Self::create_pipeline(
            device,
            &bind_group_layout,
            format,
            PipelineSpec {
                label: "Star Pipeline",
                source: include_str!("shaders/stars.wgsl"),
                vs_entry: "vs_star",
                fs_entry: "fs_star",
                buffer: wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<StarInstance>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &STAR_ATTRIBUTES,
                },
                topology: wgpu::PrimitiveTopology::TriangleList,
            },
        );
        let sprite_pipeline = Self::create_pipeline(
            device,
            &bind_group_layout,
            format,
            PipelineSpec {
                label: "Sprite Pipeline",
                source: include_str!("shaders/sprites.wgsl"),
                vs_entry: "vs_sprite",
                fs_entry: "fs_sprite",
                buffer: wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SpriteInstance>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &SPRITE_ATTRIBUTES,
                },
                topology: wgpu::PrimitiveTopology::TriangleList,
            },
        );

        let hud = with_hud.then(|| Hud::new(&window, device, format));
        let intensity = Fade::new(settings.idle_intensity, settings.fade_seconds);

        log::info!(
            "Tunnel renderer initialized: {}x{} {:?}, {} edges, {} stars, {} labels",
            surface_config.width,
            surface_config.height,
            format,
            buffers.edge_count,
            buffers.star_count,
            buffers.sprite_count
        );

        Ok(Self {
            window,
            surface,
            gpu,
            surface_config,
            settings,
            tube_pipeline,
            star_pipeline,
            sprite_pipeline,
            bind_group,
            buffers,
            hud,
            status: HudStatus::default(),
            intensity,
            released: false,
        })
    }

    /// Overlay contents for the next frame
    pub fn set_status(&mut self, status: HudStatus) {
        self.status = status;
    }

    /// Returns true when the overlay consumed the event
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match &mut self.hud {
            Some(hud) => hud.handle_event(&self.window, event),
            None => false,
        }
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    fn create_buffers(gpu: &GpuContext, scene: &TunnelScene) -> anyhow::Result<SceneBuffers> {
        let device = gpu.device();

        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform"),
            size: std::mem::size_of::<SceneUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let tube_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Tube Vertices"),
            contents: bytemuck::cast_slice(&scene.tube.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let edges = scene.tube.wireframe_edges();
        let tube_edges = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Tube Edges"),
            contents: bytemuck::cast_slice(&edges),
            usage: wgpu::BufferUsages::INDEX,
        });

        let star_instances: Vec<StarInstance> = scene
            .stars
            .positions
            .iter()
            .map(|p| StarInstance {
                position: p.to_array(),
            })
            .collect();
        let stars = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Star Instances"),
            contents: bytemuck::cast_slice(&star_instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let sprite_instances: Vec<SpriteInstance> = scene
            .labels
            .iter()
            .map(|label| SpriteInstance {
                position: label.position.to_array(),
                _pad: 0.0,
                size: label.size,
                uv_rows: scene.atlas.uv_rows(label),
            })
            .collect();
        let sprites = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Label Instances"),
            contents: bytemuck::cast_slice(&sprite_instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let atlas = Self::create_atlas(gpu, scene)?;

        Ok(SceneBuffers {
            uniform,
            tube_vertices,
            tube_edges,
            edge_count: edges.len() as u32,
            stars,
            star_count: star_instances.len() as u32,
            sprites,
            sprite_count: sprite_instances.len() as u32,
            atlas,
        })
    }

    fn create_atlas(gpu: &GpuContext, scene: &TunnelScene) -> anyhow::Result<wgpu::Texture> {
        let texture = &scene.atlas.texture;
        let (width, height, pixels) = if scene.atlas.rows == 0 || texture.pixels.is_empty() {
            (1, 1, Cow::Owned(vec![0u8; 4]))
        } else {
            (texture.width, texture.height, Cow::Borrowed(texture.pixels.as_slice()))
        };

        let max = gpu.device().limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(anyhow!(TunnelError::RenderContext(format!(
                "label atlas {width}x{height} exceeds the {max}px texture limit"
            ))));
        }

        Ok(gpu.device().create_texture_with_data(
            gpu.queue(),
            &wgpu::TextureDescriptor {
                label: Some("Label Atlas"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &pixels,
        ))
    }

    fn create_bind_group(
        device: &wgpu::Device,
        buffers: &SceneBuffers,
    ) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("scene_bind_group_layout"),
        });

        let atlas_view = buffers
            .atlas
            .create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("scene_bind_group"),
        });

        (layout, bind_group)
    }

    fn create_pipeline(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        format: wgpu::TextureFormat,
        spec: PipelineSpec<'_>,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(spec.label),
            source: wgpu::ShaderSource::Wgsl(format!("{SHADER_COMMON}\n{}", spec.source).into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(spec.label),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(spec.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(spec.vs_entry),
                buffers: &[spec.buffer],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(spec.fs_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: spec.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn draw(&mut self, uniform: &SceneUniform) -> anyhow::Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(self.gpu.device(), &self.surface_config);
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to acquire surface texture"),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.gpu
            .queue()
            .write_buffer(&self.buffers.uniform, 0, bytemuck::bytes_of(uniform));

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Tunnel Encoder"),
            });

        // No depth buffer: stars, then the tube, then labels, all blended
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Tunnel Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.settings.clear_color()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_bind_group(0, &self.bind_group, &[]);

            let buffers = &self.buffers;
            if buffers.star_count > 0 {
                pass.set_pipeline(&self.star_pipeline);
                pass.set_vertex_buffer(0, buffers.stars.slice(..));
                pass.draw(0..QUAD_VERTICES, 0..buffers.star_count);
            }
            if buffers.edge_count > 0 {
                pass.set_pipeline(&self.tube_pipeline);
                pass.set_vertex_buffer(0, buffers.tube_vertices.slice(..));
                pass.set_index_buffer(buffers.tube_edges.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..buffers.edge_count, 0, 0..1);
            }
            if buffers.sprite_count > 0 {
                pass.set_pipeline(&self.sprite_pipeline);
                pass.set_vertex_buffer(0, buffers.sprites.slice(..));
                pass.draw(0..QUAD_VERTICES, 0..buffers.sprite_count);
            }
        }

        if let Some(hud) = &mut self.hud {
            hud.draw(
                &self.window,
                self.gpu.device(),
                self.gpu.queue(),
                &mut encoder,
                &view,
                [self.surface_config.width, self.surface_config.height],
                &self.status,
            );
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }
}

struct PipelineSpec<'a> {
    label: &'a str,
    source: &'a str,
    vs_entry: &'a str,
    fs_entry: &'a str,
    buffer: wgpu::VertexBufferLayout<'a>,
    topology: wgpu::PrimitiveTopology,
}

impl SceneRenderer for GpuTunnelRenderer {
    fn render(&mut self, camera: &PerspectiveCamera, frame: &FrameState) -> anyhow::Result<()> {
        if self.released {
            return Ok(());
        }
        let target = self.settings.intensity_target(frame.flight);
        let intensity = self.intensity.tick(target, frame.info.delta);
        let uniform = scene_uniform(camera, frame, &self.settings, intensity);
        self.draw(&uniform)
    }

    fn resize(&mut self, viewport: Viewport) {
        if self.released {
            return;
        }
        let (width, height) = viewport.surface_size(self.settings.max_pixel_ratio);
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(self.gpu.device(), &self.surface_config);
        log::debug!("Surface resized to {width}x{height}");
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.hud = None;
        self.buffers.destroy();
        log::info!("Tunnel GPU resources released");
    }
}
