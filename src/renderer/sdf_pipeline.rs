//! SDF-based WebGPU render pipeline
//!
//! Raymarches the coin in the fragment shader; the whole scene is one
//! fullscreen triangle plus a single uniform block.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::error::InitError;
use crate::settings::Settings;
use crate::sim::{Light, Scene, SpinSource};

/// Clear color behind the coin
const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.05, 1.0];

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 4],     // xy = pixels, z = time, w = tan(fov_y / 2)
    camera_pos: [f32; 4],     // w = raymarch step budget
    camera_forward: [f32; 4],
    camera_right: [f32; 4],   // w = aspect
    camera_up: [f32; 4],
    coin: [f32; 4],           // radius, half thickness, inset radius, inset half height
    coin_rotation: [f32; 4],  // sin, cos of orientation
    ambient: [f32; 4],        // rgb, intensity
    key_pos: [f32; 4],
    key_color: [f32; 4],      // rgb, intensity
    fill_pos: [f32; 4],
    fill_color: [f32; 4],     // rgb, intensity
    spot_pos: [f32; 4],       // w = range
    spot_color: [f32; 4],     // rgb, intensity
    spot_dir: [f32; 4],       // w = cos(cone angle)
    background: [f32; 4],
}

fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

/// Pack one light as (position, color+intensity)
fn pack_light(light: &Light) -> ([f32; 4], [f32; 4]) {
    match *light {
        Light::Ambient { color, intensity } => ([0.0; 4], vec4(color, intensity)),
        Light::Directional {
            position,
            color,
            intensity,
        } => (vec4(position, 0.0), vec4(color, intensity)),
        Light::Spot {
            position,
            color,
            intensity,
            distance,
            ..
        } => (vec4(position, distance), vec4(color, intensity)),
    }
}

impl Globals {
    fn from_scene<S: SpinSource>(scene: &Scene<S>, settings: &Settings, time: f32) -> Self {
        let camera = &scene.camera;
        let (right, up) = camera.basis();
        let geometry = scene.coin.geometry;
        let (sin, cos) = scene.coin.orientation.sin_cos();

        let (_, ambient) = pack_light(&scene.lights.ambient);
        let (key_pos, key_color) = pack_light(&scene.lights.key);
        let (fill_pos, fill_color) = pack_light(&scene.lights.fill);
        let (spot_pos, spot_color) = pack_light(&scene.lights.spot);
        let spot_dir = match scene.lights.spot {
            // Spot lights aim at the origin
            Light::Spot { position, angle, .. } => vec4((-position).normalize_or_zero(), angle.cos()),
            _ => [0.0, 0.0, -1.0, 1.0],
        };

        Self {
            resolution: [
                scene.viewport.pixels.0 as f32,
                scene.viewport.pixels.1 as f32,
                time,
                (camera.fov_y * 0.5).tan(),
            ],
            camera_pos: vec4(camera.position, settings.quality.raymarch_steps() as f32),
            camera_forward: vec4(camera.forward(), 0.0),
            camera_right: vec4(right, camera.aspect),
            camera_up: vec4(up, 0.0),
            coin: [
                geometry.radius,
                geometry.thickness * 0.5,
                geometry.inset_radius,
                geometry.inset_offset,
            ],
            coin_rotation: [sin, cos, 0.0, 0.0],
            ambient,
            key_pos,
            key_color,
            fill_pos,
            fill_color,
            spot_pos,
            spot_color,
            spot_dir,
            background: BACKGROUND,
        }
    }
}

// ============================================================================
// SDF RENDER STATE
// ============================================================================

pub struct SdfRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
}

impl SdfRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, InitError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("coin-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);
        log::info!("Surface alpha modes: {:?}", surface_caps.alpha_modes);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(InitError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("coin_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("coin_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("coin_bind_group_layout"),
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

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("coin_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("coin_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("coin_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
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
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            bind_group,
            size: (width, height),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Update the uniform block from the scene and draw
    pub fn render<S: SpinSource>(
        &mut self,
        scene: &Scene<S>,
        settings: &Settings,
    ) -> Result<(), wgpu::SurfaceError> {
        let globals = Globals::from_scene(scene, settings, scene.elapsed);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("coin_encoder"),
            });

        {
            let [r, g, b, a] = BACKGROUND.map(f64::from);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("coin_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
