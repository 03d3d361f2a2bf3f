use std::sync::Arc;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::animator::SceneAnimator;
use crate::core::{GpuContext, GpuProbe};
use crate::geometry::icosphere;
use crate::types::{
    dust_instance_layout, OrbInstance, QuadCorner, SceneUniform, SphereVertex, TerrainVertex,
};

const ORB_SUBDIVISIONS: u32 = 3;

/// Depth target matching the surface size
struct DepthBuffer {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthBuffer {
    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Buffer"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { view, width, height }
    }

    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.width != width || self.height != height {
            *self = Self::new(device, width, height);
        }
    }
}

/// FPS and time-of-day readout drawn on top of the scene
struct Overlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

/// How one pipeline differs from the others
struct PipelineSpec<'a> {
    label: &'a str,
    vs: &'a str,
    fs: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    blend: wgpu::BlendState,
    depth_write: bool,
    cull_mode: Option<wgpu::Face>,
}

pub struct Renderer {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    depth: DepthBuffer,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    terrain_pipeline: wgpu::RenderPipeline,
    orb_opaque_pipeline: wgpu::RenderPipeline,
    orb_translucent_pipeline: wgpu::RenderPipeline,
    dust_pipeline: wgpu::RenderPipeline,
    terrain_vertex_buffer: wgpu::Buffer,
    terrain_index_buffer: wgpu::Buffer,
    terrain_index_count: u32,
    sphere_vertex_buffer: wgpu::Buffer,
    sphere_index_buffer: wgpu::Buffer,
    sphere_index_count: u32,
    orb_instance_buffer: wgpu::Buffer,
    quad_buffer: wgpu::Buffer,
    dust_buffer: wgpu::Buffer,
    // Reused staging vectors, rewritten every frame
    terrain_vertices: Vec<TerrainVertex>,
    orb_instances: Vec<OrbInstance>,
    overlay: Option<Overlay>,
}

impl Renderer {
    pub fn new(
        probe: GpuProbe,
        gpu: GpuContext,
        window: &Arc<Window>,
        scene: &SceneAnimator,
        show_ui: bool,
    ) -> Result<Self> {
        let GpuProbe { surface, adapter } = probe;
        let device = gpu.device();
        let size = window.inner_size();

        let surface_config =
            Self::create_surface_config(&surface, &adapter, size.width, size.height)?;
        surface.configure(device, &surface_config);
        let depth = DepthBuffer::new(device, surface_config.width, surface_config.height);

        let snapshot = scene.snapshot();

        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform"),
            contents: bytemuck::cast_slice(&[snapshot.uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<SceneUniform>() as u64,
                    ),
                },
                count: None,
            }],
            label: Some("scene_bind_group_layout"),
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
            label: Some("scene_bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let format = surface_config.format;

        let terrain_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            format,
            PipelineSpec {
                label: "Terrain Pipeline",
                vs: "vs_terrain",
                fs: "fs_terrain",
                buffers: &[TerrainVertex::layout()],
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
                cull_mode: None,
            },
        );
        let orb_opaque_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            format,
            PipelineSpec {
                label: "Orb Opaque Pipeline",
                vs: "vs_orb",
                fs: "fs_orb",
                buffers: &[SphereVertex::layout(), OrbInstance::layout()],
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
                cull_mode: Some(wgpu::Face::Back),
            },
        );
        let orb_translucent_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            format,
            PipelineSpec {
                label: "Orb Translucent Pipeline",
                vs: "vs_orb",
                fs: "fs_orb",
                buffers: &[SphereVertex::layout(), OrbInstance::layout()],
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
                cull_mode: Some(wgpu::Face::Back),
            },
        );
        let dust_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            format,
            PipelineSpec {
                label: "Dust Pipeline",
                vs: "vs_dust",
                fs: "fs_dust",
                buffers: &[QuadCorner::layout(), dust_instance_layout()],
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
                cull_mode: None,
            },
        );

        let mut terrain_vertices = Vec::with_capacity(snapshot.terrain.vertex_count());
        snapshot
            .terrain
            .write_vertices(snapshot.dune_amplitude, &mut terrain_vertices);
        let terrain_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Vertices"),
            contents: bytemuck::cast_slice(&terrain_vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let terrain_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Indices"),
            contents: bytemuck::cast_slice(snapshot.terrain.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        let sphere = icosphere(ORB_SUBDIVISIONS);
        let sphere_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Orb Sphere Vertices"),
            contents: bytemuck::cast_slice(&sphere.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sphere_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Orb Sphere Indices"),
            contents: bytemuck::cast_slice(&sphere.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        // Entity counts are fixed for the life of the scene
        let orb_count = snapshot.orbs.orbs().len().max(1);
        let orb_instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Orb Instances"),
            size: (orb_count * std::mem::size_of::<OrbInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Dust Quad"),
            contents: bytemuck::cast_slice(&QuadCorner::QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let dust_bytes = std::mem::size_of_val(snapshot.dust).max(3 * std::mem::size_of::<f32>());
        let dust_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Dust Positions"),
            size: dust_bytes as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let overlay = show_ui.then(|| {
            let ctx = egui::Context::default();
            let state = egui_winit::State::new(
                ctx.clone(),
                egui::ViewportId::ROOT,
                window,
                Some(window.scale_factor() as f32),
                None,
                None,
            );
            let renderer =
                egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());
            Overlay { ctx, state, renderer }
        });

        log::info!(
            "Renderer ready: {}x{} {:?}, {} terrain indices, {} sphere indices",
            surface_config.width,
            surface_config.height,
            format,
            snapshot.terrain.indices().len(),
            sphere.indices.len()
        );

        Ok(Self {
            terrain_index_count: snapshot.terrain.indices().len() as u32,
            sphere_index_count: sphere.indices.len() as u32,
            gpu,
            surface,
            surface_config,
            depth,
            scene_buffer,
            scene_bind_group,
            terrain_pipeline,
            orb_opaque_pipeline,
            orb_translucent_pipeline,
            dust_pipeline,
            terrain_vertex_buffer,
            terrain_index_buffer,
            sphere_vertex_buffer,
            sphere_index_buffer,
            orb_instance_buffer,
            quad_buffer,
            dust_buffer,
            terrain_vertices,
            orb_instances: Vec::with_capacity(orb_count),
            overlay,
        })
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        spec: PipelineSpec,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(spec.label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(spec.vs),
                buffers: spec.buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(spec.fs),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(spec.blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: spec.cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DepthBuffer::FORMAT,
                depth_write_enabled: spec.depth_write,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    /// Resize surface and depth target; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.reconfigure();
    }

    /// Reapply the current surface configuration, e.g. after the surface was lost
    pub fn reconfigure(&mut self) {
        let device = self.gpu.device();
        self.surface.configure(device, &self.surface_config);
        self.depth
            .resize(device, self.surface_config.width, self.surface_config.height);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Pass a window event to the overlay; true when egui consumed it
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        match &mut self.overlay {
            Some(overlay) => overlay.state.on_window_event(window, event).consumed,
            None => false,
        }
    }

    pub fn render(
        &mut self,
        scene: &SceneAnimator,
        window: &Window,
        fps: f32,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let snapshot = scene.snapshot();
        let queue = self.gpu.queue();

        queue.write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[snapshot.uniform]));

        snapshot
            .terrain
            .write_vertices(snapshot.dune_amplitude, &mut self.terrain_vertices);
        queue.write_buffer(
            &self.terrain_vertex_buffer,
            0,
            bytemuck::cast_slice(&self.terrain_vertices),
        );

        let reflective = snapshot.orbs.write_instances(&mut self.orb_instances) as u32;
        let orb_total = self.orb_instances.len() as u32;
        if orb_total > 0 {
            queue.write_buffer(
                &self.orb_instance_buffer,
                0,
                bytemuck::cast_slice(&self.orb_instances),
            );
        }

        let dust_count = (snapshot.dust.len() / 3) as u32;
        if dust_count > 0 {
            queue.write_buffer(&self.dust_buffer, 0, bytemuck::cast_slice(snapshot.dust));
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let bg = snapshot.background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.x as f64,
                            g: bg.y as f64,
                            b: bg.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_bind_group(0, &self.scene_bind_group, &[]);

            pass.set_pipeline(&self.terrain_pipeline);
            pass.set_vertex_buffer(0, self.terrain_vertex_buffer.slice(..));
            pass.set_index_buffer(self.terrain_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.terrain_index_count, 0, 0..1);

            if orb_total > 0 {
                pass.set_vertex_buffer(0, self.sphere_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.orb_instance_buffer.slice(..));
                pass.set_index_buffer(self.sphere_index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                // Opaque first so translucent orbs blend over them
                pass.set_pipeline(&self.orb_opaque_pipeline);
                pass.draw_indexed(0..self.sphere_index_count, 0, 0..reflective);
                pass.set_pipeline(&self.orb_translucent_pipeline);
                pass.draw_indexed(0..self.sphere_index_count, 0, reflective..orb_total);
            }

            if dust_count > 0 {
                pass.set_pipeline(&self.dust_pipeline);
                pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
                pass.set_vertex_buffer(1, self.dust_buffer.slice(..));
                pass.draw(0..QuadCorner::QUAD.len() as u32, 0..dust_count);
            }
        }

        if let Some(overlay) = &mut self.overlay {
            let time_of_day = snapshot.time_of_day.value();
            let variant = scene.config().variant.name();

            let raw_input = overlay.state.take_egui_input(window);
            let full_output = overlay.ctx.run(raw_input, |ctx| {
                egui::Window::new("Backdrop")
                    .title_bar(false)
                    .resizable(false)
                    .fixed_pos(egui::pos2(10.0, 10.0))
                    .frame(egui::Frame::NONE)
                    .show(ctx, |ui| {
                        ui.label(
                            egui::RichText::new(format!("{:.0}", fps))
                                .size(32.0)
                                .color(egui::Color32::from_rgb(242, 210, 160)),
                        );
                        ui.label(
                            egui::RichText::new(format!("{} / time of day {:.2}", variant, time_of_day))
                                .size(12.0)
                                .color(egui::Color32::GRAY),
                        );
                    });
            });

            overlay
                .state
                .handle_platform_output(window, full_output.platform_output);

            let device = self.gpu.device();
            let tris = overlay
                .ctx
                .tessellate(full_output.shapes, overlay.ctx.pixels_per_point());
            for (id, image_delta) in &full_output.textures_delta.set {
                overlay
                    .renderer
                    .update_texture(device, queue, *id, image_delta);
            }

            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.surface_config.width, self.surface_config.height],
                pixels_per_point: window.scale_factor() as f32,
            };
            overlay
                .renderer
                .update_buffers(device, queue, &mut encoder, &tris, &screen_descriptor);

            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Overlay Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                            depth_slice: None,
                        })],
                        depth_stencil_attachment: None,
                        occlusion_query_set: None,
                        timestamp_writes: None,
                    })
                    .forget_lifetime();
                overlay.renderer.render(&mut pass, &tris, &screen_descriptor);
            }

            for id in &full_output.textures_delta.free {
                overlay.renderer.free_texture(id);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
