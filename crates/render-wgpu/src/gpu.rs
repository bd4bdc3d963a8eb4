use crate::context::GpuContext;
use crate::program::ShaderProgram;
use crate::scene::SceneAssets;
use crate::textures::GpuTexture;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use waterscape_common::WaterParams;
use waterscape_render::{FrameView, water_model_matrix};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct SkyboxUniforms {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
}

impl SkyboxUniforms {
    fn new(frame: &FrameView) -> Self {
        Self {
            view: frame.skybox_view().to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
        }
    }
}

/// Layout matches `WaterUniforms` in water.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct WaterUniforms {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    eye_pos: [f32; 3],
    time: f32,
    strengths: [f32; 4],
    tint: [f32; 3],
    refraction_ratio: f32,
    scroll: [f32; 4],
}

impl WaterUniforms {
    fn new(frame: &FrameView, params: &WaterParams) -> Self {
        Self {
            model: water_model_matrix(params.plane_scale).to_cols_array_2d(),
            view: frame.view.to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
            eye_pos: frame.eye.to_array(),
            time: frame.time,
            strengths: params.strengths,
            tint: params.tint.to_array(),
            refraction_ratio: params.refraction_ratio,
            scroll: [params.scroll_speed, params.secondary_scroll_factor, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct WaterVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

/// Unit quad in the XY plane facing +Z, as two triangles.
fn water_quad() -> Vec<WaterVertex> {
    let n = [0.0, 0.0, 1.0];
    #[rustfmt::skip]
    let vertices = vec![
        WaterVertex { position: [-0.5, -0.5, 0.0], normal: n, uv: [0.0, 0.0] },
        WaterVertex { position: [ 0.5, -0.5, 0.0], normal: n, uv: [1.0, 0.0] },
        WaterVertex { position: [ 0.5,  0.5, 0.0], normal: n, uv: [1.0, 1.0] },
        WaterVertex { position: [ 0.5,  0.5, 0.0], normal: n, uv: [1.0, 1.0] },
        WaterVertex { position: [-0.5,  0.5, 0.0], normal: n, uv: [0.0, 1.0] },
        WaterVertex { position: [-0.5, -0.5, 0.0], normal: n, uv: [0.0, 0.0] },
    ];
    vertices
}

/// Inward-facing unit cube, 36 positions, one face per six vertices.
fn skybox_cube() -> Vec<[f32; 3]> {
    #[rustfmt::skip]
    let vertices = vec![
        // -Z
        [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
        [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],
        // -X
        [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
        [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],
        // +X
        [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
        [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],
        // +Z
        [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
        [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],
        // +Y
        [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
        [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],
        // -Y
        [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
        [ 1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
    ];
    vertices
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

/// Draws the skybox and the water plane.
pub struct WaterRenderer {
    skybox: ShaderProgram,
    water: ShaderProgram,
    skybox_uniform_buffer: wgpu::Buffer,
    skybox_bind_group: wgpu::BindGroup,
    skybox_vertex_buffer: wgpu::Buffer,
    skybox_vertex_count: u32,
    water_uniform_buffer: wgpu::Buffer,
    water_bind_group: wgpu::BindGroup,
    water_vertex_buffer: wgpu::Buffer,
    water_vertex_count: u32,
    // Bound through the bind groups above; held so they live as long as the
    // renderer.
    _environment: GpuTexture,
    _normal_maps: [GpuTexture; 2],
    depth_texture: wgpu::TextureView,
    params: WaterParams,
    clear_color: wgpu::Color,
}

impl WaterRenderer {
    pub fn new(
        context: &GpuContext,
        assets: &SceneAssets,
        params: WaterParams,
        clear_color: [f64; 3],
    ) -> Self {
        let device = &context.device;
        let queue = &context.queue;
        let color_format = context.render_format();
        let (width, height) = context.size();
        let environment =
            GpuTexture::upload_cubemap(device, queue, "environment_cubemap", &assets.environment);
        let normal_maps = [
            GpuTexture::upload_2d(device, queue, "water_normal_map1", assets.normal_maps[0].as_ref()),
            GpuTexture::upload_2d(device, queue, "water_normal_map2", assets.normal_maps[1].as_ref()),
        ];

        // Skybox
        let skybox_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("skybox_uniform_buffer"),
            size: std::mem::size_of::<SkyboxUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let skybox_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox_bind_group_layout"),
            entries: &[
                uniform_entry(0),
                texture_entry(1, wgpu::TextureViewDimension::Cube),
                sampler_entry(2),
            ],
        });

        let skybox_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox_bind_group"),
            layout: &skybox_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: skybox_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&environment.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&environment.sampler),
                },
            ],
        });

        let skybox_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox_pipeline_layout"),
            bind_group_layouts: &[&skybox_layout],
            push_constant_ranges: &[],
        });

        let skybox = ShaderProgram::build(device, &assets.skybox_shader, |module| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("skybox_pipeline"),
                layout: Some(&skybox_pipeline_layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                // The sky sits exactly on the far plane, so it must pass at
                // equal depth and never occlude anything.
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        });

        let sky_verts = skybox_cube();
        let skybox_vertex_count = sky_verts.len() as u32;
        let skybox_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox_vertex_buffer"),
            contents: bytemuck::cast_slice(&sky_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Water
        let water_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("water_uniform_buffer"),
            size: std::mem::size_of::<WaterUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let water_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("water_bind_group_layout"),
            entries: &[
                uniform_entry(0),
                texture_entry(1, wgpu::TextureViewDimension::Cube),
                sampler_entry(2),
                texture_entry(3, wgpu::TextureViewDimension::D2),
                texture_entry(4, wgpu::TextureViewDimension::D2),
                sampler_entry(5),
            ],
        });

        let water_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("water_bind_group"),
            layout: &water_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: water_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&environment.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&environment.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&normal_maps[0].view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&normal_maps[1].view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&normal_maps[0].sampler),
                },
            ],
        });

        let water_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("water_pipeline_layout"),
            bind_group_layouts: &[&water_layout],
            push_constant_ranges: &[],
        });

        let water = ShaderProgram::build(device, &assets.water_shader, |module| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("water_pipeline"),
                layout: Some(&water_pipeline_layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<WaterVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                            2 => Float32x2,
                        ],
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        });

        let water_verts = water_quad();
        let water_vertex_count = water_verts.len() as u32;
        let water_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("water_vertex_buffer"),
            contents: bytemuck::cast_slice(&water_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        for program in [&skybox, &water] {
            if program.is_valid() {
                tracing::info!("program {} ready", program.name());
            } else {
                tracing::error!(
                    "program {} unavailable, its pass will draw nothing ({} diagnostics)",
                    program.name(),
                    program.diagnostics().len()
                );
            }
        }

        let [r, g, b] = clear_color;
        Self {
            skybox,
            water,
            skybox_uniform_buffer,
            skybox_bind_group,
            skybox_vertex_buffer,
            skybox_vertex_count,
            water_uniform_buffer,
            water_bind_group,
            water_vertex_buffer,
            water_vertex_count,
            _environment: environment,
            _normal_maps: normal_maps,
            depth_texture,
            params,
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame: skybox first, then the water plane.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        frame: &FrameView,
    ) {
        queue.write_buffer(
            &self.skybox_uniform_buffer,
            0,
            bytemuck::bytes_of(&SkyboxUniforms::new(frame)),
        );
        queue.write_buffer(
            &self.water_uniform_buffer,
            0,
            bytemuck::bytes_of(&WaterUniforms::new(frame, &self.params)),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if let Some(pipeline) = self.skybox.pipeline() {
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.skybox_bind_group, &[]);
                pass.set_vertex_buffer(0, self.skybox_vertex_buffer.slice(..));
                pass.draw(0..self.skybox_vertex_count, 0..1);
            }

            if let Some(pipeline) = self.water.pipeline() {
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.water_bind_group, &[]);
                pass.set_vertex_buffer(0, self.water_vertex_buffer.slice(..));
                pass.draw(0..self.water_vertex_count, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

impl Drop for WaterRenderer {
    fn drop(&mut self) {
        tracing::debug!("releasing renderer GPU resources");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};
    use waterscape_render::Camera;

    #[test]
    fn water_uniforms_fill_wgsl_layout() {
        assert_eq!(std::mem::size_of::<WaterUniforms>(), 256);
        assert_eq!(std::mem::size_of::<WaterUniforms>() % 16, 0);

        let frame = FrameView::new(&Camera::default(), 2.0, 7.5);
        let params = WaterParams::default();
        let u = WaterUniforms::new(&frame, &params);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&u));

        // eye_pos then time follow the three matrices.
        assert_eq!(&floats[48..51], &[0.0, 0.0, 10.0]);
        assert_eq!(floats[51], 7.5);
        assert_eq!(&floats[52..56], &[0.05, 0.1, 0.05, 0.1]);
        assert_eq!(&floats[56..59], &[0.8, 0.8, 0.85]);
        assert_eq!(floats[59], 0.7);
        assert_eq!(&floats[60..62], &[0.1, 0.5]);
    }

    #[test]
    fn water_model_is_flat_and_scaled() {
        let frame = FrameView::new(&Camera::default(), 1.0, 0.0);
        let u = WaterUniforms::new(&frame, &WaterParams::default());
        let model = Mat4::from_cols_array_2d(&u.model);
        let corner = model.transform_point3(Vec3::new(-0.5, -0.5, 0.0));
        assert!(corner.abs_diff_eq(Vec3::new(-50.0, 0.0, 50.0), 1e-3));
    }

    #[test]
    fn skybox_uniforms_have_no_translation() {
        let frame = FrameView::new(&Camera::default(), 1.0, 0.0);
        let u = SkyboxUniforms::new(&frame);
        assert_eq!(u.view[3], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(u.projection, frame.projection.to_cols_array_2d());
    }

    #[test]
    fn water_quad_covers_unit_square() {
        let quad = water_quad();
        assert_eq!(quad.len(), 6);
        assert_eq!(std::mem::size_of::<WaterVertex>(), 32);
        for v in &quad {
            assert_eq!(v.position[0].abs(), 0.5);
            assert_eq!(v.position[1].abs(), 0.5);
            assert_eq!(v.uv[0], v.position[0] + 0.5);
            assert_eq!(v.uv[1], v.position[1] + 0.5);
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn skybox_has_one_face_per_six_vertices() {
        let cube = skybox_cube();
        assert_eq!(cube.len(), 36);
        let mut faces = Vec::new();
        for face in cube.chunks(6) {
            // Every vertex of a face shares one coordinate at +-1.
            let axis = (0..3)
                .find(|&a| face.iter().all(|v| v[a] == face[0][a]))
                .unwrap();
            faces.push((axis, face[0][axis]));
        }
        faces.sort_by(|a, b| a.partial_cmp(b).unwrap());
        faces.dedup();
        assert_eq!(faces.len(), 6);
    }
}
