//! Caustics pass - sun-lit pattern projected onto the ground
//!
//! Draws a large shared quad translated to the camera's XZ position with Y
//! clamped to the water plane, using the caustics material. Skipped
//! entirely for preview cameras and when no material is bound.

use crate::camera::{CameraInfo, CameraKind, TargetDescriptor};
use crate::graph::{PassContext, PassEvent, RenderPass};
use crate::mesh::{GpuMesh, WaterVertex};
use crate::shaders::{apply_defines, ShaderDefine};
use crate::slots::WaterLayouts;
use crate::texture::GpuTexture;
use crate::Result;
use glam::{EulerRot, Mat4};
use riptide_core::{DebugMode, WaterSystemSettings};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

/// Edge length of the shared caustics quad in world units.
pub const CAUSTICS_QUAD_SIZE: f32 = 1000.0;

/// Shader define enabling the caustics debug path.
pub const DEBUG_CAUSTICS: &str = "DEBUG_CAUSTICS";

/// Orientation used when the scene has no directional light.
pub fn default_sun_matrix() -> Mat4 {
    Mat4::from_euler(
        EulerRot::YXZ,
        45.0f32.to_radians(),
        (-45.0f32).to_radians(),
        0.0,
    )
}

/// CPU-side quad geometry, built once for the process lifetime and never
/// mutated.
pub fn caustics_quad() -> &'static ([[f32; 3]; 4], [u32; 6]) {
    static QUAD: OnceLock<([[f32; 3]; 4], [u32; 6])> = OnceLock::new();
    QUAD.get_or_init(|| {
        let half = CAUSTICS_QUAD_SIZE * 0.5;
        (
            [
                [-half, 0.0, -half],
                [half, 0.0, -half],
                [-half, 0.0, half],
                [half, 0.0, half],
            ],
            [0, 2, 1, 2, 3, 1],
        )
    })
}

/// Everything needed to issue the caustics draw for one camera.
#[derive(Clone, Debug, PartialEq)]
pub struct CausticsDraw {
    pub light_matrix: Mat4,
    pub model: Mat4,
}

/// Decide whether (and how) caustics draw for this camera. Preview cameras
/// and missing materials yield `None` - zero draw calls that frame.
pub fn plan_caustics(
    camera: &CameraInfo,
    sun: Option<Mat4>,
    has_material: bool,
) -> Option<CausticsDraw> {
    if camera.kind == CameraKind::Preview || !has_material {
        return None;
    }

    let light_matrix = sun.unwrap_or_else(default_sun_matrix);

    let mut position = camera.position;
    position.y = 0.0;

    Some(CausticsDraw {
        light_matrix,
        model: Mat4::from_translation(position),
    })
}

/// Uniform block of the caustics material. Matches `CausticsParams` in
/// caustics.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct CausticsUniform {
    light_matrix: Mat4,
    model: Mat4,
    blend_distance: f32,
    scale: f32,
    _pad: [f32; 2],
}

/// GPU material for the caustics pass. Recreated on every pipeline
/// (re)configuration; the debug mode bakes its blend factors into the
/// pipeline variant.
pub struct CausticsMaterial {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    blend_distance: f32,
    scale: f32,
}

/// Material slot shared between the owning feature and the pass.
pub type SharedCausticsMaterial = Arc<Mutex<Option<CausticsMaterial>>>;

impl CausticsMaterial {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &WaterLayouts,
        surface_format: wgpu::TextureFormat,
        source: &str,
        settings: &WaterSystemSettings,
        caustic_map: Option<&wgpu::TextureView>,
    ) -> Self {
        let debug = settings.debug == DebugMode::Caustics;

        let mut defines = HashMap::new();
        defines.insert(DEBUG_CAUSTICS.to_string(), ShaderDefine::Bool(debug));
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Caustics Shader"),
            source: wgpu::ShaderSource::Wgsl(apply_defines(source, &defines).into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Caustics Params"),
            size: std::mem::size_of::<CausticsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Caustics Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Unassigned pattern falls back to white; the bind group keeps the
        // fallback texture alive.
        let fallback;
        let map_view = match caustic_map {
            Some(view) => view,
            None => {
                fallback = GpuTexture::white(device, queue);
                &fallback.view
            }
        };

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Caustics Material Bind Group"),
            layout: &layouts.caustics_material,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(map_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Caustics Pipeline Layout"),
            bind_group_layouts: &[&layouts.camera, &layouts.caustics_material],
            push_constant_ranges: &[],
        });

        // Debug mode draws fully opaque; normal mode standard alpha blend.
        let blend = if debug {
            wgpu::BlendState::REPLACE
        } else {
            wgpu::BlendState::ALPHA_BLENDING
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Caustics Pipeline"),
            layout: Some(&layout),
            cache: None,
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[WaterVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            uniform_buffer,
            bind_group,
            pipeline,
            blend_distance: settings.caustic_blend_distance,
            scale: settings.caustic_scale(),
        }
    }
}

/// The caustics render pass.
pub struct CausticsPass {
    event: PassEvent,
    material: SharedCausticsMaterial,
    mesh: Option<GpuMesh>,
    draws_issued: u64,
}

impl CausticsPass {
    pub fn new(event: PassEvent, material: SharedCausticsMaterial) -> Self {
        Self {
            event,
            material,
            mesh: None,
            draws_issued: 0,
        }
    }

    pub fn draws_issued(&self) -> u64 {
        self.draws_issued
    }

    fn shared_mesh(&mut self, device: &wgpu::Device) -> &GpuMesh {
        self.mesh.get_or_insert_with(|| {
            let (positions, indices) = caustics_quad();
            let uvs = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
            let vertices: Vec<WaterVertex> = positions
                .iter()
                .zip(uvs.iter())
                .map(|(&p, &uv)| WaterVertex::new(p, uv))
                .collect();
            log::debug!("Built shared caustics quad ({} units)", CAUSTICS_QUAD_SIZE);
            GpuMesh::new(device, &vertices, &indices[..])
        })
    }
}

impl RenderPass for CausticsPass {
    fn name(&self) -> &str {
        "caustics"
    }

    fn event(&self) -> PassEvent {
        self.event
    }

    fn configure(&mut self, _device: &wgpu::Device, _target: &TargetDescriptor) -> Result<()> {
        Ok(())
    }

    fn execute(&mut self, ctx: &mut PassContext) -> Result<()> {
        let material = self.material.clone();
        let guard = material.lock().unwrap();
        let Some(material) = guard.as_ref() else {
            log::trace!("caustics: no material bound, skipping");
            return Ok(());
        };

        let Some(draw) = plan_caustics(ctx.camera, ctx.sun, true) else {
            log::trace!("caustics: camera filtered out, skipping");
            return Ok(());
        };

        let uniform = CausticsUniform {
            light_matrix: draw.light_matrix,
            model: draw.model,
            blend_distance: material.blend_distance,
            scale: material.scale,
            _pad: [0.0; 2],
        };
        ctx.queue
            .write_buffer(&material.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        let mesh = self.shared_mesh(ctx.device).clone();

        let mut pass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Caustics Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: ctx.target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&material.pipeline);
        pass.set_bind_group(0, ctx.camera_bind_group, &[]);
        pass.set_bind_group(1, &material.bind_group, &[]);
        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        drop(pass);

        self.draws_issued += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn camera(kind: CameraKind) -> CameraInfo {
        CameraInfo {
            kind,
            position: Vec3::new(12.0, 30.0, -7.0),
            target: TargetDescriptor::new(1280, 720, wgpu::TextureFormat::Bgra8UnormSrgb),
            has_pipeline_data: true,
        }
    }

    #[test]
    fn preview_cameras_issue_no_draw() {
        assert_eq!(plan_caustics(&camera(CameraKind::Preview), None, true), None);
    }

    #[test]
    fn missing_material_issues_no_draw() {
        assert_eq!(plan_caustics(&camera(CameraKind::Game), None, false), None);
    }

    #[test]
    fn quad_follows_the_camera_with_y_clamped() {
        let draw = plan_caustics(&camera(CameraKind::Game), None, true)
            .expect("game camera with material draws");
        let translation = draw.model.w_axis;
        assert_eq!(translation.x, 12.0);
        assert_eq!(translation.y, 0.0);
        assert_eq!(translation.z, -7.0);
    }

    #[test]
    fn missing_sun_falls_back_to_the_default_orientation() {
        let draw = plan_caustics(&camera(CameraKind::Game), None, true).unwrap();
        assert_eq!(draw.light_matrix, default_sun_matrix());

        let sun = Mat4::from_rotation_x(0.3);
        let lit = plan_caustics(&camera(CameraKind::Game), Some(sun), true).unwrap();
        assert_eq!(lit.light_matrix, sun);
    }

    #[test]
    fn shared_quad_is_two_triangles_at_ground_level() {
        let (positions, indices) = caustics_quad();
        assert_eq!(positions.len(), 4);
        assert_eq!(indices.len(), 6);
        let half = CAUSTICS_QUAD_SIZE * 0.5;
        for p in positions {
            assert_eq!(p[1], 0.0);
            assert_eq!(p[0].abs(), half);
            assert_eq!(p[2].abs(), half);
        }
        // Built once, shared for the process lifetime.
        assert!(std::ptr::eq(caustics_quad(), caustics_quad()));
    }
}
