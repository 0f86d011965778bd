//! Water FX pass - off-screen mask for refraction/foam effects
//!
//! Renders transparent geometry tagged for the water FX shader pass into a
//! half-resolution color target, cleared to a neutral translucent teal.
//! The target is reallocated only when the camera's descriptor changes and
//! released on camera cleanup.

use crate::camera::TargetDescriptor;
use crate::graph::{PassContext, PassEvent, RenderPass};
use crate::mesh::WaterVertex;
use crate::slots::WaterLayouts;
use crate::Result;
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex};

/// Neutral clear: zero displacement, zero foam, half coverage.
pub const WATER_FX_CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.5,
    b: 0.5,
    a: 0.5,
};

/// Color format of the FX mask target.
pub const FX_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Render queue range for transparent geometry.
pub const TRANSPARENT_QUEUE: RangeInclusive<u32> = 2451..=5000;

/// A renderer whose material declares the water FX shader pass.
#[derive(Clone)]
pub struct FxDrawCall {
    pub mesh: crate::mesh::GpuMesh,
    /// Group 1: per-object model uniform.
    pub object_bind_group: Arc<wgpu::BindGroup>,
    /// Material render queue; only the transparent range is drawn.
    pub queue: u32,
    /// View distance used for common-transparent ordering.
    pub distance: f32,
}

/// Derive the FX target descriptor from the camera's: depth disabled,
/// dimensions halved, default color format.
pub fn fx_target_desc(camera: &TargetDescriptor) -> TargetDescriptor {
    TargetDescriptor {
        width: (camera.width / 2).max(1),
        height: (camera.height / 2).max(1),
        format: FX_FORMAT,
        depth: false,
    }
}

/// Common-transparent ordering over (queue, distance) pairs: filtered to
/// the transparent queue range, sorted back-to-front.
pub fn draw_order(items: &[(u32, f32)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len())
        .filter(|&i| TRANSPARENT_QUEUE.contains(&items[i].0))
        .collect();
    order.sort_by(|&a, &b| items[b].1.total_cmp(&items[a].1));
    order
}

/// Indices of the draws to issue this frame.
pub fn transparent_draw_order(calls: &[FxDrawCall]) -> Vec<usize> {
    let items: Vec<(u32, f32)> = calls.iter().map(|c| (c.queue, c.distance)).collect();
    draw_order(&items)
}

/// Off-screen water FX mask pass.
pub struct WaterFxPass {
    draws: Arc<Mutex<Vec<FxDrawCall>>>,
    target_desc: Option<TargetDescriptor>,
    target: Option<(wgpu::Texture, wgpu::TextureView)>,
    pipeline: Option<wgpu::RenderPipeline>,
    draws_issued: u64,
}

impl WaterFxPass {
    pub fn new(draws: Arc<Mutex<Vec<FxDrawCall>>>) -> Self {
        Self {
            draws,
            target_desc: None,
            target: None,
            pipeline: None,
            draws_issued: 0,
        }
    }

    /// The FX mask for sampling by later passes, once configured.
    pub fn fx_view(&self) -> Option<&wgpu::TextureView> {
        self.target.as_ref().map(|(_, view)| view)
    }

    pub fn draws_issued(&self) -> u64 {
        self.draws_issued
    }

    fn build_pipeline(device: &wgpu::Device, layouts: &WaterLayouts) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Water FX Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../shaders/wgsl/water_fx.wgsl").into(),
            ),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Water FX Pipeline Layout"),
            bind_group_layouts: &[&layouts.camera, &layouts.object],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Water FX Pipeline"),
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
                    format: FX_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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
            // The FX mask renders without a depth buffer
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }
}

impl RenderPass for WaterFxPass {
    fn name(&self) -> &str {
        "water_fx"
    }

    fn event(&self) -> PassEvent {
        PassEvent::BeforeOpaques
    }

    fn configure(&mut self, device: &wgpu::Device, target: &TargetDescriptor) -> Result<()> {
        let desc = fx_target_desc(target);
        if self.target_desc == Some(desc) {
            return Ok(());
        }

        if let Some((texture, _)) = self.target.take() {
            texture.destroy();
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Water FX Map"),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("Water FX target reallocated at {}x{}", desc.width, desc.height);

        self.target = Some((texture, view));
        self.target_desc = Some(desc);
        Ok(())
    }

    fn execute(&mut self, ctx: &mut PassContext) -> Result<()> {
        let Some((_, fx_view)) = self.target.as_ref() else {
            log::trace!("water_fx: no target configured, skipping");
            return Ok(());
        };

        // Snapshot the draw list (cheap Arc clones, cheap lock)
        let calls: Vec<FxDrawCall> = self.draws.lock().unwrap().clone();
        let order = transparent_draw_order(&calls);

        if self.pipeline.is_none() {
            self.pipeline = Some(Self::build_pipeline(ctx.device, ctx.layouts));
        }

        log::trace!("water_fx: {} of {} draws in queue range", order.len(), calls.len());

        let mut pass = ctx.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Water FX Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: fx_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(WATER_FX_CLEAR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Some(pipeline) = self.pipeline.as_ref() {
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, ctx.camera_bind_group, &[]);
            for &i in &order {
                let call = &calls[i];
                pass.set_bind_group(1, &call.object_bind_group, &[]);
                pass.set_vertex_buffer(0, call.mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(call.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..call.mesh.index_count, 0, 0..1);
            }
        }
        drop(pass);

        self.draws_issued += order.len() as u64;
        self.draws.lock().unwrap().clear();
        Ok(())
    }

    fn cleanup(&mut self) {
        if let Some((texture, _)) = self.target.take() {
            texture.destroy();
            log::debug!("Water FX target released");
        }
        self.target_desc = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fx_target_halves_and_drops_depth() {
        let camera = TargetDescriptor::new(1920, 1080, wgpu::TextureFormat::Bgra8UnormSrgb);
        let fx = fx_target_desc(&camera);
        assert_eq!(fx.width, 960);
        assert_eq!(fx.height, 540);
        assert_eq!(fx.format, FX_FORMAT);
        assert!(!fx.depth);
    }

    #[test]
    fn fx_target_never_collapses_to_zero() {
        let camera = TargetDescriptor::new(1, 1, wgpu::TextureFormat::Bgra8UnormSrgb);
        let fx = fx_target_desc(&camera);
        assert_eq!((fx.width, fx.height), (1, 1));
    }

    #[test]
    fn fx_target_is_stable_for_an_unchanged_camera() {
        let camera = TargetDescriptor::new(1280, 720, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(fx_target_desc(&camera), fx_target_desc(&camera));

        let resized = TargetDescriptor::new(1920, 1080, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_ne!(fx_target_desc(&camera), fx_target_desc(&resized));
    }

    #[test]
    fn only_the_transparent_queue_range_is_drawn() {
        let items = [
            (2000, 10.0), // opaque, skipped
            (3000, 5.0),
            (2451, 8.0),
            (5001, 1.0), // overlay, skipped
            (5000, 2.0),
        ];
        assert_eq!(draw_order(&items), vec![2, 1, 4]);
    }

    #[test]
    fn transparents_sort_back_to_front() {
        let items = [(3000, 1.0), (3000, 9.0), (3000, 4.0)];
        assert_eq!(draw_order(&items), vec![1, 2, 0]);
    }

    #[test]
    fn clear_color_is_the_neutral_teal() {
        assert_eq!(WATER_FX_CLEAR.r, 0.0);
        assert_eq!(WATER_FX_CLEAR.g, 0.5);
        assert_eq!(WATER_FX_CLEAR.b, 0.5);
        assert_eq!(WATER_FX_CLEAR.a, 0.5);
    }
}
