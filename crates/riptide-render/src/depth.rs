//! On-demand water depth capture
//!
//! An auxiliary orthographic camera renders the scene under the water into
//! a 1024x1024 depth-only target. Camera and target are created on the
//! first capture, reused afterwards, and destroyed on component teardown.

use crate::camera::CameraUniform;
use crate::mesh::{GpuMesh, WaterVertex};
use crate::shaders::{ShaderLibrary, DEPTH_ONLY_SHADER};
use crate::slots::WaterLayouts;
use crate::{Error, Result};
use glam::Vec3;

/// Resolution of the depth map.
pub const DEPTH_MAP_SIZE: u32 = 1024;
/// Orthographic half-extent of the capture volume in world units.
pub const CAPTURE_HALF_EXTENT: f32 = 250.0;
/// Near plane of the capture camera.
pub const CAPTURE_NEAR: f32 = 0.1;

/// Geometry the host hands to a capture, already in world space.
#[derive(Clone)]
pub struct DepthDraw {
    pub mesh: GpuMesh,
}

/// Lazily-created depth camera and target.
pub struct DepthCapture {
    target: Option<(wgpu::Texture, wgpu::TextureView)>,
    camera_buffer: Option<wgpu::Buffer>,
    camera_bind_group: Option<wgpu::BindGroup>,
    pipeline: Option<wgpu::RenderPipeline>,
    captures: u64,
}

impl DepthCapture {
    pub fn new() -> Self {
        Self {
            target: None,
            camera_buffer: None,
            camera_bind_group: None,
            pipeline: None,
            captures: 0,
        }
    }

    /// Whether the camera/target pair currently exists.
    pub fn is_allocated(&self) -> bool {
        self.target.is_some()
    }

    pub fn captures(&self) -> u64 {
        self.captures
    }

    /// The published depth map, if a capture has run.
    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.target.as_ref().map(|(_, view)| view)
    }

    /// Render the given world-space geometry into the depth map. Repeated
    /// calls reuse the camera and target and only re-render.
    pub fn capture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &WaterLayouts,
        shaders: &ShaderLibrary,
        center: Vec3,
        max_visibility: f32,
        draws: &[DepthDraw],
    ) -> Result<()> {
        if self.target.is_none() {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Water Depth Map"),
                size: wgpu::Extent3d {
                    width: DEPTH_MAP_SIZE,
                    height: DEPTH_MAP_SIZE,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Depth32Float,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            self.target = Some((texture, view));
            log::debug!(
                "Created water depth target ({0}x{0})",
                DEPTH_MAP_SIZE
            );
        }

        let camera_buffer = self.camera_buffer.get_or_insert_with(|| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Water Depth Camera"),
                size: std::mem::size_of::<CameraUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        // Top-down orthographic view over the surface; far plane tracks the
        // configured visibility depth.
        let camera = CameraUniform::orthographic(
            center,
            center - Vec3::Y,
            Vec3::Z,
            -CAPTURE_HALF_EXTENT,
            CAPTURE_HALF_EXTENT,
            -CAPTURE_HALF_EXTENT,
            CAPTURE_HALF_EXTENT,
            CAPTURE_NEAR,
            max_visibility,
            0.0,
        );
        queue.write_buffer(camera_buffer, 0, bytemuck::bytes_of(&camera));

        if self.camera_bind_group.is_none() {
            self.camera_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Water Depth Camera Bind Group"),
                layout: &layouts.camera,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                }],
            }));
        }

        if self.pipeline.is_none() {
            let source = shaders
                .resolve(DEPTH_ONLY_SHADER)
                .ok_or_else(|| Error::Shader("depth-only shader not registered".into()))?;
            self.pipeline = Some(Self::build_pipeline(device, layouts, source));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Water Depth Capture"),
        });
        {
            let (_, view) = self.target.as_ref().ok_or_else(|| {
                Error::Resource("depth target missing after creation".into())
            })?;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Water Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let (Some(pipeline), Some(bind_group)) =
                (self.pipeline.as_ref(), self.camera_bind_group.as_ref())
            {
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                for draw in draws {
                    pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
                    pass.set_index_buffer(
                        draw.mesh.index_buffer.slice(..),
                        wgpu::IndexFormat::Uint32,
                    );
                    pass.draw_indexed(0..draw.mesh.index_count, 0, 0..1);
                }
            }
        }
        queue.submit(Some(encoder.finish()));

        self.captures += 1;
        log::debug!("Captured water depth map ({} draws)", draws.len());
        Ok(())
    }

    fn build_pipeline(
        device: &wgpu::Device,
        layouts: &WaterLayouts,
        source: &str,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Depth Only Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Depth Only Pipeline Layout"),
            bind_group_layouts: &[&layouts.camera],
            push_constant_ranges: &[],
        });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Depth Only Pipeline"),
            layout: Some(&layout),
            cache: None,
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[WaterVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    /// Destroy the depth camera state and target. No-op when nothing was
    /// created; safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some((texture, _)) = self.target.take() {
            texture.destroy();
            log::debug!("Released water depth target");
        }
        if let Some(buffer) = self.camera_buffer.take() {
            buffer.destroy();
        }
        self.camera_bind_group = None;
        self.pipeline = None;
    }
}

impl Default for DepthCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_before_any_capture_is_a_noop() {
        let mut capture = DepthCapture::new();
        assert!(!capture.is_allocated());
        capture.release();
        capture.release();
        assert!(!capture.is_allocated());
        assert_eq!(capture.captures(), 0);
        assert!(capture.depth_view().is_none());
    }
}
