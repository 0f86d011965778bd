//! Camera descriptions handed to the water passes by the host pipeline

use glam::{Mat4, Vec3};

/// What kind of camera a pass is running for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CameraKind {
    Game,
    SceneView,
    /// Thumbnail/inspector preview camera; the water passes skip these.
    Preview,
}

/// Shape of a camera's render target. Passes derive their own target
/// descriptors from this and reallocate only when it changes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    pub depth: bool,
}

impl TargetDescriptor {
    pub fn new(width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            depth: true,
        }
    }
}

/// Per-camera state the host pipeline supplies for each begin-camera event.
#[derive(Clone, Debug)]
pub struct CameraInfo {
    pub kind: CameraKind,
    pub position: Vec3,
    pub target: TargetDescriptor,
    /// Whether the host attached its per-camera pipeline data to this
    /// camera. Cameras without it do not receive the default water meshes.
    pub has_pipeline_data: bool,
}

/// Camera data uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix
    pub view_proj: Mat4,
    /// Camera position in world space
    pub position: Vec3,
    /// Elapsed time in seconds
    pub time: f32,
}

impl CameraUniform {
    pub fn new(view_proj: Mat4, position: Vec3, time: f32) -> Self {
        Self {
            view_proj,
            position,
            time,
        }
    }

    /// Create a perspective camera
    pub fn perspective(
        position: Vec3,
        target: Vec3,
        up: Vec3,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
        time: f32,
    ) -> Self {
        let view = Mat4::look_at_rh(position, target, up);
        let proj = Mat4::perspective_rh(fov_y, aspect, near, far);
        Self::new(proj * view, position, time)
    }

    /// Create an orthographic camera
    pub fn orthographic(
        position: Vec3,
        target: Vec3,
        up: Vec3,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
        time: f32,
    ) -> Self {
        let view = Mat4::look_at_rh(position, target, up);
        let proj = Mat4::orthographic_rh(left, right, bottom, top, near, far);
        Self::new(proj * view, position, time)
    }
}
