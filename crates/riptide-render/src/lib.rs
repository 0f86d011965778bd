//! Riptide render - water rendering passes for a wgpu pipeline
//!
//! The subsystem plugs into a host render pipeline through three seams:
//!
//! - a per-camera pass list ([`graph::PassQueue`]) into which the water FX
//!   and caustics passes are registered,
//! - a begin-camera-rendering event ([`events::CameraEvents`]) the water
//!   driver subscribes to for submitting the surface meshes,
//! - a reflection provider ([`reflection::ReflectionProvider`]) toggled by
//!   the configured reflection mode.
//!
//! Everything the subsystem allocates on the GPU (wave transport buffer,
//! FX mask target, depth camera target, ramp texture) has exactly one
//! owning type responsible for releasing it.

pub mod camera;
pub mod depth;
pub mod events;
pub mod features;
pub mod graph;
pub mod mesh;
pub mod passes;
pub mod reflection;
pub mod shaders;
pub mod slots;
pub mod texture;
pub mod transport;

mod water;

pub use camera::{CameraInfo, CameraKind, CameraUniform, TargetDescriptor};
pub use mesh::{GpuMesh, WaterVertex};
pub use shaders::{ShaderDefine, ShaderLibrary};
pub use water::{should_submit, Water, WaterSettings};

/// Result type for render operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur inside the water subsystem
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Feature error: {0}")]
    Feature(String),

    #[error("Pass error: {0}")]
    Pass(String),

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("Shader error: {0}")]
    Shader(String),

    #[error("WGPU error: {0}")]
    Wgpu(String),
}

impl From<wgpu::Error> for Error {
    fn from(err: wgpu::Error) -> Self {
        Error::Wgpu(err.to_string())
    }
}
