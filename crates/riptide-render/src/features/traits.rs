//! Feature trait definition

use crate::camera::CameraInfo;
use crate::graph::PassQueue;
use crate::shaders::{ShaderDefine, ShaderLibrary};
use crate::slots::WaterLayouts;
use crate::Result;
use std::collections::HashMap;

/// Context provided to features during registration
pub struct FeatureContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub passes: &'a mut PassQueue,
    pub shaders: &'a ShaderLibrary,
    pub layouts: &'a WaterLayouts,
    /// Surface / swapchain format (used for pipeline creation)
    pub surface_format: wgpu::TextureFormat,
}

impl<'a> FeatureContext<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        passes: &'a mut PassQueue,
        shaders: &'a ShaderLibrary,
        layouts: &'a WaterLayouts,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            device,
            queue,
            passes,
            shaders,
            layouts,
            surface_format,
        }
    }
}

/// Context provided to features during frame preparation
pub struct PrepareContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub frame: u64,
    pub delta_time: f32,
    pub camera: &'a CameraInfo,
}

/// Feature trait - a modular rendering component registered with the host
/// pipeline.
///
/// Lifecycle: `register()` once at pipeline (re)configuration,
/// `prepare()` every frame, `cleanup()` on teardown.
pub trait Feature: Send + Sync + AsAny {
    /// Unique name for this feature (lowercase snake_case)
    fn name(&self) -> &str;

    /// Register passes and create persistent GPU resources.
    fn register(&mut self, ctx: &mut FeatureContext) -> Result<()>;

    /// Update per-frame data.
    fn prepare(&mut self, ctx: &PrepareContext) -> Result<()>;

    /// Called when the feature is enabled or disabled at runtime.
    fn on_state_change(&mut self, enabled: bool, ctx: &mut FeatureContext) -> Result<()> {
        let _ = (enabled, ctx);
        Ok(())
    }

    /// Specialization constants this feature contributes to shader
    /// variants.
    fn shader_defines(&self) -> HashMap<String, ShaderDefine> {
        HashMap::new()
    }

    /// Release GPU resources.
    fn cleanup(&mut self, device: &wgpu::Device) {
        let _ = device;
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn set_enabled(&mut self, enabled: bool) {
        let _ = enabled;
    }
}

/// Helper trait for downcasting feature trait objects
pub trait AsAny {
    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

impl<T: Feature + 'static> AsAny for T {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
