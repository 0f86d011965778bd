//! Water driver component
//!
//! Owns the wave table, its GPU uploader, the ramp and depth textures, and
//! the subscription to the host's begin-camera event. Every resource it
//! creates is released on `disable()`, and every release is idempotent.

use crate::camera::{CameraInfo, CameraKind};
use crate::depth::{DepthCapture, DepthDraw};
use crate::events::{CameraEvents, Subscription, WaterDraw};
use crate::mesh::GpuMesh;
use crate::reflection::{configure_reflections, ReflectionProvider};
use crate::shaders::{ShaderDefine, ShaderLibrary};
use crate::slots::{WaterLayouts, WaterTexture};
use crate::texture::{GpuTexture, RampTexture};
use crate::transport::{
    select_transport, storage_supported, WaterGlobals, WaveUploader,
};
use crate::Result;
use glam::Mat4;
use riptide_core::{build_wave_table, ReflectionMode, WaterSurfaceData, Wave};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Component-level settings of the water driver.
#[derive(Clone, Debug, Default)]
pub struct WaterSettings {
    /// Force the uniform-array transport regardless of platform support.
    pub compute_override: bool,
    pub reflection: ReflectionMode,
}

/// Whether the default water meshes are submitted for this camera.
/// Preview cameras and cameras without the host's per-camera data are
/// skipped.
pub fn should_submit(camera: &CameraInfo) -> bool {
    camera.kind != CameraKind::Preview && camera.has_pipeline_data
}

struct SharedDrawState {
    meshes: Vec<GpuMesh>,
    transform: Mat4,
}

/// The water surface driver.
pub struct Water {
    surface: WaterSurfaceData,
    settings: WaterSettings,
    waves: Vec<Wave>,
    uploader: Option<WaveUploader>,
    ramp: Option<RampTexture>,
    depth: DepthCapture,
    /// Pre-baked depth map published instead of live captures when set.
    baked_depth: Option<GpuTexture>,
    shared: Arc<Mutex<SharedDrawState>>,
    subscription: Option<Subscription>,
}

impl Water {
    pub fn new(surface: WaterSurfaceData, settings: WaterSettings) -> Self {
        Self {
            surface,
            settings,
            waves: Vec::new(),
            uploader: None,
            ramp: None,
            depth: DepthCapture::new(),
            baked_depth: None,
            shared: Arc::new(Mutex::new(SharedDrawState {
                meshes: Vec::new(),
                transform: Mat4::IDENTITY,
            })),
            subscription: None,
        }
    }

    pub fn with_baked_depth(mut self, texture: GpuTexture) -> Self {
        self.baked_depth = Some(texture);
        self
    }

    pub fn surface(&self) -> &WaterSurfaceData {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut WaterSurfaceData {
        &mut self.surface
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn is_enabled(&self) -> bool {
        self.subscription.is_some()
    }

    /// World transform of the surface; its Y translation feeds the
    /// `wave_height` uniform.
    pub fn set_transform(&mut self, transform: Mat4) {
        self.shared.lock().unwrap().transform = transform;
    }

    /// Meshes submitted for every eligible camera.
    pub fn set_default_meshes(&mut self, meshes: Vec<GpuMesh>) {
        self.shared.lock().unwrap().meshes = meshes;
    }

    /// Rebuild the wave table from the surface settings. The whole table
    /// is replaced, never mutated in place.
    pub fn rebuild_waves(&mut self) {
        self.waves = build_wave_table(&self.surface);
        log::debug!("Wave table rebuilt ({} waves)", self.waves.len());
    }

    fn globals(&self) -> WaterGlobals {
        let wave_height = self.shared.lock().unwrap().transform.w_axis.y;
        WaterGlobals::from_waves(&self.waves, wave_height, self.surface.max_visibility)
    }

    /// Bring the component up: probe the transport, publish waves, ramp
    /// and baked depth, configure reflections, and subscribe to the
    /// begin-camera event. Calling `enable` while enabled is a no-op.
    pub fn enable(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &WaterLayouts,
        events: &CameraEvents,
        reflections: Option<&mut dyn ReflectionProvider>,
    ) -> Result<()> {
        if self.subscription.is_some() {
            return Ok(());
        }

        let kind = select_transport(
            self.settings.compute_override,
            storage_supported(device),
            cfg!(target_arch = "wasm32"),
        );
        let transport_changed = self.uploader.as_ref().map(|u| u.kind()) != Some(kind);
        if transport_changed {
            if let Some(mut old) = self.uploader.take() {
                old.release();
            }
            self.uploader = Some(WaveUploader::new(kind));
        }

        self.rebuild_waves();
        let globals = self.globals();
        if let Some(uploader) = self.uploader.as_mut() {
            uploader.upload(device, queue, layouts, &self.waves, globals);
        }

        match self.ramp.as_mut() {
            Some(ramp) => ramp.regenerate(queue, &self.surface.absorption_ramp),
            None => {
                self.ramp = Some(RampTexture::new(device, queue, &self.surface.absorption_ramp));
            }
        }

        if self.baked_depth.is_some() {
            log::debug!("Publishing baked water depth map");
        }

        if let Some(provider) = reflections {
            configure_reflections(provider, self.settings.reflection);
        }

        let shared = self.shared.clone();
        self.subscription = Some(events.subscribe(move |camera, submission| {
            if !should_submit(camera) {
                return;
            }
            let state = shared.lock().unwrap();
            for mesh in &state.meshes {
                submission.meshes.push(WaterDraw {
                    mesh: mesh.clone(),
                    transform: state.transform,
                    cast_shadows: false,
                    use_light_probes: false,
                });
            }
        }));

        log::info!(
            "Water enabled ({} waves, {:?} transport)",
            self.waves.len(),
            kind
        );
        Ok(())
    }

    /// Tear the component down: unsubscribe and release the wave buffer,
    /// depth camera and depth target. Safe to call repeatedly and before
    /// `enable`.
    pub fn disable(&mut self) {
        if self.subscription.take().is_some() {
            log::info!("Water disabled");
        }
        if let Some(uploader) = self.uploader.as_mut() {
            uploader.release();
        }
        self.depth.release();
    }

    /// Re-publish waves and ramp after surface changes while enabled.
    pub fn refresh(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &WaterLayouts,
    ) {
        self.rebuild_waves();
        let globals = self.globals();
        if let Some(uploader) = self.uploader.as_mut() {
            uploader.upload(device, queue, layouts, &self.waves, globals);
        }
        if let Some(ramp) = self.ramp.as_mut() {
            ramp.regenerate(queue, &self.surface.absorption_ramp);
        }
    }

    /// Capture the water depth map over the given world-space geometry.
    /// Repeated captures reuse the camera and target.
    pub fn capture_depth(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &WaterLayouts,
        shaders: &ShaderLibrary,
        draws: &[DepthDraw],
    ) -> Result<()> {
        let center = self.shared.lock().unwrap().transform.w_axis.truncate();
        self.depth.capture(
            device,
            queue,
            layouts,
            shaders,
            center,
            self.surface.max_visibility,
            draws,
        )
    }

    /// Water data bind group (globals + wave transport), once uploaded.
    pub fn water_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.uploader.as_ref().and_then(|u| u.bind_group())
    }

    /// The published depth map: the baked texture when assigned, else the
    /// live capture.
    pub fn depth_view(&self) -> Option<&wgpu::TextureView> {
        self.baked_depth
            .as_ref()
            .map(|t| &t.view)
            .or_else(|| self.depth.depth_view())
    }

    pub fn ramp(&self) -> Option<&RampTexture> {
        self.ramp.as_ref()
    }

    /// Water texture bind group (depth map + absorption ramp) for the
    /// surface pipelines. `None` until the ramp exists and a depth source
    /// (baked or captured) is available.
    pub fn textures_bind_group(
        &self,
        device: &wgpu::Device,
        layouts: &WaterLayouts,
    ) -> Option<wgpu::BindGroup> {
        let ramp = self.ramp.as_ref()?;
        let depth_view = self.depth_view()?;

        let depth_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Water Depth Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Water Textures Bind Group"),
            layout: &layouts.water_textures,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: WaterTexture::DepthMap.binding(),
                    resource: wgpu::BindingResource::TextureView(depth_view),
                },
                wgpu::BindGroupEntry {
                    binding: WaterTexture::AbsorptionRamp.binding(),
                    resource: wgpu::BindingResource::TextureView(ramp.view()),
                },
                wgpu::BindGroupEntry {
                    binding: WaterTexture::RampSampler.binding(),
                    resource: wgpu::BindingResource::Sampler(&ramp.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: WaterTexture::DepthSampler.binding(),
                    resource: wgpu::BindingResource::Sampler(&depth_sampler),
                },
            ],
        }))
    }

    /// Transport-dependent shader defines for the surface pipelines.
    pub fn shader_defines(&self) -> HashMap<String, ShaderDefine> {
        self.uploader
            .as_ref()
            .map(|u| u.shader_defines())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::TargetDescriptor;
    use glam::Vec3;
    use riptide_core::BasicWaveSettings;

    fn camera(kind: CameraKind, has_pipeline_data: bool) -> CameraInfo {
        CameraInfo {
            kind,
            position: Vec3::ZERO,
            target: TargetDescriptor::new(800, 600, wgpu::TextureFormat::Bgra8UnormSrgb),
            has_pipeline_data,
        }
    }

    #[test]
    fn submission_guards_follow_the_camera() {
        assert!(should_submit(&camera(CameraKind::Game, true)));
        assert!(should_submit(&camera(CameraKind::SceneView, true)));
        assert!(!should_submit(&camera(CameraKind::Preview, true)));
        assert!(!should_submit(&camera(CameraKind::Game, false)));
    }

    #[test]
    fn disable_before_enable_is_a_noop() {
        let mut water = Water::new(WaterSurfaceData::default(), WaterSettings::default());
        assert!(!water.is_enabled());
        water.disable();
        water.disable();
        assert!(!water.is_enabled());
    }

    #[test]
    fn wave_rebuild_is_deterministic() {
        let surface = WaterSurfaceData {
            basic_waves: BasicWaveSettings {
                num_waves: 4,
                amplitude: 1.0,
                ..BasicWaveSettings::default()
            },
            random_seed: 42,
            ..WaterSurfaceData::default()
        };
        let mut a = Water::new(surface.clone(), WaterSettings::default());
        let mut b = Water::new(surface, WaterSettings::default());
        a.rebuild_waves();
        b.rebuild_waves();
        assert_eq!(a.waves(), b.waves());
        assert_eq!(a.waves().len(), 4);
    }

    #[test]
    fn surface_height_feeds_the_globals() {
        let mut water = Water::new(WaterSurfaceData::default(), WaterSettings::default());
        water.set_transform(Mat4::from_translation(Vec3::new(0.0, 2.5, 0.0)));
        water.rebuild_waves();
        assert_eq!(water.globals().wave_height, 2.5);
    }
}
