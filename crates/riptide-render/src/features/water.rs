//! Water system render feature
//!
//! Registers the water FX and caustics passes with the host pipeline and
//! owns the caustics material. An unresolved caustics shader leaves the
//! material slot empty: the caustics pass then skips every frame while the
//! rest of the pipeline renders normally.

use super::{Feature, FeatureContext, PrepareContext};
use crate::passes::caustics::DEBUG_CAUSTICS;
use crate::passes::{CausticsMaterial, CausticsPass, FxDrawCall, SharedCausticsMaterial, WaterFxPass};
use crate::graph::PassEvent;
use crate::shaders::{ShaderDefine, CAUSTICS_SHADER};
use crate::texture::GpuTexture;
use crate::Result;
use riptide_core::{DebugMode, WaterSystemSettings};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// The water system as a host-pipeline feature.
pub struct WaterSystemFeature {
    enabled: bool,
    settings: WaterSystemSettings,
    caustic_shader: String,
    caustic_texture: Option<GpuTexture>,
    material: SharedCausticsMaterial,
    fx_draws: Arc<Mutex<Vec<FxDrawCall>>>,
}

impl WaterSystemFeature {
    pub fn new() -> Self {
        Self {
            enabled: true,
            settings: WaterSystemSettings::default(),
            caustic_shader: CAUSTICS_SHADER.to_string(),
            caustic_texture: None,
            material: Arc::new(Mutex::new(None)),
            fx_draws: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_settings(mut self, settings: WaterSystemSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Override the shader resolved for the caustics material.
    pub fn with_caustic_shader(mut self, name: impl Into<String>) -> Self {
        self.caustic_shader = name.into();
        self
    }

    /// Assign the caustic pattern texture.
    pub fn with_caustic_texture(mut self, texture: GpuTexture) -> Self {
        self.caustic_texture = Some(texture);
        self
    }

    /// Draw list the host fills with water-FX-tagged renderers each frame.
    pub fn fx_draws(&self) -> Arc<Mutex<Vec<FxDrawCall>>> {
        self.fx_draws.clone()
    }

    /// Material slot shared with the caustics pass. Empty until setup
    /// resolves the shader.
    pub fn material(&self) -> SharedCausticsMaterial {
        self.material.clone()
    }

    /// Injection point for the caustics pass under the current settings.
    fn caustics_event(&self) -> PassEvent {
        match self.settings.debug {
            DebugMode::Caustics => PassEvent::AfterPostProcess,
            _ => PassEvent::AfterSkybox,
        }
    }

    /// (Re)create the caustics material. Silently leaves the slot empty
    /// when the shader does not resolve.
    fn setup_caustics_material(&mut self, ctx: &mut FeatureContext) {
        let Some(source) = ctx.shaders.resolve(&self.caustic_shader) else {
            log::debug!(
                "caustics shader '{}' not found; caustics stay disabled",
                self.caustic_shader
            );
            return;
        };

        let material = CausticsMaterial::new(
            ctx.device,
            ctx.queue,
            ctx.layouts,
            ctx.surface_format,
            source,
            &self.settings,
            self.caustic_texture.as_ref().map(|t| &t.view),
        );
        *self.material.lock().unwrap() = Some(material);
        log::debug!(
            "Caustics material ready (scale {:.2}, blend {:.2}, debug {:?})",
            self.settings.caustic_scale(),
            self.settings.caustic_blend_distance,
            self.settings.debug
        );
    }
}

impl Default for WaterSystemFeature {
    fn default() -> Self {
        Self::new()
    }
}

impl Feature for WaterSystemFeature {
    fn name(&self) -> &str {
        "water_system"
    }

    fn register(&mut self, ctx: &mut FeatureContext) -> Result<()> {
        ctx.passes.add_pass(WaterFxPass::new(self.fx_draws.clone()));
        ctx.passes
            .add_pass(CausticsPass::new(self.caustics_event(), self.material.clone()));

        self.setup_caustics_material(ctx);

        log::info!(
            "Water system feature registered (caustics at {:?}, debug {:?})",
            self.caustics_event(),
            self.settings.debug
        );
        Ok(())
    }

    fn prepare(&mut self, _ctx: &PrepareContext) -> Result<()> {
        Ok(())
    }

    fn shader_defines(&self) -> HashMap<String, ShaderDefine> {
        let mut defines = HashMap::new();
        defines.insert(
            DEBUG_CAUSTICS.to_string(),
            ShaderDefine::Bool(self.enabled && self.settings.debug == DebugMode::Caustics),
        );
        defines
    }

    fn cleanup(&mut self, _device: &wgpu::Device) {
        *self.material.lock().unwrap() = None;
        self.fx_draws.lock().unwrap().clear();
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_mode_retargets_the_caustics_pass() {
        let feature = WaterSystemFeature::new();
        assert_eq!(feature.caustics_event(), PassEvent::AfterSkybox);

        let feature = WaterSystemFeature::new()
            .with_settings(WaterSystemSettings::new().with_debug(DebugMode::Caustics));
        assert_eq!(feature.caustics_event(), PassEvent::AfterPostProcess);

        let feature = WaterSystemFeature::new()
            .with_settings(WaterSystemSettings::new().with_debug(DebugMode::WaterEffects));
        assert_eq!(feature.caustics_event(), PassEvent::AfterSkybox);
    }

    #[test]
    fn material_slot_starts_empty() {
        let feature = WaterSystemFeature::new();
        assert!(feature.material().lock().unwrap().is_none());
    }
}
