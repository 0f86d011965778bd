//! Feature registry

use super::{Feature, FeatureContext, PrepareContext};
use crate::shaders::ShaderDefine;
use crate::{Error, Result};
use bitflags::bitflags;
use std::collections::HashMap;

bitflags! {
    /// Feature flags for pipeline variants
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureFlags: u32 {
        const WATER_FX = 1 << 0;
        const CAUSTICS = 1 << 1;
    }
}

/// Registry for managing features
pub struct FeatureRegistry {
    features: HashMap<String, Box<dyn Feature>>,
    active_flags: FeatureFlags,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self {
            features: HashMap::new(),
            active_flags: FeatureFlags::empty(),
        }
    }

    /// Register a feature
    pub fn register(&mut self, feature: Box<dyn Feature>) {
        let name = feature.name().to_string();
        self.features.insert(name, feature);
    }

    /// Enable a feature by name
    pub fn enable(&mut self, name: &str) -> Result<()> {
        let feature = self
            .features
            .get_mut(name)
            .ok_or_else(|| Error::Feature(format!("Feature '{}' not found", name)))?;
        feature.set_enabled(true);
        Ok(())
    }

    /// Disable a feature by name
    pub fn disable(&mut self, name: &str) -> Result<()> {
        let feature = self
            .features
            .get_mut(name)
            .ok_or_else(|| Error::Feature(format!("Feature '{}' not found", name)))?;
        feature.set_enabled(false);
        Ok(())
    }

    pub fn active_flags(&self) -> FeatureFlags {
        self.active_flags
    }

    /// Shader defines from all features. Disabled features still contribute
    /// their off-state values so every variant has its constants declared.
    pub fn collect_shader_defines(&self) -> HashMap<String, ShaderDefine> {
        let mut defines = HashMap::new();
        for feature in self.features.values() {
            defines.extend(feature.shader_defines());
        }
        defines
    }

    /// Initialize all features by calling `register()` on each
    pub fn register_all(&mut self, ctx: &mut FeatureContext) -> Result<()> {
        for feature in self.features.values_mut() {
            feature.register(ctx)?;
        }
        Ok(())
    }

    /// Prepare all enabled features
    pub fn prepare_all(&mut self, ctx: &PrepareContext) -> Result<()> {
        for feature in self.features.values_mut() {
            if feature.is_enabled() {
                feature.prepare(ctx)?;
            }
        }
        Ok(())
    }

    /// Get a feature by name
    pub fn get(&self, name: &str) -> Option<&dyn Feature> {
        self.features.get(name).map(|f| &**f)
    }

    /// Get a mutable reference to a specific feature by type
    pub fn get_typed_mut<T: Feature + 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.features
            .get_mut(name)
            .and_then(|f| f.as_any_mut().downcast_mut::<T>())
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
