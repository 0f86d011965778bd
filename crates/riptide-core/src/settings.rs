//! Designer-facing configuration for the water system feature

/// How the surface sources its reflections. The planar provider is an
/// external collaborator; riptide only toggles it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReflectionMode {
    Off,
    #[default]
    ReflectionProbe,
    PlanarReflection,
}

/// Debug visualization for the water passes. Only affects caustics pass
/// scheduling and its blend mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DebugMode {
    #[default]
    Disabled,
    WaterEffects,
    Caustics,
}

/// Settings for the water system render feature.
#[derive(Clone, Debug, PartialEq)]
pub struct WaterSystemSettings {
    /// Caustics tiling scale, clamped to 0.1..=1.0.
    caustic_scale: f32,
    /// Distance over which caustics fade out against scene depth.
    pub caustic_blend_distance: f32,
    pub debug: DebugMode,
}

impl WaterSystemSettings {
    pub fn new() -> Self {
        Self {
            caustic_scale: 0.25,
            caustic_blend_distance: 3.0,
            debug: DebugMode::Disabled,
        }
    }

    pub fn with_caustic_scale(mut self, scale: f32) -> Self {
        self.caustic_scale = scale.clamp(0.1, 1.0);
        self
    }

    pub fn with_blend_distance(mut self, distance: f32) -> Self {
        self.caustic_blend_distance = distance;
        self
    }

    pub fn with_debug(mut self, debug: DebugMode) -> Self {
        self.debug = debug;
        self
    }

    pub fn caustic_scale(&self) -> f32 {
        self.caustic_scale
    }
}

impl Default for WaterSystemSettings {
    fn default() -> Self {
        Self::new()
    }
}
