//! Reflection provider seam
//!
//! Planar reflections come from an external collaborator; the water system
//! only decides whether it should be running.

use riptide_core::ReflectionMode;

/// The attachable reflection collaborator. Riptide toggles it and nothing
/// else.
pub trait ReflectionProvider {
    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;
}

/// Enable the provider exactly when the mode asks for planar reflections.
pub fn configure_reflections(provider: &mut dyn ReflectionProvider, mode: ReflectionMode) {
    let enabled = mode == ReflectionMode::PlanarReflection;
    provider.set_enabled(enabled);
    log::debug!("Planar reflections {}", if enabled { "enabled" } else { "disabled" });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        enabled: bool,
    }

    impl ReflectionProvider for Recorder {
        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    #[test]
    fn only_planar_mode_enables_the_provider() {
        let mut provider = Recorder::default();

        configure_reflections(&mut provider, ReflectionMode::PlanarReflection);
        assert!(provider.is_enabled());

        configure_reflections(&mut provider, ReflectionMode::ReflectionProbe);
        assert!(!provider.is_enabled());

        configure_reflections(&mut provider, ReflectionMode::Off);
        assert!(!provider.is_enabled());
    }
}
