//! Analytic wave table: descriptors, designer settings, and the seeded builder

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A single analytic wave, laid out for direct GPU upload (six floats).
///
/// `omni` is the custom/omnidirectional flag stored as 0.0 or 1.0 so the
/// whole table can be memcpy'd into a storage buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Wave {
    pub amplitude: f32,
    /// Propagation direction in degrees.
    pub direction: f32,
    pub wavelength: f32,
    pub origin: [f32; 2],
    pub omni: f32,
}

impl Wave {
    pub fn new(amplitude: f32, direction: f32, wavelength: f32, origin: Vec2, omni: bool) -> Self {
        Self {
            amplitude,
            direction,
            wavelength,
            origin: origin.to_array(),
            omni: if omni { 1.0 } else { 0.0 },
        }
    }
}

/// Base parameters the procedural builder perturbs per wave.
#[derive(Clone, Debug, PartialEq)]
pub struct BasicWaveSettings {
    pub num_waves: u32,
    pub amplitude: f32,
    /// Mean direction in degrees.
    pub direction: f32,
    pub wavelength: f32,
}

impl Default for BasicWaveSettings {
    fn default() -> Self {
        Self {
            num_waves: 6,
            amplitude: 0.5,
            direction: 0.0,
            wavelength: 10.0,
        }
    }
}

/// Designer-facing description of the water surface.
///
/// The wave table is always rebuilt from this aggregate as a whole; nothing
/// downstream mutates individual waves in place.
#[derive(Clone, Debug)]
pub struct WaterSurfaceData {
    /// When set, `custom_waves` is used verbatim and the procedural settings
    /// are ignored.
    pub use_custom_waves: bool,
    pub custom_waves: Vec<Wave>,
    pub basic_waves: BasicWaveSettings,
    pub random_seed: u64,
    /// Maximum visibility depth in world units, published as the `max_depth`
    /// shader uniform and used as the depth camera's far plane.
    pub max_visibility: f32,
    /// Depth-to-color absorption mapping, baked into the 128x1 ramp texture.
    pub absorption_ramp: crate::Gradient,
}

impl Default for WaterSurfaceData {
    fn default() -> Self {
        Self {
            use_custom_waves: false,
            custom_waves: Vec::new(),
            basic_waves: BasicWaveSettings::default(),
            random_seed: 3234,
            max_visibility: 40.0,
            absorption_ramp: crate::Gradient::absorption_default(),
        }
    }
}

/// Build the wave table for a surface.
///
/// Custom mode copies the authored list, order preserved. Procedural mode
/// derives `num_waves` entries from a stream seeded with `random_seed`:
/// amplitude `base * U(0.8, 1.2)`, direction `base + U(-90, 90)` degrees,
/// wavelength `base * U(0.6, 1.4)`. The same seed and base parameters yield
/// a bit-identical table.
pub fn build_wave_table(surface: &WaterSurfaceData) -> Vec<Wave> {
    if surface.use_custom_waves {
        return surface.custom_waves.clone();
    }

    let basic = &surface.basic_waves;
    let mut rng = StdRng::seed_from_u64(surface.random_seed);
    log::debug!(
        "building {} procedural waves (seed {})",
        basic.num_waves,
        surface.random_seed
    );

    (0..basic.num_waves)
        .map(|_| {
            let amplitude = basic.amplitude * rng.gen_range(0.8f32..1.2);
            let direction = basic.direction + rng.gen_range(-90.0f32..90.0);
            let wavelength = basic.wavelength * rng.gen_range(0.6f32..1.4);
            Wave::new(amplitude, direction, wavelength, Vec2::ZERO, false)
        })
        .collect()
}

/// Normalization constant for shader-side height blending.
///
/// Despite the name this is the *average* amplitude, `sum / max(n, 1)`; the
/// water shader divides by it, so the averaging must be preserved. An empty
/// table yields 0.
pub fn max_wave_height(waves: &[Wave]) -> f32 {
    let sum: f32 = waves.iter().map(|w| w.amplitude).sum();
    sum / waves.len().max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(seed: u64, num_waves: u32, amplitude: f32) -> WaterSurfaceData {
        WaterSurfaceData {
            basic_waves: BasicWaveSettings {
                num_waves,
                amplitude,
                ..BasicWaveSettings::default()
            },
            random_seed: seed,
            ..WaterSurfaceData::default()
        }
    }

    #[test]
    fn same_seed_same_table() {
        let data = surface(42, 8, 1.0);
        assert_eq!(build_wave_table(&data), build_wave_table(&data));
    }

    #[test]
    fn different_seed_changes_table() {
        let a = build_wave_table(&surface(42, 4, 1.0));
        let b = build_wave_table(&surface(43, 4, 1.0));
        assert_eq!(a.len(), b.len());
        assert_ne!(a, b);
    }

    #[test]
    fn procedural_waves_stay_in_bounds() {
        let basic = BasicWaveSettings {
            num_waves: 32,
            amplitude: 2.0,
            direction: 10.0,
            wavelength: 5.0,
        };
        let data = WaterSurfaceData {
            basic_waves: basic.clone(),
            ..WaterSurfaceData::default()
        };
        for wave in build_wave_table(&data) {
            assert!(wave.amplitude >= basic.amplitude * 0.8);
            assert!(wave.amplitude <= basic.amplitude * 1.2);
            assert!(wave.direction >= basic.direction - 90.0);
            assert!(wave.direction <= basic.direction + 90.0);
            assert!(wave.wavelength >= basic.wavelength * 0.6);
            assert!(wave.wavelength <= basic.wavelength * 1.4);
            assert_eq!(wave.origin, [0.0, 0.0]);
            assert_eq!(wave.omni, 0.0);
        }
    }

    #[test]
    fn custom_list_passes_through_in_order() {
        let authored = vec![
            Wave::new(1.0, 0.0, 8.0, Vec2::ZERO, false),
            Wave::new(0.2, 45.0, 3.0, Vec2::new(5.0, -5.0), true),
            Wave::new(0.7, -30.0, 12.0, Vec2::ZERO, false),
        ];
        let data = WaterSurfaceData {
            use_custom_waves: true,
            custom_waves: authored.clone(),
            ..WaterSurfaceData::default()
        };
        assert_eq!(build_wave_table(&data), authored);
    }

    #[test]
    fn zero_waves_is_a_valid_degenerate_state() {
        let data = surface(7, 0, 1.0);
        let table = build_wave_table(&data);
        assert!(table.is_empty());
        assert_eq!(max_wave_height(&table), 0.0);
    }

    #[test]
    fn height_constant_is_the_average_amplitude() {
        let waves = vec![
            Wave::new(1.0, 0.0, 10.0, Vec2::ZERO, false),
            Wave::new(2.0, 0.0, 10.0, Vec2::ZERO, false),
            Wave::new(3.0, 0.0, 10.0, Vec2::ZERO, false),
        ];
        assert_eq!(max_wave_height(&waves), 2.0);
    }
}
