//! Absorption gradient and the baked 1-D color ramp

/// Width of the baked absorption ramp texture.
pub const RAMP_WIDTH: usize = 128;

/// A single color key on a gradient, at position `t` in [0, 1].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GradientKey {
    pub t: f32,
    pub color: [f32; 4],
}

/// Piecewise-linear color gradient, clamped at both ends.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    keys: Vec<GradientKey>,
}

impl Gradient {
    /// Build a gradient from color keys. Keys are sorted by position; at
    /// least one key is required.
    pub fn new(mut keys: Vec<GradientKey>) -> Self {
        assert!(!keys.is_empty(), "gradient needs at least one key");
        keys.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self { keys }
    }

    /// Default shallow-to-deep water absorption colors.
    pub fn absorption_default() -> Self {
        Self::new(vec![
            GradientKey {
                t: 0.0,
                color: [0.32, 0.65, 0.62, 1.0],
            },
            GradientKey {
                t: 0.35,
                color: [0.1, 0.35, 0.45, 1.0],
            },
            GradientKey {
                t: 1.0,
                color: [0.0, 0.05, 0.12, 1.0],
            },
        ])
    }

    /// Evaluate the gradient at `t`, clamping outside the key range.
    pub fn eval(&self, t: f32) -> [f32; 4] {
        let mut prev = &self.keys[0];
        if t <= prev.t {
            return prev.color;
        }

        for key in &self.keys[1..] {
            if t <= key.t {
                let span = key.t - prev.t;
                if span <= f32::EPSILON {
                    return key.color;
                }
                let f = (t - prev.t) / span;
                return [
                    prev.color[0] + (key.color[0] - prev.color[0]) * f,
                    prev.color[1] + (key.color[1] - prev.color[1]) * f,
                    prev.color[2] + (key.color[2] - prev.color[2]) * f,
                    prev.color[3] + (key.color[3] - prev.color[3]) * f,
                ];
            }
            prev = key;
        }

        prev.color
    }
}

/// Bake any domain-to-color mapping into `RAMP_WIDTH` RGBA8 pixels.
///
/// Pixel `i` is the mapping evaluated at `i / RAMP_WIDTH`. The function is
/// not required to be continuous; whatever it returns is quantized per
/// channel.
pub fn bake_ramp<F: Fn(f32) -> [f32; 4]>(f: F) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(RAMP_WIDTH * 4);
    for i in 0..RAMP_WIDTH {
        let color = f(i as f32 / RAMP_WIDTH as f32);
        for channel in color {
            pixels.push((channel.clamp(0.0, 1.0) * 255.0).round() as u8);
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantize(color: [f32; 4]) -> [u8; 4] {
        color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    #[test]
    fn ramp_pixels_match_the_mapping() {
        let gradient = Gradient::absorption_default();
        let ramp = bake_ramp(|t| gradient.eval(t));
        assert_eq!(ramp.len(), RAMP_WIDTH * 4);
        for i in 0..RAMP_WIDTH {
            let expected = quantize(gradient.eval(i as f32 / RAMP_WIDTH as f32));
            assert_eq!(&ramp[i * 4..i * 4 + 4], &expected);
        }
    }

    #[test]
    fn discontinuous_mapping_bakes_exactly() {
        let step = |t: f32| {
            if t < 0.5 {
                [1.0, 0.0, 0.0, 1.0]
            } else {
                [0.0, 0.0, 1.0, 1.0]
            }
        };
        let ramp = bake_ramp(step);
        for i in 0..RAMP_WIDTH {
            let expected = quantize(step(i as f32 / RAMP_WIDTH as f32));
            assert_eq!(&ramp[i * 4..i * 4 + 4], &expected, "pixel {}", i);
        }
    }

    #[test]
    fn eval_clamps_at_the_edges() {
        let gradient = Gradient::new(vec![
            GradientKey {
                t: 0.2,
                color: [0.0, 1.0, 0.0, 1.0],
            },
            GradientKey {
                t: 0.8,
                color: [0.0, 0.0, 1.0, 1.0],
            },
        ]);
        assert_eq!(gradient.eval(-1.0), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(gradient.eval(0.0), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(gradient.eval(1.0), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(gradient.eval(2.0), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn eval_interpolates_between_keys() {
        let gradient = Gradient::new(vec![
            GradientKey {
                t: 0.0,
                color: [0.0, 0.0, 0.0, 0.0],
            },
            GradientKey {
                t: 1.0,
                color: [1.0, 1.0, 1.0, 1.0],
            },
        ]);
        let mid = gradient.eval(0.5);
        for channel in mid {
            assert!((channel - 0.5).abs() < 1e-6);
        }
    }
}
