//! Riptide core - CPU-side data model for the water rendering system
//!
//! Everything in this crate is deterministic and GPU-free: the analytic wave
//! table, the absorption gradient and its baked ramp, and the designer-facing
//! settings aggregates. The `riptide-render` crate consumes these types and
//! owns all GPU resources derived from them.

pub mod gradient;
pub mod settings;
pub mod waves;

pub use gradient::{bake_ramp, Gradient, GradientKey, RAMP_WIDTH};
pub use settings::{DebugMode, ReflectionMode, WaterSystemSettings};
pub use waves::{build_wave_table, max_wave_height, BasicWaveSettings, WaterSurfaceData, Wave};
