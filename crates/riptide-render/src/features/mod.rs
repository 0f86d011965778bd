//! Feature system
//!
//! Features are modular rendering components registered with the host
//! pipeline. They register passes with the pass queue, contribute shader
//! specialization constants, and release their resources on teardown.

mod registry;
mod traits;
pub mod water;

pub use registry::{FeatureFlags, FeatureRegistry};
pub use traits::{AsAny, Feature, FeatureContext, PrepareContext};
pub use water::WaterSystemFeature;
