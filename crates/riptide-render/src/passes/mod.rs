//! The water render passes

pub mod caustics;
pub mod water_fx;

pub use caustics::{CausticsMaterial, CausticsPass, SharedCausticsMaterial};
pub use water_fx::{FxDrawCall, WaterFxPass};
