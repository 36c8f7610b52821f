//! Render pipelines and their bind group layouts.
//!
//! - `standard`: the physically based pipeline used for every loaded mesh
//! - `light`: key light and environment uniform, including exposure

pub mod light;
pub mod standard;
