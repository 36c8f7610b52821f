//! flow-showroom
//!
//! A small cross-platform model showroom built on the flow runtime. It loads OBJ/MTL
//! pairs and glTF scenes, converts their materials into one physically based material,
//! lays multiple objects out side by side and frames the camera on the result. Runs
//! natively and in the browser (WebGL2).
//!
//! High-level modules
//! - `catalog`: the fixed list of selectable assets and collections
//! - `resources`: asynchronous OBJ/MTL and glTF loading into CPU-side objects
//! - `material`: conversion of loaded materials to the standard material
//! - `layout`: recentering and side-by-side placement
//! - `loader`: generation tracking for the loads of one selection
//! - `fit`: camera framing on a bounding box
//! - `controller`: UI input to actions (keyboard natively, DOM controls on the web)
//! - `viewer`: the showroom flow tying everything together
//! - `stats`: frame rate and frame time reporting
//! - `camera`, `context`, `flow`, `pipelines`, `render`: the runtime and GPU side
//!

pub mod camera;
pub mod catalog;
pub mod config;
pub mod context;
pub mod controller;
pub mod data_structures;
pub mod fit;
pub mod flow;
pub mod layout;
pub mod loader;
pub mod material;
pub mod params;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod stats;
pub mod viewer;

// Re-exports commonly used types for convenience in downstream code.
pub use config::ViewerConfig;
pub use params::{ParamKey, ViewParams};
pub use viewer::run;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point; the page provides `<canvas id="canvas">` and optional controls.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    flow::init_logging();
    run(ViewerConfig::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
