//! Engine data structures: models, bounds, textures, scene graph and transforms.
//!
//! - `bounds` axis-aligned bounding boxes used for layout and framing
//! - `instance` holds per-node transformation data and its GPU representation
//! - `model` contains the CPU-side meshes, materials and object node trees
//! - `scene_graph` holds the scene and the model group it displays
//! - `texture` contains the GPU texture wrapper and creation utilities

pub mod bounds;
pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
