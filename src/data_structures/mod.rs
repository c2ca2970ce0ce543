//! Engine data structures: geometry, instances, textures and the scene.
//!
//! - `model` contains vertex layouts, CPU geometry and its GPU upload
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-mesh transformation data
//! - `scene_graph` is the arena-backed scene all meshes live in
//! - `batch` mirrors the scene on the GPU as instanced draws

pub mod batch;
pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
