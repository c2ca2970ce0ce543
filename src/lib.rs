//! floating-showcase
//!
//! A decorative name card rendered with wgpu: three lines of extruded,
//! beveled text surrounded by hundreds of floating wireframe primitives,
//! viewed through a damped orbit camera. Runs natively and in the browser.
//!
//! High-level modules
//! - `camera`: camera, projection, uniforms and orbit controls
//! - `context`: GPU and window context, viewport and resize handling
//! - `data_structures`: geometry, instances, textures, the scene graph and GPU batches
//! - `flow`: event loop and the `GraphicsFlow` abstraction
//! - `geometry`: procedural torus, box, tetrahedron and text generators
//! - `pipelines`: the solid and wireframe normal-shaded pipelines
//! - `resources`: asset loading and typeface fonts
//! - `render`: render composition for pipeline batching
//! - `showcase`: the scene itself

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod geometry;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod showcase;

pub use showcase::{ShowcaseConfig, run_showcase};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run_showcase(ShowcaseConfig::default()).map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}
