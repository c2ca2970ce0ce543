//! Render pipelines.
//!
//! Both pipelines share the normal shader and the camera bind group at
//! index 0; they only differ in primitive topology and culling.

pub mod basic;
pub mod wireframe;
