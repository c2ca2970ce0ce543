//! Procedural geometry generators.
//!
//! - `torus`: ring torus around the Z axis
//! - `cuboid`: subdivided axis aligned box
//! - `polyhedron`: subdivided solids projected onto a sphere (tetrahedron)
//! - `text`: extruded, beveled text from a typeface font
//!
//! All generators return a CPU-side [`Geometry`](crate::data_structures::model::Geometry)
//! centred on the local origin, except `text` which starts at the baseline.

pub mod cuboid;
pub mod polyhedron;
pub mod text;
pub mod torus;

pub use cuboid::cuboid;
pub use polyhedron::tetrahedron;
pub use text::{TextOptions, text};
pub use torus::torus;
