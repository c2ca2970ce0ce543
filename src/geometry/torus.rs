use std::f32::consts::TAU;

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::model::Geometry;

/// Ring torus in the XY plane around the Z axis.
///
/// `radius` is the distance from the centre to the middle of the tube and
/// `tube` the tube radius. The grid repeats its seam column and row so every
/// vertex has exactly one normal.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Geometry {
    let mut geometry = Geometry::new("torus");
    let radial_segments = radial_segments.max(2);
    let tubular_segments = tubular_segments.max(3);

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let position = Vector3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
            geometry.push_vertex(position, (position - center).normalize());
        }
    }

    let row = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            geometry.push_triangle(a, b, d);
            geometry.push_triangle(b, c, d);
        }
    }
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_dimensions() {
        let g = torus(0.3, 0.2, 32, 64);
        assert_eq!(g.vertices.len(), 33 * 65);
        assert_eq!(g.triangle_count(), 32 * 64 * 2);
    }

    #[test]
    fn fits_inside_outer_radius() {
        let g = torus(0.3, 0.2, 8, 16);
        let bounds = g.bounding_box().unwrap();
        assert!((bounds.max.x - 0.5).abs() < 1e-5);
        assert!((bounds.max.z - 0.2).abs() < 1e-2);
        for v in &g.vertices {
            let n = Vector3::from(v.normal);
            assert!((n.magnitude() - 1.0).abs() < 1e-5);
        }
    }
}
