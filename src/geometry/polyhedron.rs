use cgmath::{InnerSpace, Vector3, VectorSpace};

use crate::data_structures::model::Geometry;

const TETRAHEDRON_VERTICES: [[f32; 3]; 4] = [
    [1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
];

const TETRAHEDRON_FACES: [[usize; 3]; 4] = [[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]];

/// Tetrahedron of circumradius `radius`. Each face is subdivided `detail`
/// times and the result projected onto the sphere, so higher detail
/// approaches a ball.
pub fn tetrahedron(radius: f32, detail: u32) -> Geometry {
    let vertices = TETRAHEDRON_VERTICES.map(Vector3::from);
    polyhedron("tetrahedron", &vertices, &TETRAHEDRON_FACES, radius, detail)
}

/// Non-indexed polyhedron built from a base solid.
///
/// With `detail == 0` the faces stay flat; otherwise normals are the
/// normalised positions, giving smooth shading across the subdivided faces.
pub fn polyhedron(
    label: &str,
    vertices: &[Vector3<f32>],
    faces: &[[usize; 3]],
    radius: f32,
    detail: u32,
) -> Geometry {
    let mut triangles = Vec::new();
    for face in faces {
        subdivide_face(
            vertices[face[0]],
            vertices[face[1]],
            vertices[face[2]],
            detail,
            &mut triangles,
        );
    }

    let mut geometry = Geometry::new(label);
    for [a, b, c] in triangles {
        let [a, b, c] = [a, b, c].map(|p| p.normalize() * radius);
        if detail == 0 {
            let normal = (b - a).cross(c - a).normalize();
            for p in [a, b, c] {
                geometry.push_vertex(p, normal);
            }
        } else {
            for p in [a, b, c] {
                geometry.push_vertex(p, p.normalize());
            }
        }
        let first = geometry.vertices.len() as u32 - 3;
        geometry.push_triangle(first, first + 1, first + 2);
    }
    geometry
}

fn subdivide_face(
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
    detail: u32,
    out: &mut Vec<[Vector3<f32>; 3]>,
) {
    let cols = detail as usize + 1;

    // v[i][j]: rows from the a-b edge towards c, shrinking by one per row
    let mut v: Vec<Vec<Vector3<f32>>> = Vec::with_capacity(cols + 1);
    for i in 0..=cols {
        let t = i as f32 / cols as f32;
        let aj = a.lerp(c, t);
        let bj = b.lerp(c, t);
        let rows = cols - i;
        let row = (0..=rows)
            .map(|j| {
                if j == 0 && i == cols {
                    aj
                } else {
                    aj.lerp(bj, j as f32 / rows as f32)
                }
            })
            .collect();
        v.push(row);
    }

    for i in 0..cols {
        for j in 0..(2 * (cols - i) - 1) {
            let k = j / 2;
            if j % 2 == 0 {
                out.push([v[i][k + 1], v[i + 1][k], v[i][k]]);
            } else {
                out.push([v[i][k + 1], v[i + 1][k + 1], v[i + 1][k]]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_two_has_nine_triangles_per_face() {
        let g = tetrahedron(0.5, 2);
        assert_eq!(g.triangle_count(), 4 * 9);
        assert_eq!(g.vertices.len(), 4 * 9 * 3);
    }

    #[test]
    fn vertices_lie_on_sphere() {
        let g = tetrahedron(0.5, 2);
        for v in &g.vertices {
            let p = Vector3::from(v.position);
            assert!((p.magnitude() - 0.5).abs() < 1e-5);
            let n = Vector3::from(v.normal);
            assert!((n - p.normalize()).magnitude() < 1e-5);
        }
    }

    #[test]
    fn flat_tetrahedron_faces_point_outward() {
        let g = tetrahedron(1.0, 0);
        assert_eq!(g.triangle_count(), 4);
        for t in g.indices.chunks_exact(3) {
            let a = Vector3::from(g.vertices[t[0] as usize].position);
            let n = Vector3::from(g.vertices[t[0] as usize].normal);
            assert!(n.dot(a) > 0.0);
        }
    }
}
