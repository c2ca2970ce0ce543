use cgmath::Vector3;

use crate::data_structures::model::Geometry;

#[derive(Copy, Clone)]
enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// One face of the box, as a subdivided plane.
struct Face {
    u: Axis,
    v: Axis,
    w: Axis,
    udir: f32,
    vdir: f32,
    width: f32,
    height: f32,
    depth: f32,
    grid_x: u32,
    grid_y: u32,
}

/// Axis aligned box centred on the origin, each face split into a grid.
///
/// Faces do not share vertices so every face keeps its own flat normal.
pub fn cuboid(
    width: f32,
    height: f32,
    depth: f32,
    width_segments: u32,
    height_segments: u32,
    depth_segments: u32,
) -> Geometry {
    use Axis::*;
    let (ws, hs, ds) = (
        width_segments.max(1),
        height_segments.max(1),
        depth_segments.max(1),
    );
    let faces = [
        // +x, -x
        Face { u: Z, v: Y, w: X, udir: -1.0, vdir: -1.0, width: depth, height, depth: width, grid_x: ds, grid_y: hs },
        Face { u: Z, v: Y, w: X, udir: 1.0, vdir: -1.0, width: depth, height, depth: -width, grid_x: ds, grid_y: hs },
        // +y, -y
        Face { u: X, v: Z, w: Y, udir: 1.0, vdir: 1.0, width, height: depth, depth: height, grid_x: ws, grid_y: ds },
        Face { u: X, v: Z, w: Y, udir: 1.0, vdir: -1.0, width, height: depth, depth: -height, grid_x: ws, grid_y: ds },
        // +z, -z
        Face { u: X, v: Y, w: Z, udir: 1.0, vdir: -1.0, width, height, depth, grid_x: ws, grid_y: hs },
        Face { u: X, v: Y, w: Z, udir: -1.0, vdir: -1.0, width, height, depth: -depth, grid_x: ws, grid_y: hs },
    ];

    let mut geometry = Geometry::new("box");
    for face in &faces {
        build_plane(&mut geometry, face);
    }
    geometry
}

fn build_plane(geometry: &mut Geometry, face: &Face) {
    let segment_width = face.width / face.grid_x as f32;
    let segment_height = face.height / face.grid_y as f32;
    let width_half = face.width / 2.0;
    let height_half = face.height / 2.0;
    let depth_half = face.depth / 2.0;
    let grid_x1 = face.grid_x + 1;
    let grid_y1 = face.grid_y + 1;

    let first = geometry.vertices.len() as u32;
    for iy in 0..grid_y1 {
        let y = iy as f32 * segment_height - height_half;
        for ix in 0..grid_x1 {
            let x = ix as f32 * segment_width - width_half;
            let mut position = [0.0f32; 3];
            position[face.u as usize] = x * face.udir;
            position[face.v as usize] = y * face.vdir;
            position[face.w as usize] = depth_half;
            let mut normal = [0.0f32; 3];
            normal[face.w as usize] = if face.depth > 0.0 { 1.0 } else { -1.0 };
            geometry.push_vertex(Vector3::from(position), Vector3::from(normal));
        }
    }

    for iy in 0..face.grid_y {
        for ix in 0..face.grid_x {
            let a = first + ix + grid_x1 * iy;
            let b = first + ix + grid_x1 * (iy + 1);
            let c = first + (ix + 1) + grid_x1 * (iy + 1);
            let d = first + (ix + 1) + grid_x1 * iy;
            geometry.push_triangle(a, b, d);
            geometry.push_triangle(b, c, d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn subdivided_faces() {
        let g = cuboid(0.5, 0.5, 0.5, 4, 4, 4);
        assert_eq!(g.vertices.len(), 6 * 25);
        assert_eq!(g.triangle_count(), 6 * 16 * 2);
        let bounds = g.bounding_box().unwrap();
        assert_eq!(bounds.min, Vector3::new(-0.25, -0.25, -0.25));
        assert_eq!(bounds.max, Vector3::new(0.25, 0.25, 0.25));
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        let g = cuboid(1.0, 2.0, 3.0, 1, 2, 3);
        for t in g.indices.chunks_exact(3) {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| Vector3::from(g.vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a);
            let normal = Vector3::from(g.vertices[t[0] as usize].normal);
            assert!(face_normal.dot(normal) > 0.0);
        }
    }
}
