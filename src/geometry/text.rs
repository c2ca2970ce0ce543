//! Extruded text.
//!
//! Each glyph outline is flattened into contours, the caps are triangulated
//! with a non-zero fill and the walls are stitched between a stack of layers:
//! the front bevel, the straight body and the back bevel. Bevel layers push
//! every contour point outwards along its miter vector, so the letter walls
//! are `bevel_size` wider than the caps and rounded over `bevel_segments`
//! quarter-circle steps.

use std::f32::consts::FRAC_PI_2;

use anyhow::{Result, anyhow};
use cgmath::{InnerSpace, Point2, Vector2, Vector3};
use lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
    math::point, path::Path,
};

use crate::{data_structures::model::Geometry, resources::font::Font};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextOptions {
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 0.5,
            depth: 0.2,
            curve_segments: 12,
            bevel_enabled: true,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 5,
        }
    }
}

/// One slice of the extrusion: where it sits on z and how far the contour is
/// pushed out.
#[derive(Copy, Clone, Debug)]
struct Layer {
    z: f32,
    spread: f32,
}

/// Build the extruded geometry of `text`. The geometry starts at the text
/// baseline origin; callers centre it as needed.
pub fn text(font: &Font, text: &str, options: &TextOptions) -> Result<Geometry> {
    let mut geometry = Geometry::new(&format!("text {text:?}"));
    let layers = layers(options);
    let bevel_layers = if options.bevel_enabled {
        options.bevel_segments as usize
    } else {
        0
    };

    for outline in font.outlines(text, options.size)? {
        let contours = outline.contours(options.curve_segments);
        if contours.is_empty() {
            continue;
        }
        extrude_glyph(&mut geometry, &contours, &layers, bevel_layers)?;
    }
    Ok(geometry)
}

fn layers(options: &TextOptions) -> Vec<Layer> {
    let (thickness, size, offset, segments) = if options.bevel_enabled {
        (
            options.bevel_thickness,
            options.bevel_size,
            options.bevel_offset,
            options.bevel_segments,
        )
    } else {
        (0.0, 0.0, 0.0, 0)
    };
    let bevel = |b: u32| {
        let t = b as f32 / segments as f32;
        (thickness * (t * FRAC_PI_2).cos(), size * (t * FRAC_PI_2).sin() + offset)
    };

    let mut layers = Vec::with_capacity(segments as usize * 2 + 2);
    for b in 0..segments {
        let (z, spread) = bevel(b);
        layers.push(Layer { z: -z, spread });
    }
    let body = size + offset;
    layers.push(Layer { z: 0.0, spread: body });
    layers.push(Layer {
        z: options.depth,
        spread: body,
    });
    for b in (0..segments).rev() {
        let (z, spread) = bevel(b);
        layers.push(Layer {
            z: options.depth + z,
            spread,
        });
    }
    layers
}

fn signed_area(contour: &[Point2<f32>]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let (a, b) = (contour[i], contour[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

/// Unit normal of every edge `i -> i + 1`, pointing away from the filled
/// region of the glyph.
fn edge_normals(contour: &[Point2<f32>], solid_ccw: bool) -> Vec<Vector2<f32>> {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let d = contour[(i + 1) % n] - contour[i];
            let normal = if solid_ccw {
                Vector2::new(d.y, -d.x)
            } else {
                Vector2::new(-d.y, d.x)
            };
            if normal.magnitude2() > 0.0 {
                normal.normalize()
            } else {
                normal
            }
        })
        .collect()
}

/// Miter direction per vertex: moving a vertex by `spread * v` moves both
/// adjacent edges outwards by `spread`. Very sharp corners are capped at a
/// length of sqrt(2).
fn bevel_vectors(normals: &[Vector2<f32>]) -> Vec<Vector2<f32>> {
    let n = normals.len();
    (0..n)
        .map(|i| {
            let prev = normals[(i + n - 1) % n];
            let next = normals[i];
            let denom = 1.0 + prev.dot(next);
            if denom < 1e-6 {
                return next;
            }
            let v = (prev + next) / denom;
            if v.magnitude2() > 2.0 {
                v.normalize() * std::f32::consts::SQRT_2
            } else {
                v
            }
        })
        .collect()
}

fn extrude_glyph(
    geometry: &mut Geometry,
    contours: &[Vec<Point2<f32>>],
    layers: &[Layer],
    bevel_layers: usize,
) -> Result<()> {
    // the largest contour is always a filled one; its winding tells which
    // side of every edge is solid
    let solid_ccw = contours
        .iter()
        .map(|c| signed_area(c))
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .map_or(true, |area| area > 0.0);

    let rings: Vec<(Vec<Vector2<f32>>, Vec<Vector2<f32>>)> = contours
        .iter()
        .map(|contour| {
            let normals = edge_normals(contour, solid_ccw);
            let bevels = bevel_vectors(&normals);
            (normals, bevels)
        })
        .collect();

    let spread = |contour_idx: usize, layer: Layer| -> Vec<Vector3<f32>> {
        contours[contour_idx]
            .iter()
            .zip(&rings[contour_idx].1)
            .map(|(p, v)| {
                let q = Point2::new(p.x + v.x * layer.spread, p.y + v.y * layer.spread);
                Vector3::new(q.x, q.y, layer.z)
            })
            .collect()
    };

    let (Some(&front), Some(&back)) = (layers.first(), layers.last()) else {
        return Ok(());
    };
    let front_cap: Vec<Vec<Vector3<f32>>> = (0..contours.len()).map(|c| spread(c, front)).collect();
    let back_cap: Vec<Vec<Vector3<f32>>> = (0..contours.len()).map(|c| spread(c, back)).collect();
    for (a, b, c) in triangulate(&front_cap)? {
        geometry.push_oriented_triangle(a, b, c, -Vector3::unit_z());
    }
    for (a, b, c) in triangulate(&back_cap)? {
        geometry.push_oriented_triangle(a, b, c, Vector3::unit_z());
    }

    let body_start = bevel_layers;
    for (c, (normals, _)) in rings.iter().enumerate() {
        let slices: Vec<Vec<Vector3<f32>>> = layers.iter().map(|&l| spread(c, l)).collect();
        for l in 0..slices.len() - 1 {
            let z_hint = if l < body_start {
                -1.0
            } else if l > body_start {
                1.0
            } else {
                0.0
            };
            let (lower, upper) = (&slices[l], &slices[l + 1]);
            let n = lower.len();
            for i in 0..n {
                let j = (i + 1) % n;
                let outward = Vector3::new(normals[i].x, normals[i].y, z_hint);
                geometry.push_oriented_triangle(lower[i], lower[j], upper[j], outward);
                geometry.push_oriented_triangle(lower[i], upper[j], upper[i], outward);
            }
        }
    }
    Ok(())
}

/// Triangulate the region enclosed by `contours` (all on one z plane).
fn triangulate(
    contours: &[Vec<Vector3<f32>>],
) -> Result<Vec<(Vector3<f32>, Vector3<f32>, Vector3<f32>)>> {
    let z = contours
        .first()
        .and_then(|c| c.first())
        .map_or(0.0, |p| p.z);

    let mut builder = Path::builder();
    for contour in contours {
        let mut points = contour.iter();
        let Some(first) = points.next() else { continue };
        builder.begin(point(first.x, first.y));
        for p in points {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            &path,
            &FillOptions::default().with_fill_rule(FillRule::NonZero),
            &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
                vertex.position().to_array()
            }),
        )
        .map_err(|e| anyhow!("failed to triangulate glyph cap: {e:?}"))?;

    let at = |i: u32| {
        let [x, y] = buffers.vertices[i as usize];
        Vector3::new(x, y, z)
    };
    Ok(buffers
        .indices
        .chunks_exact(3)
        .map(|t| (at(t[0]), at(t[1]), at(t[2])))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK_FONT: &str = r#"{
        "familyName": "Block",
        "resolution": 1000,
        "boundingBox": { "yMin": 0, "yMax": 1000 },
        "glyphs": {
            "I": { "ha": 600, "o": "m 0 0 l 0 500 l 500 500 l 500 0 z" },
            "O": { "ha": 600, "o": "m 0 0 l 0 500 l 500 500 l 500 0 z m 100 100 l 400 100 l 400 400 l 100 400 z" }
        }
    }"#;

    fn font() -> Font {
        Font::from_json(BLOCK_FONT).unwrap()
    }

    fn flat() -> TextOptions {
        TextOptions {
            size: 1.0,
            bevel_enabled: false,
            ..Default::default()
        }
    }

    #[test]
    fn unbeveled_block_is_a_prism() {
        let g = text(&font(), "I", &flat()).unwrap();
        let bounds = g.bounding_box().unwrap();
        assert!((bounds.min - Vector3::new(0.0, 0.0, 0.0)).magnitude() < 1e-5);
        assert!((bounds.max - Vector3::new(0.5, 0.5, 0.2)).magnitude() < 1e-5);
        // two cap triangles each side plus four walls
        assert_eq!(g.triangle_count(), 2 + 2 + 4 * 2);
    }

    #[test]
    fn bevel_widens_walls_and_thickens_caps() {
        let options = TextOptions {
            size: 1.0,
            ..Default::default()
        };
        let g = text(&font(), "I", &options).unwrap();
        let bounds = g.bounding_box().unwrap();
        assert!((bounds.min.x + 0.02).abs() < 1e-5);
        assert!((bounds.max.x - 0.52).abs() < 1e-5);
        assert!((bounds.min.z + 0.03).abs() < 1e-5);
        assert!((bounds.max.z - 0.23).abs() < 1e-5);
        // 12 layers give 11 bands of 4 walls
        assert_eq!(g.triangle_count(), 4 + 11 * 4 * 2);
    }

    #[test]
    fn caps_face_away_from_the_body() {
        let g = text(&font(), "I", &flat()).unwrap();
        for v in &g.vertices {
            let n = Vector3::from(v.normal);
            assert!((n.magnitude() - 1.0).abs() < 1e-5);
            if v.position[2] == 0.0 && n.z.abs() > 0.5 {
                assert_eq!(n.z, -1.0);
            }
        }
        // every wall normal points away from the block centre
        for t in g.indices.chunks_exact(3) {
            let p = Vector3::from(g.vertices[t[0] as usize].position);
            let n = Vector3::from(g.vertices[t[0] as usize].normal);
            if n.z.abs() < 0.5 {
                let from_centre = Vector3::new(p.x - 0.25, p.y - 0.25, 0.0);
                assert!(n.dot(from_centre) > 0.0);
            }
        }
    }

    #[test]
    fn holes_stay_open() {
        let g = text(&font(), "O", &flat()).unwrap();
        for t in g.indices.chunks_exact(3) {
            let n = Vector3::from(g.vertices[t[0] as usize].normal);
            if n.z.abs() < 0.5 {
                continue;
            }
            let centroid = t
                .iter()
                .map(|&i| Vector3::from(g.vertices[i as usize].position))
                .fold(Vector3::new(0.0, 0.0, 0.0), |acc, p| acc + p)
                / 3.0;
            let inside_hole = centroid.x > 0.1 && centroid.x < 0.4 && centroid.y > 0.1 && centroid.y < 0.4;
            assert!(!inside_hole, "cap triangle covers the hole at {centroid:?}");
        }
    }

    #[test]
    fn advance_places_second_glyph() {
        let g = text(&font(), "II", &flat()).unwrap();
        let bounds = g.bounding_box().unwrap();
        assert!((bounds.max.x - 1.1).abs() < 1e-5);
    }
}
