//! Filling the scene once the font is available.

use std::f32::consts::PI;

use anyhow::{Context as _, Result};
use cgmath::{Euler, Rad, Vector3};
use rand::Rng;

use crate::{
    data_structures::{
        instance::Instance,
        model::Geometry,
        scene_graph::{GeometryHandle, Material, MaterialHandle, Mesh, Registry, Scene},
    },
    geometry::{self, TextOptions},
    resources::font::Font,
    showcase::config::{ShowcaseConfig, TextLine},
};

/// Handles of everything [`populate`] put into the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Populated {
    pub text_material: MaterialHandle,
    pub wireframe_material: MaterialHandle,
    pub texts: Vec<GeometryHandle>,
    pub torus: GeometryHandle,
    pub cuboid: GeometryHandle,
    pub tetrahedron: GeometryHandle,
}

/// Random transform for a floating primitive.
///
/// Position is uniform in `[-range / 2, range / 2)` per axis, rotation about
/// x and y uniform in `[0, π)`, z rotation zero, and one uniform scale factor
/// in `[0, 1)` for all three axes.
pub fn random_transform<R: Rng + ?Sized>(rng: &mut R, range: f32) -> Instance {
    let mut sample = || rng.r#gen::<f32>();
    let position = Vector3::new(
        (sample() - 0.5) * range,
        (sample() - 0.5) * range,
        (sample() - 0.5) * range,
    );
    let rotation = Euler::new(Rad(sample() * PI), Rad(sample() * PI), Rad(0.0));
    let scale = sample();
    Instance {
        position,
        rotation,
        scale: Vector3::new(scale, scale, scale),
    }
}

/// Extrude one line, centre it on the origin and then bake its offset into
/// the vertices.
pub fn text_line_geometry(font: &Font, line: &TextLine, options: &TextOptions) -> Result<Geometry> {
    let options = TextOptions {
        size: line.size,
        ..*options
    };
    let mut geometry = geometry::text(font, &line.text, &options)
        .with_context(|| format!("cannot build text {:?}", line.text))?;
    geometry.center();
    geometry.translate(line.offset.into());
    Ok(geometry)
}

/// Add the text lines and the primitive populations to `scene`.
///
/// All text is built before anything is added, so a failure leaves the
/// scene untouched.
pub fn populate<R: Rng + ?Sized>(
    scene: &mut Scene,
    font: &Font,
    config: &ShowcaseConfig,
    rng: &mut R,
) -> Result<Populated> {
    let text_geometries = config
        .lines
        .iter()
        .map(|line| text_line_geometry(font, line, &config.text))
        .collect::<Result<Vec<_>>>()?;

    let text_material = scene.add_material(Material::normal("text"));
    let texts: Vec<GeometryHandle> = text_geometries
        .into_iter()
        .map(|geometry| {
            let handle = scene.add_geometry(geometry);
            scene.add_mesh(
                Mesh {
                    geometry: handle,
                    material: text_material,
                    transform: Instance::new(),
                },
                Registry::Texts,
            );
            handle
        })
        .collect();

    let wireframe_material = scene.add_material(Material::normal_wireframe("wireframe"));

    let t = config.torus;
    let torus = scene.add_geometry(geometry::torus(
        t.radius,
        t.tube,
        t.radial_segments,
        t.tubular_segments,
    ));
    scatter(scene, torus, wireframe_material, config, rng);

    let c = config.cuboid;
    let cuboid = scene.add_geometry(geometry::cuboid(
        c.size[0],
        c.size[1],
        c.size[2],
        c.segments[0],
        c.segments[1],
        c.segments[2],
    ));
    scatter(scene, cuboid, wireframe_material, config, rng);

    let tetrahedron = scene.add_geometry(geometry::tetrahedron(
        config.tetrahedron.radius,
        config.tetrahedron.detail,
    ));
    scatter(scene, tetrahedron, wireframe_material, config, rng);

    log::info!(
        "scene populated: {} texts, {} items",
        scene.texts().len(),
        scene.items().len()
    );

    Ok(Populated {
        text_material,
        wireframe_material,
        texts,
        torus,
        cuboid,
        tetrahedron,
    })
}

fn scatter<R: Rng + ?Sized>(
    scene: &mut Scene,
    geometry: GeometryHandle,
    material: MaterialHandle,
    config: &ShowcaseConfig,
    rng: &mut R,
) {
    for _ in 0..config.items_per_kind {
        scene.add_mesh(
            Mesh {
                geometry,
                material,
                transform: random_transform(rng, config.spawn_range),
            },
            Registry::Items,
        );
    }
}
