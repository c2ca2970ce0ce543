use std::collections::HashMap;

use cgmath::Vector3;
use floating_showcase::{
    ShowcaseConfig,
    data_structures::{
        batch::plan_batches,
        instance::Instance,
        scene_graph::{Node, Registry, Scene},
    },
    resources::font::Font,
    showcase::{Showcase, populate::text_line_geometry},
};

use crate::common::test_utils::{bootstrapped, broken_font, fixture_font, populated, seeded_rng};

mod common;

#[test]
fn scene_holds_only_the_camera_before_the_font_arrives() {
    let (showcase, scene) = bootstrapped();
    assert_eq!(scene.nodes().len(), 1);
    assert!(matches!(scene.nodes()[0], Node::Camera));
    assert_eq!(scene.mesh_count(), 0);
    assert!(scene.items().is_empty());
    assert!(scene.texts().is_empty());
    assert!(showcase.populated().is_none());
}

#[test]
fn bootstrap_sets_the_turquoise_background() {
    let (_, scene) = bootstrapped();
    assert!((scene.background.r - 0x40 as f64 / 255.0).abs() < 1e-9);
    assert!((scene.background.g - 0xe0 as f64 / 255.0).abs() < 1e-9);
    assert!((scene.background.b - 0xd0 as f64 / 255.0).abs() < 1e-9);
}

#[test]
fn font_arrival_adds_three_texts_and_450_items() {
    let (_, scene) = populated();
    assert_eq!(scene.camera_count(), 1);
    assert_eq!(scene.texts().len(), 3);
    assert_eq!(scene.items().len(), 450);
    assert_eq!(scene.nodes().len(), 1 + 3 + 450);
}

#[test]
fn each_primitive_kind_shares_one_geometry() {
    let (showcase, scene) = populated();
    let handles = showcase.populated().unwrap();

    let mut per_geometry = HashMap::new();
    for id in scene.items() {
        let mesh = scene.mesh(*id).unwrap();
        *per_geometry.entry(mesh.geometry).or_insert(0) += 1;
    }
    assert_eq!(per_geometry.len(), 3);
    assert_eq!(per_geometry[&handles.torus], 150);
    assert_eq!(per_geometry[&handles.cuboid], 150);
    assert_eq!(per_geometry[&handles.tetrahedron], 150);

    // three texts plus three shared primitive geometries
    assert_eq!(scene.geometries().len(), 6);
}

#[test]
fn items_are_added_one_kind_after_another() {
    let (showcase, scene) = populated();
    let handles = showcase.populated().unwrap();
    let kinds: Vec<_> = scene
        .items()
        .iter()
        .map(|id| scene.mesh(*id).unwrap().geometry)
        .collect();
    assert!(kinds[..150].iter().all(|g| *g == handles.torus));
    assert!(kinds[150..300].iter().all(|g| *g == handles.cuboid));
    assert!(kinds[300..].iter().all(|g| *g == handles.tetrahedron));
}

#[test]
fn scene_uses_exactly_two_materials() {
    let (showcase, scene) = populated();
    let handles = showcase.populated().unwrap();
    assert_eq!(scene.materials().len(), 2);
    assert!(!scene.material(handles.text_material).wireframe);
    assert!(scene.material(handles.wireframe_material).wireframe);

    for id in scene.texts() {
        assert_eq!(scene.mesh(*id).unwrap().material, handles.text_material);
    }
    for id in scene.items() {
        assert_eq!(scene.mesh(*id).unwrap().material, handles.wireframe_material);
    }
}

#[test]
fn initial_item_transforms_are_in_range() {
    let (_, scene) = populated();
    for id in scene.items() {
        let t = &scene.mesh(*id).unwrap().transform;
        for c in [t.position.x, t.position.y, t.position.z] {
            assert!((-10.0..=10.0).contains(&c), "position {c} out of range");
        }
        assert!((0.0..1.0).contains(&t.scale.x));
        assert_eq!(t.scale.x, t.scale.y);
        assert_eq!(t.scale.x, t.scale.z);
        assert_eq!(t.rotation.z.0, 0.0);
    }
}

#[test]
fn text_meshes_keep_identity_transforms() {
    let (_, scene) = populated();
    for id in scene.texts() {
        assert_eq!(scene.mesh(*id).unwrap().transform, Instance::new());
    }
}

#[test]
fn text_is_centred_before_its_offset_is_applied() {
    let font = fixture_font();
    let config = ShowcaseConfig::default();
    for line in &config.lines {
        let geometry = text_line_geometry(&font, line, &config.text).unwrap();
        let centre = geometry.bounding_box().unwrap().center();
        let offset = Vector3::from(line.offset);
        assert!(
            (centre - offset).x.abs() < 1e-4
                && (centre - offset).y.abs() < 1e-4
                && (centre - offset).z.abs() < 1e-4,
            "{:?} centred at {centre:?}",
            line.text
        );
    }
}

#[test]
fn title_is_taller_than_subtitles() {
    let (showcase, scene) = populated();
    let texts = &showcase.populated().unwrap().texts;
    let heights: Vec<f32> = texts
        .iter()
        .map(|g| scene.geometry(*g).bounding_box().unwrap().size().y)
        .collect();
    assert!(heights[0] > heights[1]);
    assert!((heights[1] - heights[2]).abs() < 1e-4);
}

#[test]
fn second_font_arrival_is_ignored() {
    let (mut showcase, mut scene) = populated();
    let before = scene.nodes().len();
    let again = showcase.on_font_loaded(&mut scene, &fixture_font()).unwrap();
    assert!(!again);
    assert_eq!(scene.nodes().len(), before);
}

#[test]
fn broken_font_leaves_the_scene_untouched() {
    let (mut showcase, mut scene) = bootstrapped();
    let result = showcase.on_font_loaded(&mut scene, &broken_font());
    assert!(result.is_err());
    assert_eq!(scene.nodes().len(), 1);
    assert!(scene.geometries().is_empty());
    assert!(scene.materials().is_empty());
    assert!(showcase.populated().is_none());
}

#[test]
fn same_seed_gives_the_same_scene() {
    let build = || {
        let mut showcase = Showcase::new(ShowcaseConfig::default(), seeded_rng());
        let mut scene = Scene::default();
        showcase.bootstrap(&mut scene);
        showcase.on_font_loaded(&mut scene, &fixture_font()).unwrap();
        scene
    };
    let (a, b) = (build(), build());
    for (x, y) in a.items().iter().zip(b.items()) {
        assert_eq!(a.mesh(*x).unwrap().transform, b.mesh(*y).unwrap().transform);
    }
}

#[test]
fn meshes_batch_by_geometry_and_material() {
    let (_, scene) = populated();
    let plans = plan_batches(&scene);
    // one batch per text line plus one per primitive kind
    assert_eq!(plans.len(), 6);
    let sizes: Vec<usize> = plans.iter().map(|p| p.members.len()).collect();
    assert_eq!(sizes, vec![1, 1, 1, 150, 150, 150]);
    let total: usize = sizes.iter().sum();
    assert_eq!(total, scene.mesh_count());
}

#[test]
fn registries_partition_the_meshes() {
    let (_, mut scene) = populated();
    let mut touched = 0;
    scene.for_each_in(Registry::Items, |_| touched += 1);
    scene.for_each_in(Registry::Texts, |_| touched += 1);
    assert_eq!(touched, scene.mesh_count());
}

#[test]
fn smaller_populations_follow_the_config() {
    let config = ShowcaseConfig {
        items_per_kind: 4,
        ..Default::default()
    };
    let mut showcase = Showcase::new(config, seeded_rng());
    let mut scene = Scene::default();
    showcase.bootstrap(&mut scene);
    let font: Font = fixture_font();
    showcase.on_font_loaded(&mut scene, &font).unwrap();
    assert_eq!(scene.items().len(), 12);
    assert_eq!(scene.texts().len(), 3);
}
