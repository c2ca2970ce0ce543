use cgmath::Rad;
use instant::Instant;

use crate::{
    data_structures::scene_graph::{Registry, Scene},
    showcase::config::AnimationSteps,
};

/// Stopwatch that starts on its first read.
#[derive(Copy, Clone, Debug, Default)]
pub struct Clock {
    start: Option<Instant>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.start.is_some()
    }

    /// Seconds since the first call. The first call returns (almost) zero.
    pub fn elapsed(&mut self) -> f64 {
        self.start
            .get_or_insert_with(Instant::now)
            .elapsed()
            .as_secs_f64()
    }
}

/// Advance the scene by one frame at `elapsed` seconds.
///
/// Items spin about x and y and drift in the xz plane along the direction
/// `(sin t, cos t)`. Text only turns about y.
///
/// `elapsed` stays in double precision; only the per-frame drift is narrowed.
pub fn advance(scene: &mut Scene, elapsed: f64, steps: &AnimationSteps) {
    let divisor = f64::from(steps.drift_divisor);
    let drift_x = (elapsed.sin() / divisor) as f32;
    let drift_z = (elapsed.cos() / divisor) as f32;
    scene.for_each_in(Registry::Items, |t| {
        t.rotation.x += Rad(steps.item_rotation);
        t.rotation.y += Rad(steps.item_rotation);
        t.position.x += drift_x;
        t.position.z += drift_z;
    });
    scene.for_each_in(Registry::Texts, |t| {
        t.rotation.y += Rad(steps.text_rotation);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::{
        instance::Instance,
        model::Geometry,
        scene_graph::{Material, Mesh},
    };

    #[test]
    fn clock_starts_lazily() {
        let mut clock = Clock::new();
        assert!(!clock.is_running());
        let first = clock.elapsed();
        assert!(clock.is_running());
        assert!(first < 1.0);
        assert!(clock.elapsed() >= first);
    }

    fn single_item_scene() -> Scene {
        let mut scene = Scene::default();
        let geometry = scene.add_geometry(Geometry::new("g"));
        let material = scene.add_material(Material::normal("m"));
        scene.add_mesh(
            Mesh {
                geometry,
                material,
                transform: Instance::new(),
            },
            Registry::Items,
        );
        scene
    }

    #[test]
    fn drift_direction_resolves_late_times() {
        // f32 seconds are 0.0625 apart here
        let late = 1_048_576.0_f64;
        let steps = AnimationSteps::default();
        let mut a = single_item_scene();
        let mut b = single_item_scene();
        advance(&mut a, late, &steps);
        advance(&mut b, late + 0.01, &steps);
        let pa = a.mesh(a.items()[0]).unwrap().transform.position;
        let pb = b.mesh(b.items()[0]).unwrap().transform.position;
        assert!(pa.x != pb.x || pa.z != pb.z);
        assert_eq!(pa.x, (late.sin() / 200.0) as f32);
        assert_eq!(pa.z, (late.cos() / 200.0) as f32);
    }

    #[test]
    fn empty_scene_is_a_no_op() {
        let mut scene = Scene::default();
        scene.add_camera();
        advance(&mut scene, 1.0, &AnimationSteps::default());
        assert_eq!(scene.mesh_count(), 0);
    }
}
