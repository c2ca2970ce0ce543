//! Damped orbit controls.
//!
//! The camera circles a target point. Pointer input does not move the
//! camera directly; it accumulates rotation, zoom and pan deltas which
//! [`OrbitControls::update`] applies a fraction of (the damping factor) every
//! frame, decaying the remainder. This gives the camera inertia after the
//! user lets go.
//!
//! - left drag: rotate around the target
//! - middle drag / wheel: dolly in and out
//! - right drag: pan the target in screen space

use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3, Vector2, Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use super::{Camera, Projection};

const EPS: f32 = 1e-6;

/// Polar coordinates of the camera offset from the target.
///
/// `theta` is measured around +Y starting at +Z, `phi` down from +Y.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            // acos loses small angles to rounding near the poles
            phi: (offset.x * offset.x + offset.z * offset.z).sqrt().atan2(offset.y),
        }
    }

    pub fn to_offset(self) -> Vector3<f32> {
        let sin_phi = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi * self.theta.cos(),
        )
    }

    /// Keep `phi` away from the poles where the view basis degenerates.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(EPS, PI - EPS);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Drag {
    None,
    Rotate,
    Dolly,
    Pan,
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vector3<f32>,
    // screen-space pan waiting for the camera basis in `update`
    pending_pan: Vector2<f32>,

    drag: Drag,
    cursor: Option<PhysicalPosition<f64>>,
    viewport_height: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Point3::new(0.0, 0.0, 0.0),
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical_delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vector3::zero(),
            pending_pan: Vector2::zero(),
            drag: Drag::None,
            cursor: None,
            viewport_height: 1.0,
        }
    }
}

impl OrbitControls {
    pub fn new(viewport_height: u32) -> Self {
        Self {
            viewport_height: viewport_height.max(1) as f32,
            ..Default::default()
        }
    }

    pub fn with_damping(mut self, factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = factor;
        self
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    pub fn dolly_in(&mut self, scale: f32) {
        self.scale *= scale;
    }

    pub fn dolly_out(&mut self, scale: f32) {
        self.scale /= scale;
    }

    /// Queue a pan by a screen-space delta in pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pending_pan += Vector2::new(dx, dy);
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// True while any accumulated motion is still being applied.
    pub fn is_settling(&self) -> bool {
        self.spherical_delta.theta.abs() > EPS
            || self.spherical_delta.phi.abs() > EPS
            || self.pan_offset.magnitude2() > EPS * EPS
            || (self.scale - 1.0).abs() > EPS
            || self.pending_pan != Vector2::zero()
    }

    /// Feed a window event. Returns true if the event was used.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::Resized(size) => {
                self.set_viewport_height(size.height);
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let drag = match button {
                    MouseButton::Left => Drag::Rotate,
                    MouseButton::Middle => Drag::Dolly,
                    MouseButton::Right => Drag::Pan,
                    _ => return false,
                };
                match state {
                    ElementState::Pressed => self.drag = drag,
                    ElementState::Released if self.drag == drag => self.drag = Drag::None,
                    ElementState::Released => {}
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let last = self.cursor.replace(*position);
                let Some(last) = last else {
                    return false;
                };
                let dx = (position.x - last.x) as f32;
                let dy = (position.y - last.y) as f32;
                match self.drag {
                    Drag::None => return false,
                    Drag::Rotate => {
                        let h = self.viewport_height;
                        self.rotate_left(2.0 * PI * dx * self.rotate_speed / h);
                        self.rotate_up(2.0 * PI * dy * self.rotate_speed / h);
                    }
                    Drag::Dolly => {
                        if dy > 0.0 {
                            self.dolly_out(self.zoom_scale());
                        } else if dy < 0.0 {
                            self.dolly_in(self.zoom_scale());
                        }
                    }
                    Drag::Pan => self.pan(dx * self.pan_speed, dy * self.pan_speed),
                }
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = Drag::None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                };
                // wheel away from the user zooms in
                if y > 0.0 {
                    self.dolly_in(self.zoom_scale());
                } else if y < 0.0 {
                    self.dolly_out(self.zoom_scale());
                }
                y != 0.0
            }
            _ => false,
        }
    }

    /// Apply one step of the accumulated motion to `camera`.
    ///
    /// Must be called once per frame when damping is enabled. Returns true if
    /// the camera moved.
    pub fn update(&mut self, camera: &mut Camera, projection: &Projection) -> bool {
        let before = (camera.position, self.target);

        if self.pending_pan != Vector2::zero() {
            let distance = (camera.position - self.target).magnitude()
                * (projection.fovy().0 / 2.0).tan();
            let (right, up) = camera.right_and_up();
            let h = self.viewport_height;
            self.pan_offset += right * (-2.0 * self.pending_pan.x * distance / h);
            self.pan_offset += up * (2.0 * self.pending_pan.y * distance / h);
            self.pending_pan = Vector2::zero();
        }

        let mut spherical = Spherical::from_offset(camera.position - self.target);
        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        spherical.theta += self.spherical_delta.theta * step;
        spherical.phi += self.spherical_delta.phi * step;
        spherical.phi = spherical
            .phi
            .clamp(self.min_polar_angle, self.max_polar_angle);
        spherical.make_safe();
        spherical.radius = (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.target += self.pan_offset * step;
        camera.position = self.target + spherical.to_offset();
        camera.target = self.target;

        if self.enable_damping {
            self.spherical_delta.theta *= 1.0 - self.damping_factor;
            self.spherical_delta.phi *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;

        (camera.position - before.0).magnitude2() > EPS || (self.target - before.1).magnitude2() > EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;
    use winit::dpi::PhysicalSize;

    fn setup() -> (Camera, Projection, OrbitControls) {
        let camera = Camera::new((1.0, 1.0, 2.0));
        let projection = Projection::new(800, 600, Deg(75.0), 0.1, 100.0);
        (camera, projection, OrbitControls::new(600).with_damping(0.05))
    }

    #[test]
    fn spherical_round_trips_offset() {
        let offset = Vector3::new(1.0, 1.0, 2.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!((back - offset).magnitude() < 1e-5);
    }

    #[test]
    fn polar_angle_survives_round_trip_near_the_pole() {
        let mut near_pole = Spherical {
            radius: 2.449,
            theta: 0.46,
            phi: 0.0,
        };
        near_pole.make_safe();
        let back = Spherical::from_offset(near_pole.to_offset());
        assert!(back.phi > 0.0);
        assert!((back.phi - near_pole.phi).abs() < 1e-7);

        let mut south = Spherical { phi: PI, ..near_pole };
        south.make_safe();
        assert!(Spherical::from_offset(south.to_offset()).phi < PI);
    }

    #[test]
    fn idle_update_keeps_camera_in_place() {
        let (mut camera, projection, mut controls) = setup();
        let start = camera.position;
        assert!(!controls.update(&mut camera, &projection));
        assert!((camera.position - start).magnitude() < 1e-5);
    }

    #[test]
    fn rotation_is_applied_gradually() {
        let (mut camera, projection, mut controls) = setup();
        let radius = (camera.position - controls.target).magnitude();
        let theta0 = Spherical::from_offset(camera.position - controls.target).theta;

        controls.rotate_left(1.0);
        controls.update(&mut camera, &projection);
        let theta1 = Spherical::from_offset(camera.position - controls.target).theta;
        assert!((theta0 - theta1 - 0.05).abs() < 1e-4);

        for _ in 0..500 {
            controls.update(&mut camera, &projection);
        }
        let theta_n = Spherical::from_offset(camera.position - controls.target).theta;
        // geometric series converges to the full angle
        assert!((theta0 - theta_n - 1.0).abs() < 1e-3);
        assert!(!controls.is_settling());
        assert!(((camera.position - controls.target).magnitude() - radius).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_never_reaches_the_pole() {
        let (mut camera, projection, mut controls) = setup();
        controls.enable_damping = false;
        controls.rotate_up(10.0);
        controls.update(&mut camera, &projection);
        let phi = Spherical::from_offset(camera.position - controls.target).phi;
        assert!(phi > 0.0);
        assert!(camera.position.y > 0.0);
    }

    #[test]
    fn wheel_dollies_towards_target() {
        let (mut camera, projection, mut controls) = setup();
        let before = (camera.position - controls.target).magnitude();
        let used = controls.handle_window_events(&WindowEvent::MouseWheel {
            device_id: unsafe { winit::event::DeviceId::dummy() },
            delta: MouseScrollDelta::LineDelta(0.0, 1.0),
            phase: winit::event::TouchPhase::Moved,
        });
        assert!(used);
        controls.update(&mut camera, &projection);
        let after = (camera.position - controls.target).magnitude();
        assert!((after - before * 0.95).abs() < 1e-4);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let (mut camera, projection, mut controls) = setup();
        controls.enable_damping = false;
        let offset_before = camera.position - controls.target;
        controls.pan(100.0, 0.0);
        assert!(controls.update(&mut camera, &projection));
        assert!(controls.target.x < 0.0);
        let offset_after = camera.position - controls.target;
        assert!((offset_after - offset_before).magnitude() < 1e-4);
    }

    #[test]
    fn resize_updates_rotation_sensitivity() {
        let mut controls = OrbitControls::default();
        controls.handle_window_events(&WindowEvent::Resized(PhysicalSize::new(800, 300)));
        assert_eq!(controls.viewport_height, 300.0);
    }
}
