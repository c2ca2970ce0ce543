use cgmath::{Deg, InnerSpace, Point3};
use floating_showcase::camera::{Camera, OrbitControls, Projection, orbit::Spherical};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceId, ElementState, MouseButton, WindowEvent},
};

fn device() -> DeviceId {
    unsafe { DeviceId::dummy() }
}

fn press(button: MouseButton) -> WindowEvent {
    WindowEvent::MouseInput {
        device_id: device(),
        state: ElementState::Pressed,
        button,
    }
}

fn release(button: MouseButton) -> WindowEvent {
    WindowEvent::MouseInput {
        device_id: device(),
        state: ElementState::Released,
        button,
    }
}

fn cursor(x: f64, y: f64) -> WindowEvent {
    WindowEvent::CursorMoved {
        device_id: device(),
        position: PhysicalPosition::new(x, y),
    }
}

fn setup() -> (Camera, Projection, OrbitControls) {
    let mut camera = Camera::new((1.0, 1.0, 2.0));
    camera.look_at(Point3::new(0.0, 0.0, 0.0));
    let projection = Projection::new(800, 600, Deg(75.0), 0.1, 100.0);
    (camera, projection, OrbitControls::new(600).with_damping(0.05))
}

fn drag(controls: &mut OrbitControls, button: MouseButton, from: (f64, f64), to: (f64, f64)) {
    controls.handle_window_events(&cursor(from.0, from.1));
    controls.handle_window_events(&press(button));
    controls.handle_window_events(&cursor(to.0, to.1));
    controls.handle_window_events(&release(button));
}

#[test]
fn camera_keeps_gliding_after_release() {
    let (mut camera, projection, mut controls) = setup();
    drag(&mut controls, MouseButton::Left, (400.0, 300.0), (460.0, 300.0));

    let mut steps = Vec::new();
    for _ in 0..5 {
        let before = camera.position;
        assert!(controls.update(&mut camera, &projection));
        steps.push((camera.position - before).magnitude());
    }
    // each frame moves less than the previous one
    for pair in steps.windows(2) {
        assert!(pair[1] < pair[0]);
    }
    assert!(controls.is_settling());
}

#[test]
fn camera_eventually_settles() {
    let (mut camera, projection, mut controls) = setup();
    drag(&mut controls, MouseButton::Left, (400.0, 300.0), (300.0, 250.0));

    for _ in 0..1000 {
        controls.update(&mut camera, &projection);
    }
    assert!(!controls.is_settling());
    let before = camera.position;
    assert!(!controls.update(&mut camera, &projection));
    assert!((camera.position - before).magnitude() < 1e-5);
}

#[test]
fn orbit_keeps_distance_and_target() {
    let (mut camera, projection, mut controls) = setup();
    let radius = (camera.position - controls.target).magnitude();
    drag(&mut controls, MouseButton::Left, (100.0, 100.0), (250.0, 180.0));

    for _ in 0..200 {
        controls.update(&mut camera, &projection);
        let now = (camera.position - controls.target).magnitude();
        assert!((now - radius).abs() < 1e-4);
    }
    assert_eq!(controls.target, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(camera.target, controls.target);
}

#[test]
fn horizontal_drag_turns_around_the_vertical_axis() {
    let (mut camera, projection, mut controls) = setup();
    let start = Spherical::from_offset(camera.position - controls.target);
    drag(&mut controls, MouseButton::Left, (400.0, 300.0), (500.0, 300.0));

    for _ in 0..1000 {
        controls.update(&mut camera, &projection);
    }

    let end = Spherical::from_offset(camera.position - controls.target);
    let expected = 2.0 * std::f32::consts::PI * 100.0 / 600.0;
    assert!((start.theta - end.theta - expected).abs() < 1e-3);
    assert!((start.phi - end.phi).abs() < 1e-4);
}

#[test]
fn moving_without_a_button_does_nothing() {
    let (mut camera, projection, mut controls) = setup();
    controls.handle_window_events(&cursor(10.0, 10.0));
    let used = controls.handle_window_events(&cursor(200.0, 200.0));
    assert!(!used);
    assert!(!controls.update(&mut camera, &projection));
}

#[test]
fn right_drag_pans_the_target() {
    let (mut camera, projection, mut controls) = setup();
    drag(&mut controls, MouseButton::Right, (400.0, 300.0), (400.0, 350.0));

    for _ in 0..1000 {
        controls.update(&mut camera, &projection);
    }
    // dragging down moves the scene down, so the target goes up
    assert!(controls.target.y > 0.0);
    assert_eq!(camera.target, controls.target);
}
