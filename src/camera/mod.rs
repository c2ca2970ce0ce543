//! Camera types and their GPU uniform.
//!
//! [`Camera`] holds the eye position and the point it looks at, [`Projection`]
//! the perspective parameters. Both are combined into a [`CameraUniform`]
//! every frame. The [`orbit::OrbitControls`] move the camera around its
//! target in response to pointer input.

pub mod orbit;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use wgpu::util::DeviceExt;

pub use orbit::OrbitControls;

/// Maps OpenGL clip space (z in [-1, 1]) to wgpu clip space (z in [0, 1]).
fn opengl_to_wgpu_matrix() -> Matrix4<f32> {
    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.0,
        0.0, 0.0, 0.5, 1.0,
    );
    m
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P) -> Self {
        Self {
            position: position.into(),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::unit_y(),
        }
    }

    pub fn look_at<P: Into<Point3<f32>>>(&mut self, target: P) {
        self.target = target.into();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    /// Unit vectors of the camera's local X (right) and Y (up) axes in world space.
    pub fn right_and_up(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = self.target - self.position;
        if forward.magnitude2() == 0.0 {
            return (Vector3::unit_x(), Vector3::unit_y());
        }
        let forward = forward.normalize();
        let right = forward.cross(self.up);
        let right = if right.magnitude2() > 0.0 {
            right.normalize()
        } else {
            Vector3::unit_x()
        };
        (right, right.cross(forward))
    }
}

/// Perspective projection with a cached matrix.
///
/// The matrix is only recomputed by [`Projection::update_projection_matrix`],
/// which every setter calls.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
    matrix: Matrix4<f32>,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let mut projection = Self {
            aspect: aspect_of(width as f32, height as f32),
            fovy: fovy.into(),
            znear,
            zfar,
            matrix: Matrix4::from_scale(1.0),
        };
        projection.update_projection_matrix();
        projection
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.set_aspect(aspect_of(width as f32, height as f32));
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn update_projection_matrix(&mut self) {
        self.matrix = opengl_to_wgpu_matrix() * perspective(self.fovy, self.aspect, self.znear, self.zfar);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        self.matrix
    }
}

fn aspect_of(width: f32, height: f32) -> f32 {
    if height > 0.0 { width / height } else { 1.0 }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    // normals are shaded in view space
    view: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_proj: Matrix4::identity().into(),
            view: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        let view = camera.view_matrix();
        self.view = view.into();
        self.view_proj = (projection.matrix() * view).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitControls,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(
        device: &wgpu::Device,
        camera: Camera,
        controller: OrbitControls,
        projection: &Projection,
    ) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            controller,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Recompute the uniform and push it to the GPU.
    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue, projection: &Projection) {
        self.uniform.update_view_proj(&self.camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Transform, Vector4};

    #[test]
    fn projection_tracks_aspect() {
        let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 100.0);
        let before = projection.matrix();
        projection.resize(1600, 600);
        assert!((projection.aspect() - 1600.0 / 600.0).abs() < 1e-6);
        assert_ne!(before, projection.matrix());
    }

    #[test]
    fn near_and_far_planes_map_to_wgpu_depth_range() {
        let projection = Projection::new(1, 1, Deg(75.0), 0.1, 100.0);
        let near = projection.matrix() * Vector4::new(0.0, 0.0, -0.1, 1.0);
        let far = projection.matrix() * Vector4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn view_matrix_looks_at_target() {
        let camera = Camera::new((1.0, 1.0, 2.0));
        let target = camera.view_matrix().transform_point(Point3::new(0.0, 0.0, 0.0));
        assert!(target.x.abs() < 1e-5 && target.y.abs() < 1e-5);
        assert!(target.z < 0.0);
    }

    #[test]
    fn camera_axes_are_orthonormal() {
        let camera = Camera::new((1.0, 1.0, 2.0));
        let (right, up) = camera.right_and_up();
        assert!(right.dot(up).abs() < 1e-6);
        assert!((right.magnitude() - 1.0).abs() < 1e-6);
        assert!((up.magnitude() - 1.0).abs() < 1e-6);
        assert!(up.y > 0.0);
    }
}
