//! Vertex layout and geometry buffers.
//!
//! [`Geometry`] is the CPU-side shape produced by the generators in
//! [`crate::geometry`]: a vertex list plus a triangle index list. A geometry is
//! uploaded once as a [`GpuGeometry`] and then drawn for every instance that
//! references it.

use std::ops::Range;

use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Axis aligned bounds of a geometry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl BoundingBox {
    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// Triangle soup or indexed mesh with per-vertex normals.
///
/// Indices are always present; non-indexed generators simply emit
/// `0..vertices.len()`.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub label: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn push_vertex(&mut self, position: Vector3<f32>, normal: Vector3<f32>) -> u32 {
        let idx = self.vertices.len() as u32;
        self.vertices.push(ModelVertex {
            position: position.into(),
            normal: normal.into(),
        });
        idx
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Append an unindexed triangle with a flat face normal.
    ///
    /// The winding is flipped when needed so that the face normal points into
    /// the half-space of `outward`.
    pub fn push_oriented_triangle(
        &mut self,
        a: Vector3<f32>,
        b: Vector3<f32>,
        c: Vector3<f32>,
        outward: Vector3<f32>,
    ) {
        let cross = (b - a).cross(c - a);
        if cross.magnitude2() <= f32::EPSILON * f32::EPSILON {
            // degenerate, nothing visible to draw
            return;
        }
        let (b, c, cross) = if cross.dot(outward) < 0.0 {
            (c, b, -cross)
        } else {
            (b, c, cross)
        };
        let normal = cross.normalize();
        let ia = self.push_vertex(a, normal);
        let ib = self.push_vertex(b, normal);
        let ic = self.push_vertex(c, normal);
        self.push_triangle(ia, ib, ic);
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut vertices = self.vertices.iter().map(|v| Vector3::from(v.position));
        let first = vertices.next()?;
        let (min, max) = vertices.fold((first, first), |(min, max), p| {
            (
                Vector3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                Vector3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
            )
        });
        Some(BoundingBox { min, max })
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        for vertex in &mut self.vertices {
            vertex.position = (Vector3::from(vertex.position) + offset).into();
        }
    }

    /// Move the geometry so its bounding box is centred on the local origin.
    ///
    /// Returns the translation that was applied.
    pub fn center(&mut self) -> Vector3<f32> {
        let offset = match self.bounding_box() {
            Some(bounds) => -bounds.center(),
            None => Vector3::new(0.0, 0.0, 0.0),
        };
        self.translate(offset);
        offset
    }

    /// Line-list indices drawing every triangle edge.
    pub fn wireframe_indices(&self) -> Vec<u32> {
        self.indices
            .chunks_exact(3)
            .flat_map(|t| [t[0], t[1], t[1], t[2], t[2], t[0]])
            .collect()
    }
}

/// A geometry uploaded to the GPU, shared by every instance drawing it.
#[derive(Debug)]
pub struct GpuGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub wire_index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub num_wire_indices: u32,
}

impl GpuGeometry {
    pub fn new(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", geometry.label)),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", geometry.label)),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let wire_indices = geometry.wireframe_indices();
        let wire_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Wireframe Index Buffer", geometry.label)),
            contents: bytemuck::cast_slice(&wire_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            wire_index_buffer,
            num_indices: geometry.indices.len() as u32,
            num_wire_indices: wire_indices.len() as u32,
        }
    }
}

pub trait DrawGeometry {
    fn draw_geometry_instanced(
        &mut self,
        geometry: &GpuGeometry,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
    );

    fn draw_wireframe_instanced(
        &mut self,
        geometry: &GpuGeometry,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
    );
}

impl DrawGeometry for wgpu::RenderPass<'_> {
    fn draw_geometry_instanced(
        &mut self,
        geometry: &GpuGeometry,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        self.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, camera_bind_group, &[]);
        self.draw_indexed(0..geometry.num_indices, 0, instances);
    }

    fn draw_wireframe_instanced(
        &mut self,
        geometry: &GpuGeometry,
        instances: Range<u32>,
        camera_bind_group: &wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        self.set_index_buffer(
            geometry.wire_index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );
        self.set_bind_group(0, camera_bind_group, &[]);
        self.draw_indexed(0..geometry.num_wire_indices, 0, instances);
    }
}
