//! GPU-side mirror of a [`Scene`].
//!
//! Every geometry in the scene is uploaded once. Meshes are then grouped by
//! (geometry, material) into [`InstanceBatch`]es; each batch owns one instance
//! buffer that is rewritten from the mesh transforms every frame and drawn
//! with a single instanced call.

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::GpuGeometry,
        scene_graph::{GeometryHandle, MaterialHandle, NodeId, Scene},
    },
    render::Render,
};

/// Which meshes end up in which batch, independent of any GPU state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchPlan {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub members: Vec<NodeId>,
}

/// Group the scene's meshes by (geometry, material) in order of first appearance.
pub fn plan_batches(scene: &Scene) -> Vec<BatchPlan> {
    let mut plans: Vec<BatchPlan> = Vec::new();
    for (id, mesh) in scene.meshes() {
        match plans
            .iter_mut()
            .find(|p| p.geometry == mesh.geometry && p.material == mesh.material)
        {
            Some(plan) => plan.members.push(id),
            None => plans.push(BatchPlan {
                geometry: mesh.geometry,
                material: mesh.material,
                members: vec![id],
            }),
        }
    }
    plans
}

#[derive(Debug)]
pub struct InstanceBatch {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub wireframe: bool,
    members: Vec<NodeId>,
    raws: Vec<InstanceRaw>,
    pub instance_buffer: wgpu::Buffer,
}

impl InstanceBatch {
    fn new(device: &wgpu::Device, scene: &Scene, plan: BatchPlan) -> Self {
        let raws = collect_raws(scene, &plan.members);
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!(
                "{} Instance Buffer",
                scene.geometry(plan.geometry).label
            )),
            contents: bytemuck::cast_slice(&raws),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            geometry: plan.geometry,
            material: plan.material,
            wireframe: scene.material(plan.material).wireframe,
            members: plan.members,
            raws,
            instance_buffer,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Refresh the instance data from the scene and push it to the GPU.
    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue, scene: &Scene) {
        self.raws = collect_raws(scene, &self.members);
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.raws));
    }
}

fn collect_raws(scene: &Scene, members: &[NodeId]) -> Vec<InstanceRaw> {
    members
        .iter()
        .filter_map(|id| scene.mesh(*id))
        .map(|mesh| mesh.transform.to_raw())
        .collect()
}

/// Uploaded geometries and instance batches for one scene.
#[derive(Debug, Default)]
pub struct GpuScene {
    geometries: Vec<GpuGeometry>,
    batches: Vec<InstanceBatch>,
}

impl GpuScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload new geometries and rebuild the batches.
    ///
    /// Geometries already uploaded are kept; the scene only ever grows.
    pub fn sync_structure(&mut self, device: &wgpu::Device, scene: &Scene) {
        for geometry in &scene.geometries()[self.geometries.len()..] {
            log::debug!(
                "uploading geometry {} ({} triangles)",
                geometry.label,
                geometry.triangle_count()
            );
            self.geometries.push(GpuGeometry::new(device, geometry));
        }
        self.batches = plan_batches(scene)
            .into_iter()
            .map(|plan| InstanceBatch::new(device, scene, plan))
            .collect();
        log::info!(
            "{} geometries in {} instance batches",
            self.geometries.len(),
            self.batches.len()
        );
    }

    /// Rewrite every batch's instance buffer from the current transforms.
    pub fn write_instances(&mut self, queue: &wgpu::Queue, scene: &Scene) {
        for batch in &mut self.batches {
            batch.write_to_buffer(queue, scene);
        }
    }

    pub fn render(&self) -> Render<'_> {
        Render::Composed(
            self.batches
                .iter()
                .filter_map(|batch| {
                    let geometry = self.geometries.get(batch.geometry.0)?;
                    Some(Render::from_batch(batch, geometry))
                })
                .collect(),
        )
    }
}
