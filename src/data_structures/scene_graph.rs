//! Scene graph: the single root container of everything that gets drawn.
//!
//! Geometries and materials are owned by arenas inside the [`Scene`] and are
//! referenced from meshes by handle, so one torus geometry can back hundreds
//! of independently transformed meshes. Nodes are only ever appended; the
//! scene has no removal path.

use crate::data_structures::{instance::Instance, model::Geometry};

/// Index of a geometry in [`Scene::geometries`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryHandle(pub(crate) usize);

/// Index of a material in [`Scene::materials`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub(crate) usize);

/// Index of a node in [`Scene::nodes`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Shading parameters. Every material in the showcase colours fragments by
/// their view-space normal; they only differ in whether triangles are
/// filled or drawn as edges.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub wireframe: bool,
}

impl Material {
    pub fn normal(name: &str) -> Self {
        Self {
            name: name.to_string(),
            wireframe: false,
        }
    }

    pub fn normal_wireframe(name: &str) -> Self {
        Self {
            name: name.to_string(),
            wireframe: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub transform: Instance,
}

/// What a node in the scene is. The camera itself lives in the engine
/// context; its node only records that it is part of the graph.
#[derive(Clone, Debug)]
pub enum Node {
    Camera,
    Mesh(Mesh),
}

/// Which registry a mesh is tracked in, see [`Scene::items`] and [`Scene::texts`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Registry {
    Items,
    Texts,
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub background: wgpu::Color,
    nodes: Vec<Node>,
    geometries: Vec<Geometry>,
    materials: Vec<Material>,
    items: Vec<NodeId>,
    texts: Vec<NodeId>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(wgpu::Color::BLACK)
    }
}

impl Scene {
    pub fn new(background: wgpu::Color) -> Self {
        Self {
            background,
            nodes: Vec::new(),
            geometries: Vec::new(),
            materials: Vec::new(),
            items: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn add_camera(&mut self) -> NodeId {
        self.push_node(Node::Camera)
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
        self.geometries.push(geometry);
        GeometryHandle(self.geometries.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle(self.materials.len() - 1)
    }

    /// Append a mesh node and track it in `registry`.
    pub fn add_mesh(&mut self, mesh: Mesh, registry: Registry) -> NodeId {
        let id = self.push_node(Node::Mesh(mesh));
        match registry {
            Registry::Items => self.items.push(id),
            Registry::Texts => self.texts.push(id),
        }
        id
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn geometry(&self, handle: GeometryHandle) -> &Geometry {
        &self.geometries[handle.0]
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn material(&self, handle: MaterialHandle) -> &Material {
        &self.materials[handle.0]
    }

    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    pub fn texts(&self) -> &[NodeId] {
        &self.texts
    }

    pub fn mesh(&self, id: NodeId) -> Option<&Mesh> {
        match self.nodes.get(id.0) {
            Some(Node::Mesh(mesh)) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut Mesh> {
        match self.nodes.get_mut(id.0) {
            Some(Node::Mesh(mesh)) => Some(mesh),
            _ => None,
        }
    }

    pub fn meshes(&self) -> impl Iterator<Item = (NodeId, &Mesh)> {
        self.nodes.iter().enumerate().filter_map(|(idx, node)| match node {
            Node::Mesh(mesh) => Some((NodeId(idx), mesh)),
            Node::Camera => None,
        })
    }

    pub fn camera_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Camera))
            .count()
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes.len() - self.camera_count()
    }

    /// Apply `f` to the transform of every mesh in `registry`.
    pub fn for_each_in(&mut self, registry: Registry, mut f: impl FnMut(&mut Instance)) {
        let ids = match registry {
            Registry::Items => &self.items,
            Registry::Texts => &self.texts,
        };
        for id in ids {
            if let Some(Node::Mesh(mesh)) = self.nodes.get_mut(id.0) {
                f(&mut mesh.transform);
            }
        }
    }
}
