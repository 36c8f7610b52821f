//! CPU-side model data: meshes, materials and the node tree of a loaded object.
//!
//! Loaders produce these types without touching the GPU so that normalization, layout
//! and framing can run (and be tested) before anything is uploaded.

use std::sync::Arc;

use cgmath::{InnerSpace, Point3, Vector3};

use crate::data_structures::{bounds::Aabb, instance::Instance};

/// Describes how a vertex type is laid out in a vertex buffer.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
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
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// A decoded RGBA8 image, shared between all materials that reference it.
#[derive(Debug)]
pub struct TextureData {
    pub label: String,
    pub image: image::RgbaImage,
}

/// Which faces of a mesh are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// A material as it was described in the source file.
#[derive(Clone, Debug)]
pub struct SourceMaterial {
    pub name: String,
    /// Linear RGBA; `None` when the file does not specify one.
    pub base_colour: Option<[f32; 4]>,
    pub colour_map: Option<Arc<TextureData>>,
    pub metalness: Option<f32>,
    pub roughness: Option<f32>,
    pub side: Side,
}

/// The single physically based material type every loaded mesh is converted to.
#[derive(Clone, Debug)]
pub struct StandardMaterial {
    pub name: String,
    pub base_colour: [f32; 4],
    pub colour_map: Option<Arc<TextureData>>,
    pub metalness: f32,
    pub roughness: f32,
    pub side: Side,
}

impl StandardMaterial {
    pub const DEFAULT_BASE_COLOUR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    /// White, untextured and double sided.
    pub fn new(name: impl Into<String>, metalness: f32, roughness: f32) -> Self {
        Self {
            name: name.into(),
            base_colour: Self::DEFAULT_BASE_COLOUR,
            colour_map: None,
            metalness,
            roughness,
            side: Side::Double,
        }
    }

    /// Reapplies the live metalness/roughness parameters.
    pub fn apply_params(&mut self, metalness: f32, roughness: f32) {
        self.metalness = metalness;
        self.roughness = roughness;
    }
}

#[derive(Clone, Debug)]
pub enum Material {
    Source(SourceMaterial),
    Standard(StandardMaterial),
}

impl Material {
    pub fn name(&self) -> &str {
        match self {
            Material::Source(m) => &m.name,
            Material::Standard(m) => &m.name,
        }
    }

    pub fn base_colour(&self) -> Option<[f32; 4]> {
        match self {
            Material::Source(m) => m.base_colour,
            Material::Standard(m) => Some(m.base_colour),
        }
    }

    pub fn colour_map(&self) -> Option<&Arc<TextureData>> {
        match self {
            Material::Source(m) => m.colour_map.as_ref(),
            Material::Standard(m) => m.colour_map.as_ref(),
        }
    }

    pub fn as_standard(&self) -> Option<&StandardMaterial> {
        match self {
            Material::Standard(m) => Some(m),
            Material::Source(_) => None,
        }
    }
}

/// Triangle geometry with an optional material.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    pub material: Option<Material>,
}

impl MeshData {
    /// Bounds of the vertex positions in mesh space.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().map(|&p| Point3::from(p)))
    }

    /// Interleaves the attribute streams. Missing uvs default to zero, missing normals are
    /// computed from the triangles.
    pub fn vertices(&self) -> Vec<ModelVertex> {
        let computed;
        let normals = if self.normals.len() == self.positions.len() {
            &self.normals
        } else {
            computed = self.smooth_normals();
            &computed
        };
        self.positions
            .iter()
            .zip(normals)
            .enumerate()
            .map(|(i, (&position, &normal))| ModelVertex {
                position,
                tex_coords: self.tex_coords.get(i).copied().unwrap_or_default(),
                normal,
            })
            .collect()
    }

    /// Area weighted vertex normals.
    pub fn smooth_normals(&self) -> Vec<[f32; 3]> {
        let mut normals = vec![Vector3::new(0.0f32, 0.0, 0.0); self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(pa), Some(pb), Some(pc)) = (
                self.positions.get(a),
                self.positions.get(b),
                self.positions.get(c),
            ) else {
                continue;
            };
            let (pa, pb, pc) = (Vector3::from(*pa), Vector3::from(*pb), Vector3::from(*pc));
            let face = (pb - pa).cross(pc - pa);
            for idx in [a, b, c] {
                normals[idx] += face;
            }
        }
        normals
            .into_iter()
            .map(|n| {
                if n.magnitude2() > f32::EPSILON {
                    n.normalize().into()
                } else {
                    [0.0, 0.0, 0.0]
                }
            })
            .collect()
    }
}

/// One node of a loaded object's hierarchy.
#[derive(Clone, Debug, Default)]
pub struct ObjectNode {
    pub name: String,
    pub transform: Instance,
    pub meshes: Vec<MeshData>,
    pub children: Vec<ObjectNode>,
}

impl ObjectNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Bounds of this node's subtree expressed in the space of `parent`.
    pub fn bounds_in(&self, parent: &Instance) -> Aabb {
        let world = parent * &self.transform;
        let own = self
            .meshes
            .iter()
            .fold(Aabb::empty(), |acc, mesh| acc.union(&mesh.bounds().transformed(&world)));
        self.children
            .iter()
            .fold(own, |acc, child| acc.union(&child.bounds_in(&world)))
    }

    /// Visits every mesh together with its accumulated transform.
    pub fn visit_meshes<'a>(&'a self, parent: &Instance, f: &mut dyn FnMut(&'a MeshData, &Instance)) {
        let world = parent * &self.transform;
        for mesh in &self.meshes {
            f(mesh, &world);
        }
        for child in &self.children {
            child.visit_meshes(&world, f);
        }
    }

    pub fn visit_meshes_mut(&mut self, f: &mut dyn FnMut(&mut MeshData)) {
        self.meshes.iter_mut().for_each(|mesh| f(mesh));
        self.children
            .iter_mut()
            .for_each(|child| child.visit_meshes_mut(f));
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
            + self
                .children
                .iter()
                .map(ObjectNode::mesh_count)
                .sum::<usize>()
    }
}

/// A successfully loaded asset: the root of its node tree.
#[derive(Clone, Debug)]
pub struct LoadedObject {
    pub name: String,
    pub root: ObjectNode,
}

impl LoadedObject {
    pub fn new(name: impl Into<String>, root: ObjectNode) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    /// Bounds in the object's parent space, i.e. including the root transform.
    pub fn bounds(&self) -> Aabb {
        self.root.bounds_in(&Instance::default())
    }

    pub fn mesh_count(&self) -> usize {
        self.root.mesh_count()
    }
}
