//! GPU upload of the displayed group and render composition.
//!
//! A [`GpuGroup`] mirrors an attached [`ModelGroup`] on the GPU: one vertex/index buffer
//! pair per mesh, its world transform as a single instance and a material bind group.
//! Flows hand their drawables to the engine as a [`Render`] each frame.
//!
//! # Key types
//!
//! - [`Render<'a>`] describes what a flow wants drawn this frame
//! - [`Instanced<'a>`] references one uploaded mesh and its instance buffer
//! - [`DrawStandard`] extends the render pass with the standard draw call

use std::{collections::HashMap, ops::Range, sync::Arc};

use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{
        model::{Material, MeshData, StandardMaterial, TextureData},
        scene_graph::{Generation, ModelGroup},
        texture::Texture,
    },
    params::ViewParams,
    pipelines::standard::{MaterialUniform, mk_material_bind_group},
};

/// One mesh on the GPU.
#[derive(Debug)]
pub struct GpuMesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub instance_buffer: wgpu::Buffer,
    pub material: GpuMaterial,
}

#[derive(Debug)]
pub struct GpuMaterial {
    pub uniform: MaterialUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// The uploaded form of a [`ModelGroup`]. Dropping it releases its GPU resources.
#[derive(Debug)]
pub struct GpuGroup {
    pub generation: Generation,
    pub meshes: Vec<GpuMesh>,
    params: ViewParams,
}

impl GpuGroup {
    pub fn upload(ctx: &Context, group: &ModelGroup, params: &ViewParams) -> Self {
        let device = &ctx.device;
        // Colour maps are shared between materials; upload each image once
        let mut textures: HashMap<*const TextureData, Texture> = HashMap::new();
        let mut meshes = Vec::new();
        for object in group.get_children() {
            object
                .root
                .visit_meshes(&group.transform, &mut |mesh: &MeshData, world| {
                    if mesh.indices.is_empty() || mesh.positions.is_empty() {
                        return;
                    }
                    let fallback;
                    let material = match mesh.material.as_ref() {
                        Some(Material::Standard(standard)) => standard,
                        other => {
                            if let Some(Material::Source(source)) = other {
                                log::warn!("Material {} was not normalized", source.name);
                            }
                            fallback = StandardMaterial::new(
                                &mesh.name,
                                params.metalness(),
                                params.roughness(),
                            );
                            &fallback
                        }
                    };
                    let colour_map = material.colour_map.as_ref().map(|data| {
                        textures
                            .entry(Arc::as_ptr(data))
                            .or_insert_with(|| Texture::from_texture_data(device, &ctx.queue, data))
                            .clone()
                    });

                    let vertex_buffer =
                        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&format!("{:?} Vertex Buffer", mesh.name)),
                            contents: bytemuck::cast_slice(&mesh.vertices()),
                            usage: wgpu::BufferUsages::VERTEX,
                        });
                    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{:?} Index Buffer", mesh.name)),
                        contents: bytemuck::cast_slice(&mesh.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    });
                    let instance_buffer =
                        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some(&format!("{:?} Instance Buffer", mesh.name)),
                            contents: bytemuck::cast_slice(&[world.to_raw()]),
                            usage: wgpu::BufferUsages::VERTEX,
                        });

                    let uniform = MaterialUniform::from(material);
                    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{:?} Material Buffer", material.name)),
                        contents: bytemuck::cast_slice(&[uniform]),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    });
                    let bind_group = mk_material_bind_group(
                        device,
                        &ctx.material_layout,
                        colour_map.as_ref().unwrap_or(&ctx.white),
                        &buffer,
                        &material.name,
                    );

                    meshes.push(GpuMesh {
                        name: mesh.name.clone(),
                        vertex_buffer,
                        index_buffer,
                        num_elements: mesh.indices.len() as u32,
                        instance_buffer,
                        material: GpuMaterial {
                            uniform,
                            buffer,
                            bind_group,
                        },
                    });
                });
        }
        log::info!(
            "Uploaded group {} with {} meshes and {} colour maps",
            group.generation,
            meshes.len(),
            textures.len()
        );
        Self {
            generation: group.generation,
            meshes,
            params: *params,
        }
    }

    /// Pushes changed metalness/roughness into every material uniform.
    pub fn sync_params(&mut self, queue: &wgpu::Queue, params: &ViewParams) {
        if self.params.metalness() == params.metalness()
            && self.params.roughness() == params.roughness()
        {
            return;
        }
        self.params = *params;
        for mesh in &mut self.meshes {
            let material = &mut mesh.material;
            material.uniform.metalness = params.metalness();
            material.uniform.roughness = params.roughness();
            queue.write_buffer(&material.buffer, 0, bytemuck::cast_slice(&[material.uniform]));
        }
    }

    pub fn params(&self) -> &ViewParams {
        &self.params
    }

    pub fn get_render(&self) -> Render<'_> {
        Render::Defaults(
            self.meshes
                .iter()
                .map(|mesh| Instanced {
                    instance: &mesh.instance_buffer,
                    mesh,
                    amount: 1,
                })
                .collect(),
        )
    }
}

/// One mesh with its instance buffer, ready to be drawn with the standard pipeline.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub mesh: &'a GpuMesh,
    pub amount: usize,
}

/// Specifies what a flow renders this frame.
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single instanced mesh
/// - `Defaults(Vec<Instanced>)` renders a batch of meshes
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn collect(self, basics: &mut Vec<Instanced<'a>>) {
        match self {
            Render::Default(instanced) => basics.push(instanced),
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.collect(basics)),
            Render::None => (),
        }
    }
}

impl<'a> From<Option<&'a GpuGroup>> for Render<'a> {
    fn from(group: Option<&'a GpuGroup>) -> Self {
        group.map_or(Render::None, GpuGroup::get_render)
    }
}

pub trait DrawStandard<'a> {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'a GpuMesh,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a> DrawStandard<'a> for wgpu::RenderPass<'_> {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'a GpuMesh,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &mesh.material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, light_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }
}
