use std::{collections::HashSet, sync::Arc};

use crate::{
    catalog::AssetDescriptor,
    data_structures::{
        instance::Instance,
        model::{LoadedObject, Material, MeshData, ObjectNode, Side, SourceMaterial, TextureData},
    },
    resources::{AssetSource, LoadError, decode_data_uri, decode_texture, sibling},
};

const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

pub async fn load_model_gltf(
    source: &AssetSource,
    descriptor: &AssetDescriptor,
) -> Result<LoadedObject, LoadError> {
    let bytes = source.load_binary(&descriptor.primary).await?;
    load_gltf_from_slice(source, &descriptor.primary, &descriptor.display_name, &bytes).await
}

/// Parses a `.gltf` or `.glb` file. External buffers and images are fetched relative to
/// `file_name`.
pub async fn load_gltf_from_slice(
    source: &AssetSource,
    file_name: &str,
    name: &str,
    bytes: &[u8],
) -> Result<LoadedObject, LoadError> {
    let parse_err = |reason: String| LoadError::Parse {
        path: file_name.to_string(),
        reason,
    };
    // Required extensions are checked before validation, which rejects unknown ones
    let gltf::Gltf { document, blob } =
        gltf::Gltf::from_slice_without_validation(bytes).map_err(|e| parse_err(e.to_string()))?;
    if document.extensions_required().any(|ext| ext == DRACO_EXTENSION) {
        return Err(LoadError::Unsupported {
            path: file_name.to_string(),
            reason: format!("{DRACO_EXTENSION} compressed geometry"),
        });
    }
    let document = gltf::Document::from_json(document.into_json())
        .map_err(|e| parse_err(e.to_string()))?;

    // Load buffers
    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in document.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => blob
                .clone()
                .ok_or_else(|| parse_err("binary chunk missing".to_string()))?,
            gltf::buffer::Source::Uri(uri) => match decode_data_uri(uri) {
                Some(embedded) => {
                    embedded
                        .map_err(|reason| parse_err(format!("buffer {}: {}", buffer.index(), reason)))?
                        .data
                }
                None => source.load_binary(&sibling(file_name, uri)).await?,
            },
        };
        buffer_data.push(data);
    }

    // Only base colour maps are used, so only those images are decoded
    let colour_images: HashSet<usize> = document
        .materials()
        .filter_map(|m| m.pbr_metallic_roughness().base_color_texture())
        .map(|info| info.texture().source().index())
        .collect();
    let mut images: Vec<Option<Arc<TextureData>>> = Vec::new();
    for image in document.images() {
        if !colour_images.contains(&image.index()) {
            images.push(None);
            continue;
        }
        let decoded = match image.source() {
            gltf::image::Source::View { view, mime_type } => {
                let start = view.offset();
                let end = start + view.length();
                match buffer_data
                    .get(view.buffer().index())
                    .and_then(|buffer| buffer.get(start..end))
                {
                    Some(slice) => decode_texture(
                        &format!("{}#image{}", file_name, image.index()),
                        slice,
                        Some(mime_type),
                    ),
                    None => Err(LoadError::Texture {
                        path: file_name.to_string(),
                        reason: format!("image {} points outside its buffer", image.index()),
                    }),
                }
            }
            gltf::image::Source::Uri { uri, mime_type } => match decode_data_uri(uri) {
                Some(embedded) => {
                    let label = format!("{}#image{}", file_name, image.index());
                    match embedded {
                        Ok(embedded) => decode_texture(
                            &label,
                            &embedded.data,
                            mime_type.or(embedded.mime_type.as_deref()),
                        ),
                        Err(reason) => Err(LoadError::Texture { path: label, reason }),
                    }
                }
                None => {
                    let path = sibling(file_name, uri);
                    match source.load_binary(&path).await {
                        Ok(bytes) => decode_texture(&path, &bytes, mime_type),
                        Err(e) => Err(e),
                    }
                }
            },
        };
        images.push(decoded.map_err(|e| log::warn!("Colour map dropped: {}", e)).ok());
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| parse_err("no scene".to_string()))?;

    let mut root = ObjectNode::new(name);
    for node in scene.nodes() {
        root.children.push(to_object_node(node, &buffer_data, &images));
    }

    Ok(LoadedObject::new(name, root))
}

fn to_object_node(
    node: gltf::scene::Node,
    buffers: &[Vec<u8>],
    images: &[Option<Arc<TextureData>>],
) -> ObjectNode {
    let (position, rotation, scale) = node.transform().decomposed();
    let mut object_node = ObjectNode::new(node.name().unwrap_or("node"));
    object_node.transform = Instance {
        position: position.into(),
        rotation: rotation.into(),
        scale: scale.into(),
    };

    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh.name().unwrap_or("unknown_mesh");
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("Skipping non-triangle primitive of {}", mesh_name);
                continue;
            }
            match to_mesh(mesh_name, &primitive, buffers, images) {
                Some(mesh) => object_node.meshes.push(mesh),
                None => log::warn!("Primitive of {} has no readable positions", mesh_name),
            }
        }
    }

    for child in node.children() {
        object_node
            .children
            .push(to_object_node(child, buffers, images));
    }
    object_node
}

fn to_mesh(
    name: &str,
    primitive: &gltf::Primitive,
    buffers: &[Vec<u8>],
    images: &[Option<Arc<TextureData>>],
) -> Option<MeshData> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals = reader
        .read_normals()
        .map(|normals| normals.collect())
        .unwrap_or_default();
    let tex_coords = reader
        .read_tex_coords(0)
        .map(|coords| coords.into_f32().collect())
        .unwrap_or_default();
    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    Some(MeshData {
        name: name.to_string(),
        positions,
        normals,
        tex_coords,
        indices,
        material: Some(Material::Source(to_source_material(
            &primitive.material(),
            images,
        ))),
    })
}

fn to_source_material(
    material: &gltf::Material,
    images: &[Option<Arc<TextureData>>],
) -> SourceMaterial {
    let pbr = material.pbr_metallic_roughness();
    let colour_map = pbr
        .base_color_texture()
        .and_then(|info| images.get(info.texture().source().index()).cloned().flatten());
    SourceMaterial {
        name: material.name().unwrap_or("default").to_string(),
        base_colour: Some(pbr.base_color_factor()),
        colour_map,
        metalness: Some(pbr.metallic_factor()),
        roughness: Some(pbr.roughness_factor()),
        side: if material.double_sided() {
            Side::Double
        } else {
            Side::Front
        },
    }
}
