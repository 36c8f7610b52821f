use std::{
    borrow::Cow,
    collections::HashMap,
    io::{BufReader, Cursor},
    sync::Arc,
};

use crate::{
    catalog::AssetDescriptor,
    data_structures::model::{
        LoadedObject, Material, MeshData, ObjectNode, Side, SourceMaterial, TextureData,
    },
    resources::{AssetSource, LoadError, load_texture, sibling},
};

/**
 * Loads an OBJ file together with its MTL file.
 *
 * When the descriptor names a material file it is used for every `mtllib` statement and
 * is loaded even if the OBJ has none, otherwise `mtllib` paths are resolved next to the
 * OBJ. A missing or broken MTL file degrades to meshes without materials.
 */
pub async fn load_model_obj(
    source: &AssetSource,
    descriptor: &AssetDescriptor,
) -> Result<LoadedObject, LoadError> {
    let file_name = descriptor.primary.as_str();
    let obj_text = source.load_string(file_name).await?;
    let obj_text = with_material_library(&obj_text, descriptor.auxiliary.as_deref());
    let obj_cursor = Cursor::new(obj_text.as_bytes());
    let mut obj_reader = BufReader::new(obj_cursor);

    let mtl_path = |mtllib: &str| {
        descriptor
            .auxiliary
            .clone()
            .unwrap_or_else(|| sibling(file_name, mtllib))
    };

    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| {
            let source = source.clone();
            let path = mtl_path(&p);
            async move {
                match source.load_string(&path).await {
                    Ok(mat_text) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text))),
                    Err(e) => {
                        log::warn!("{}", e);
                        Err(tobj::LoadError::OpenFileFailed)
                    }
                }
            }
        },
    )
    .await
    .map_err(|e| LoadError::Parse {
        path: file_name.to_string(),
        reason: e.to_string(),
    })?;

    let obj_materials = match obj_materials {
        Ok(materials) => materials,
        Err(e) => {
            log::warn!("Materials of {} could not be loaded: {}", file_name, e);
            Vec::new()
        }
    };

    // Textures are referenced relative to the material file
    let texture_base = mtl_path("");
    let mut textures: HashMap<String, Option<Arc<TextureData>>> = HashMap::new();
    for m in &obj_materials {
        if let Some(map) = &m.diffuse_texture {
            if !textures.contains_key(map) {
                let texture = load_texture(source, &sibling(&texture_base, map)).await;
                textures.insert(map.clone(), texture);
            }
        }
    }

    let materials: Vec<SourceMaterial> = obj_materials
        .iter()
        .map(|m| to_source_material(m, &textures))
        .collect();

    let mut root = ObjectNode::new(descriptor.display_name.clone());
    root.meshes = models
        .iter()
        .filter_map(|model| {
            let mesh = to_mesh(model, &materials);
            if mesh.is_none() {
                log::warn!(
                    "Mesh {} in file {} has no triangles and was skipped.",
                    model.name,
                    file_name
                );
            }
            mesh
        })
        .collect();

    Ok(LoadedObject::new(descriptor.display_name.clone(), root))
}

/// Makes sure an OBJ paired with a material file references it. `tobj` only loads
/// materials for `mtllib` statements, which the loader callback maps to the pair's file.
pub fn with_material_library<'a>(obj_text: &'a str, material_file: Option<&str>) -> Cow<'a, str> {
    let Some(material_file) = material_file else {
        return Cow::Borrowed(obj_text);
    };
    let has_mtllib = obj_text
        .lines()
        .any(|line| line.trim_start().starts_with("mtllib"));
    if has_mtllib {
        return Cow::Borrowed(obj_text);
    }
    let file_name = material_file.rsplit('/').next().unwrap_or(material_file);
    log::debug!("Adding mtllib {} to its paired OBJ", file_name);
    Cow::Owned(format!("mtllib {file_name}\n{obj_text}"))
}

fn to_source_material(
    m: &tobj::Material,
    textures: &HashMap<String, Option<Arc<TextureData>>>,
) -> SourceMaterial {
    let colour_map = m
        .diffuse_texture
        .as_ref()
        .and_then(|map| textures.get(map).cloned().flatten());
    SourceMaterial {
        name: m.name.clone(),
        base_colour: m
            .diffuse
            .map(|[r, g, b]| [r, g, b, m.dissolve.unwrap_or(1.0)]),
        colour_map,
        metalness: None,
        roughness: None,
        side: Side::Front,
    }
}

/// Converts one `tobj` model. Returns `None` for models without faces.
pub fn to_mesh(model: &tobj::Model, materials: &[SourceMaterial]) -> Option<MeshData> {
    let m = &model.mesh;
    if m.indices.is_empty() {
        return None;
    }
    let vertex_count = m.positions.len() / 3;
    let positions = m
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    let normals = if m.normals.len() == vertex_count * 3 {
        m.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect()
    } else {
        Vec::new()
    };
    // OBJ uv origin is bottom left, wgpu's is top left
    let tex_coords = if m.texcoords.len() == vertex_count * 2 {
        m.texcoords.chunks_exact(2).map(|t| [t[0], 1.0 - t[1]]).collect()
    } else {
        Vec::new()
    };
    let material = m
        .material_id
        .and_then(|id| materials.get(id))
        .cloned()
        .map(Material::Source);

    Some(MeshData {
        name: model.name.clone(),
        positions,
        normals,
        tex_coords,
        indices: m.indices.clone(),
        material,
    })
}
