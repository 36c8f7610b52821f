//! Material normalizer.
//!
//! Every mesh that carries a material gets a [`StandardMaterial`] instead, so the whole
//! showroom renders through one physically based pipeline with the shared
//! metalness/roughness parameters.

use crate::{
    data_structures::model::{LoadedObject, Material, Side, StandardMaterial},
    params::ViewParams,
};

/// Builds the standard replacement for `material`. Missing inputs fall back to white and
/// no colour map.
pub fn to_standard(material: &Material, params: &ViewParams) -> StandardMaterial {
    StandardMaterial {
        name: material.name().to_string(),
        base_colour: material
            .base_colour()
            .unwrap_or(StandardMaterial::DEFAULT_BASE_COLOUR),
        colour_map: material.colour_map().cloned(),
        metalness: params.metalness(),
        roughness: params.roughness(),
        side: Side::Double,
    }
}

/// Rewrites all materials of `object` in place and returns how many were replaced.
pub fn normalize(object: &mut LoadedObject, params: &ViewParams) -> usize {
    let mut replaced = 0;
    object.root.visit_meshes_mut(&mut |mesh| {
        if let Some(material) = mesh.material.as_mut() {
            *material = Material::Standard(to_standard(material, params));
            replaced += 1;
        }
    });
    log::debug!("Normalized {} materials of {}", replaced, object.name);
    replaced
}

/// Pushes live parameter changes into already normalized materials.
pub fn apply_params(object: &mut LoadedObject, params: &ViewParams) {
    object.root.visit_meshes_mut(&mut |mesh| {
        if let Some(Material::Standard(standard)) = mesh.material.as_mut() {
            standard.apply_params(params.metalness(), params.roughness());
        }
    });
}
