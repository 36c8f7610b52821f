use std::sync::Arc;

use crate::common::test_utils::{box_mesh, box_object, source_material};
use flow_showroom::{
    data_structures::model::{LoadedObject, Material, ObjectNode, Side, SourceMaterial, TextureData},
    material, ParamKey, ViewParams,
};

mod common;

fn standard_of(object: &LoadedObject) -> Vec<flow_showroom::data_structures::model::StandardMaterial> {
    let mut found = Vec::new();
    object.root.visit_meshes(&Default::default(), &mut |mesh, _| {
        if let Some(standard) = mesh.material.as_ref().and_then(Material::as_standard) {
            found.push(standard.clone());
        }
    });
    found
}

#[test]
fn should_keep_base_colour_and_map_but_use_live_params() {
    let texture = Arc::new(TextureData {
        label: "wood".to_string(),
        image: image::RgbaImage::new(1, 1),
    });
    let source = Material::Source(SourceMaterial {
        name: "wood".to_string(),
        base_colour: Some([0.8, 0.6, 0.2, 1.0]),
        colour_map: Some(texture.clone()),
        metalness: Some(0.9),
        roughness: Some(0.1),
        side: Side::Front,
    });
    let params = ViewParams::new(0.3, 0.7, 1.0);

    let standard = material::to_standard(&source, &params);

    assert_eq!(standard.name, "wood");
    assert_eq!(standard.base_colour, [0.8, 0.6, 0.2, 1.0]);
    assert!(Arc::ptr_eq(standard.colour_map.as_ref().unwrap(), &texture));
    assert_eq!(standard.metalness, 0.7);
    assert_eq!(standard.roughness, 0.3);
    assert_eq!(standard.side, Side::Double);
}

#[test]
fn should_default_missing_colour_to_white() {
    let standard = material::to_standard(&source_material("bare", None), &ViewParams::default());
    assert_eq!(standard.base_colour, [1.0, 1.0, 1.0, 1.0]);
    assert!(standard.colour_map.is_none());
}

#[test]
fn should_normalize_every_material_in_the_hierarchy() {
    let mut object = box_object("parent", [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    let mut child = ObjectNode::new("child");
    child.meshes.push(box_mesh(
        [0.0, 0.0, 0.0],
        [1.0, 1.0, 1.0],
        Some(source_material("child", Some([0.0, 0.0, 1.0, 1.0]))),
    ));
    child.meshes.push(box_mesh([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], None));
    object.root.children.push(child);

    let replaced = material::normalize(&mut object, &ViewParams::default());

    assert_eq!(replaced, 2);
    let standards = standard_of(&object);
    assert_eq!(standards.len(), 2);
    assert_eq!(standards[1].base_colour, [0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn should_push_param_changes_into_normalized_materials() {
    let mut object = box_object("box", [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    material::normalize(&mut object, &ViewParams::default());

    let mut params = ViewParams::default();
    params.set(ParamKey::Metalness, 1.0);
    params.set(ParamKey::Roughness, 0.25);
    material::apply_params(&mut object, &params);

    let standard = &standard_of(&object)[0];
    assert_eq!(standard.metalness, 1.0);
    assert_eq!(standard.roughness, 0.25);
    assert_eq!(standard.base_colour, [0.5, 0.5, 0.5, 1.0]);
}
