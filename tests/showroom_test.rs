use crate::common::test_utils::{assert_close, assert_point_close, fixtures, test_catalog};
use cgmath::{Deg, InnerSpace};
use flow_showroom::{
    camera::Camera,
    catalog::AssetDescriptor,
    data_structures::model::Material,
    fit,
    layout::LayoutOptions,
    loader::LoadRequest,
    resources::{self, LoadError},
    viewer::{self, Showroom, ViewerEvent},
    ViewParams,
};

mod common;

fn showroom() -> Showroom {
    Showroom::new(test_catalog(), fixtures(), LayoutOptions::default())
}

fn select(showroom: &mut Showroom, name: &str) -> Vec<LoadRequest> {
    let descriptors = showroom.catalog().resolve(name).unwrap();
    showroom.select(descriptors)
}

async fn run(request: &LoadRequest) -> Result<flow_showroom::data_structures::model::LoadedObject, LoadError> {
    resources::load_object(&fixtures(), &request.descriptor).await
}

/// Loads every request and feeds the results back in the given slot order.
async fn settle(showroom: &mut Showroom, requests: &[LoadRequest], order: &[usize]) -> bool {
    let params = ViewParams::default();
    let mut attached = false;
    for &slot in order {
        let request = &requests[slot];
        let result = run(request).await;
        attached = showroom
            .loaded(request.generation, request.slot, result, &params)
            .is_some();
    }
    attached
}

#[tokio::test]
async fn should_show_single_obj_centred_at_origin() {
    let mut showroom = showroom();
    let requests = select(&mut showroom, "MB03");
    assert_eq!(requests.len(), 1);
    assert!(settle(&mut showroom, &requests, &[0]).await);

    let group = showroom.scene().group().unwrap();
    assert_eq!(group.len(), 1);
    let bounds = showroom.bounds().unwrap();
    assert_point_close(bounds.center(), [0.0, 0.0, 0.0]);
    assert_close(bounds.size().x, 2.0);

    let camera = Camera::new((5.0, 2.0, 8.0), (0.0, 0.0, 0.0));
    let framing = fit::fit(&bounds, &camera, Deg(40.0).into(), fit::DEFAULT_MIN_DISTANCE).unwrap();
    assert_point_close(framing.target, [0.0, 0.0, 0.0]);
    assert_close((framing.position - framing.target).magnitude(), framing.distance);
}

#[tokio::test]
async fn should_normalize_materials_of_attached_objects() {
    let mut showroom = showroom();
    let requests = select(&mut showroom, "MB03");
    settle(&mut showroom, &requests, &[0]).await;

    let object = &showroom.scene().group().unwrap().get_children()[0];
    let mesh = &object.root.meshes[0];
    match mesh.material.as_ref() {
        Some(Material::Standard(standard)) => {
            assert_eq!(standard.base_colour, [0.8, 0.6, 0.2, 1.0]);
            assert_eq!(standard.roughness, 0.5);
            assert_eq!(standard.metalness, 0.0);
        }
        other => panic!("expected a standard material, got {other:?}"),
    }
}

#[tokio::test]
async fn should_lay_out_collection_in_request_order_despite_completion_order() {
    let mut showroom = showroom();
    let requests = select(&mut showroom, "Meir");
    let names: Vec<&str> = requests
        .iter()
        .map(|r| r.descriptor.display_name.as_str())
        .collect();
    assert_eq!(names, ["MB01", "MB02", "MB03", "MB04"]);

    // MB04 has no files in the fixtures and fails
    assert!(settle(&mut showroom, &requests, &[3, 2, 0, 1]).await);

    let group = showroom.scene().group().unwrap();
    let names: Vec<&str> = group.get_children().iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["MB01", "MB02", "MB03"]);

    let xs: Vec<f32> = group
        .get_children()
        .iter()
        .map(|o| o.bounds().center().x)
        .collect();
    // Widths 1, 3 and 2 packed with a gap of 1
    assert_close(xs[0], 0.0);
    assert_close(xs[1], 3.0);
    assert_close(xs[2], 6.5);
}

#[tokio::test]
async fn should_not_attach_anything_when_only_asset_fails() {
    let mut showroom = showroom();
    let first = select(&mut showroom, "MB03");
    settle(&mut showroom, &first, &[0]).await;
    assert!(showroom.scene().group().is_some());

    let requests = select(&mut showroom, "Missing");
    assert!(showroom.scene().group().is_none());
    assert!(!settle(&mut showroom, &requests, &[0]).await);
    assert!(showroom.scene().group().is_none());
    assert!(showroom.bounds().is_none());
}

#[tokio::test]
async fn should_not_attach_anything_when_every_asset_fails() {
    let mut showroom = showroom();
    let requests = select(&mut showroom, "Broken");
    assert_eq!(requests.len(), 2);
    assert!(!settle(&mut showroom, &requests, &[1, 0]).await);
    assert!(showroom.scene().group().is_none());
    assert_eq!(showroom.scene().attach_count(), 0);
}

#[tokio::test]
async fn should_replace_previous_group_with_new_selection() {
    let mut showroom = showroom();
    let first = select(&mut showroom, "MB03");
    settle(&mut showroom, &first, &[0]).await;

    let second = select(&mut showroom, "Triangle");
    settle(&mut showroom, &second, &[0]).await;

    let group = showroom.scene().group().unwrap();
    assert_eq!(group.generation, 2);
    assert_eq!(group.len(), 1);
    assert_eq!(group.get_children()[0].name, "Triangle");
    assert_eq!(showroom.scene().attach_count(), 2);
}

#[tokio::test]
async fn should_discard_loads_of_superseded_selection() {
    let mut showroom = showroom();
    let stale = select(&mut showroom, "Meir");
    let current = select(&mut showroom, "MB03");

    // Every load of the abandoned selection finishes after the new one started
    assert!(!settle(&mut showroom, &stale, &[0, 1, 2, 3]).await);
    assert!(showroom.scene().group().is_none());

    assert!(settle(&mut showroom, &current, &[0]).await);
    let group = showroom.scene().group().unwrap();
    assert_eq!(group.generation, current[0].generation);
    assert_eq!(group.len(), 1);
    assert_eq!(group.get_children()[0].name, "MB03");
}

#[tokio::test]
async fn should_wrap_load_results_as_viewer_events() {
    let mut showroom = showroom();
    let requests = select(&mut showroom, "MB03");
    match viewer::load(fixtures(), requests[0].clone()).await {
        ViewerEvent::Loaded {
            generation,
            slot,
            result,
        } => {
            assert_eq!((generation, slot), (1, 0));
            assert!(result.is_ok());
        }
        other => panic!("expected a load result, got {other:?}"),
    }
}

#[tokio::test]
async fn should_apply_live_params_to_attached_group() {
    let mut showroom = showroom();
    let requests = select(&mut showroom, "Room");
    settle(&mut showroom, &requests, &[0]).await;

    showroom.apply_params(&ViewParams::new(0.1, 0.9, 1.0));

    let object = &showroom.scene().group().unwrap().get_children()[0];
    let mut seen = 0;
    object.root.visit_meshes(&Default::default(), &mut |mesh, _| {
        let standard = mesh.material.as_ref().and_then(Material::as_standard).unwrap();
        assert_eq!(standard.metalness, 0.9);
        assert_eq!(standard.roughness, 0.1);
        seen += 1;
    });
    assert_eq!(seen, 1);
}

#[test]
fn should_treat_empty_selection_as_nothing_to_show() {
    let mut showroom = showroom();
    let requests = showroom.select(Vec::<AssetDescriptor>::new());
    assert!(requests.is_empty());
    assert_eq!(showroom.generation(), 1);
    assert!(showroom.scene().group().is_none());
}
