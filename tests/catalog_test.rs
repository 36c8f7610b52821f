use flow_showroom::catalog::{AssetDescriptor, AssetKind, Catalog, CatalogError};

#[test]
fn should_list_default_entries_then_collections() {
    let catalog = Catalog::default();
    let names: Vec<&str> = catalog.names().collect();
    assert_eq!(names, ["Room", "MB01", "MB02", "MB03", "MB04", "Meir"]);
}

#[test]
fn should_pair_obj_with_mtl_of_same_stem() {
    let catalog = Catalog::default();
    let mb03 = catalog.get("MB03").unwrap();
    assert_eq!(mb03.primary, "Meir/MB03.obj");
    assert_eq!(mb03.auxiliary.as_deref(), Some("Meir/MB03.mtl"));
    assert_eq!(mb03.kind(), Some(AssetKind::Obj));
    assert_eq!(catalog.get("Room").unwrap().kind(), Some(AssetKind::Gltf));
}

#[test]
fn should_resolve_collection_in_member_order() {
    let resolved = Catalog::default().resolve("Meir").unwrap();
    let names: Vec<&str> = resolved.iter().map(|d| d.display_name.as_str()).collect();
    assert_eq!(names, ["MB01", "MB02", "MB03", "MB04"]);
}

#[test]
fn should_resolve_single_entry_to_itself() {
    let resolved = Catalog::default().resolve("Room").unwrap();
    assert_eq!(resolved, vec![AssetDescriptor::new("Room", "room.glb", None)]);
}

#[test]
fn should_reject_unknown_names() {
    assert_eq!(
        Catalog::default().resolve("Teapot"),
        Err(CatalogError::UnknownEntry("Teapot".to_string()))
    );
}

#[test]
fn should_reject_duplicate_names() {
    let entries = vec![
        AssetDescriptor::new("Chair", "chair.glb", None),
        AssetDescriptor::new("Chair", "chair2.glb", None),
    ];
    assert_eq!(
        Catalog::new(entries).err(),
        Some(CatalogError::DuplicateEntry("Chair".to_string()))
    );
}

#[test]
fn should_reject_collections_with_unknown_members() {
    let catalog = Catalog::new(vec![AssetDescriptor::new("Chair", "chair.glb", None)]).unwrap();
    assert_eq!(
        catalog.with_collection("Set", &["Chair", "Table"]).err(),
        Some(CatalogError::UnknownEntry("Table".to_string()))
    );
}

#[test]
fn should_derive_kind_from_extension_case_insensitively() {
    assert_eq!(AssetDescriptor::new("a", "a.GLB", None).kind(), Some(AssetKind::Gltf));
    assert_eq!(AssetDescriptor::new("a", "a.gltf", None).kind(), Some(AssetKind::Gltf));
    assert_eq!(AssetDescriptor::new("a", "a.fbx", None).kind(), None);
    assert_eq!(AssetDescriptor::new("a", "noextension", None).kind(), None);
}

#[test]
fn should_read_catalog_from_json() {
    let json = r#"{
        "entries": [
            { "display_name": "Chair", "primary": "chair.obj", "auxiliary": "chair.mtl" },
            { "display_name": "Lamp", "primary": "lamp.glb" }
        ],
        "collections": [{ "name": "All", "members": ["Chair", "Lamp"] }]
    }"#;
    let catalog: Catalog = serde_json::from_str(json).unwrap();
    assert_eq!(catalog.names().collect::<Vec<_>>(), ["Chair", "Lamp", "All"]);
    assert_eq!(catalog.resolve("All").unwrap().len(), 2);

    let round_trip: Catalog = serde_json::from_str(&serde_json::to_string(&catalog).unwrap()).unwrap();
    assert_eq!(round_trip, catalog);
}

#[test]
fn should_fail_to_read_inconsistent_catalog() {
    let json = r#"{ "entries": [], "collections": [{ "name": "All", "members": ["Ghost"] }] }"#;
    assert!(serde_json::from_str::<Catalog>(json).is_err());
}

#[test]
fn should_build_default_catalog_that_passes_validation() {
    let catalog = Catalog::default();
    let json = serde_json::to_string(&catalog).unwrap();
    let reread: Catalog = serde_json::from_str(&json).unwrap();
    assert_eq!(reread, catalog);
    assert_eq!(reread.get("MB04").unwrap().primary, "Meir/MB04.obj");
}
