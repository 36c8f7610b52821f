use flow_showroom::{
    catalog::Catalog,
    controller::{self, Command, UiAction},
    ParamKey, ViewParams,
};
use winit::keyboard::KeyCode;

#[test]
fn should_select_catalog_entries_with_digits() {
    let catalog = Catalog::default();
    assert_eq!(
        controller::key_action(KeyCode::Digit1, &catalog),
        Some(UiAction::Select("Room".to_string()))
    );
    assert_eq!(
        controller::key_action(KeyCode::Digit6, &catalog),
        Some(UiAction::Select("Meir".to_string()))
    );
    assert_eq!(controller::key_action(KeyCode::Digit9, &catalog), None);
}

#[test]
fn should_map_parameter_keys() {
    let catalog = Catalog::default();
    assert_eq!(
        controller::key_action(KeyCode::KeyR, &catalog),
        Some(UiAction::Nudge(ParamKey::Roughness, 1))
    );
    assert_eq!(
        controller::key_action(KeyCode::KeyD, &catalog),
        Some(UiAction::Nudge(ParamKey::Exposure, -1))
    );
    assert_eq!(controller::key_action(KeyCode::Space, &catalog), Some(UiAction::Refit));
    assert_eq!(controller::key_action(KeyCode::KeyQ, &catalog), None);
}

#[test]
fn should_turn_selection_into_load_command() {
    let mut params = ViewParams::default();
    match controller::apply(UiAction::Select("Meir".to_string()), &Catalog::default(), &mut params) {
        Command::Load(descriptors) => assert_eq!(descriptors.len(), 4),
        other => panic!("expected a load, got {other:?}"),
    }
}

#[test]
fn should_ignore_unknown_selection() {
    let mut params = ViewParams::default();
    assert_eq!(
        controller::apply(UiAction::Select("Teapot".to_string()), &Catalog::default(), &mut params),
        Command::Nothing
    );
}

#[test]
fn should_update_params_without_reloading() {
    let catalog = Catalog::default();
    let mut params = ViewParams::default();

    let command = controller::apply(UiAction::SetParam(ParamKey::Metalness, 0.8), &catalog, &mut params);
    assert_eq!(command, Command::Nothing);
    assert_eq!(params.metalness(), 0.8);

    controller::apply(UiAction::Nudge(ParamKey::Exposure, 10), &catalog, &mut params);
    assert!((params.exposure() - 1.1).abs() < 1e-6);

    controller::apply(UiAction::ResetParams, &catalog, &mut params);
    assert_eq!(params, ViewParams::default());
}

#[test]
fn should_request_refit() {
    let mut params = ViewParams::default();
    assert_eq!(
        controller::apply(UiAction::Refit, &Catalog::default(), &mut params),
        Command::Refit
    );
}
