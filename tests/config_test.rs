use std::path::Path;

use flow_showroom::{
    config::{self, ConfigError},
    layout::{LayoutAxis, SpacingMode},
    ViewerConfig,
};

#[test]
fn should_fill_missing_fields_with_defaults() {
    let config = ViewerConfig::from_json(r#"{ "asset_root": "assets", "spacing": 2.5 }"#).unwrap();
    assert_eq!(config.asset_root, "assets");
    assert_eq!(config.spacing, 2.5);
    assert_eq!(config.spacing_mode, SpacingMode::Packed);
    assert_eq!(config.initial_selection.as_deref(), Some("Room"));
    assert_eq!(config.catalog.names().count(), 6);
}

#[test]
fn should_read_layout_options() {
    let config = ViewerConfig::from_json(
        r#"{ "spacing_mode": "per_object", "layout_axis": "z", "spacing": 0.5 }"#,
    )
    .unwrap();
    let options = config.layout_options();
    assert_eq!(options.mode, SpacingMode::PerObject);
    assert_eq!(options.axis, LayoutAxis::Z);
    assert_eq!(options.spacing, 0.5);
}

#[test]
fn should_clamp_configured_params() {
    let config =
        ViewerConfig::from_json(r#"{ "params": { "roughness": 4.0, "exposure": -1.0 } }"#)
            .unwrap();
    assert_eq!(config.params.roughness(), 1.0);
    assert_eq!(config.params.metalness(), 0.0);
    assert_eq!(config.params.exposure(), 0.0);
}

#[test]
fn should_reject_malformed_json() {
    assert!(matches!(
        ViewerConfig::from_json("{ spacing: }"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn should_use_defaults_without_config_file() {
    let config = ViewerConfig::from_file(Path::new("tests/fixtures/no_such_config.json")).unwrap();
    assert_eq!(config, ViewerConfig::default());
}

#[test]
fn should_report_unreadable_config_path() {
    // A directory exists but cannot be read as a file
    let result = ViewerConfig::from_file(Path::new("tests/fixtures"));
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

fn assert_near(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-4, "expected {expected}, got {actual}");
}

#[test]
fn should_linearize_background_for_clear_colour() {
    let config = ViewerConfig::from_json(r#"{ "background": [1.0, 0.0, 0.5] }"#).unwrap();
    let colour = config.clear_colour();
    assert_near(colour.r, 1.0);
    assert_near(colour.g, 0.0);
    assert_near(colour.b, 0.21404);
    assert_eq!(colour.a, 1.0);
}

#[test]
fn should_keep_default_background_at_css_value() {
    // 0xbfe3dd
    let colour = ViewerConfig::default().clear_colour();
    assert_near(colour.r, config::srgb_to_linear(191.0 / 255.0));
    assert_near(colour.g, config::srgb_to_linear(227.0 / 255.0));
    assert_near(colour.b, config::srgb_to_linear(221.0 / 255.0));
    assert!(colour.r < 0.749);
}

#[test]
fn should_use_linear_segment_for_dark_values() {
    assert_near(config::srgb_to_linear(0.04), 0.04 / 12.92);
    assert_near(config::srgb_to_linear(-1.0), 0.0);
}
