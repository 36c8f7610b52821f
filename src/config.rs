//! Viewer configuration.
//!
//! Every field has a default so a partial (or missing) JSON file is valid. Natively the
//! file is named by the first CLI argument or the `SHOWROOM_CONFIG` environment variable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::Catalog,
    layout::{LayoutAxis, LayoutOptions, SpacingMode},
    params::ViewParams,
};

pub const CONFIG_ENV: &str = "SHOWROOM_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory (natively) or URL path (on the web) all asset paths are relative to.
    pub asset_root: String,
    pub spacing: f32,
    pub spacing_mode: SpacingMode,
    pub layout_axis: LayoutAxis,
    /// Lower bound for the camera distance when framing degenerate groups.
    pub min_fit_distance: f32,
    /// Clear colour as sRGB components in `0..=1`, the way CSS colours are written.
    pub background: [f64; 3],
    pub fov_degrees: f32,
    pub camera_position: [f32; 3],
    pub znear: f32,
    pub zfar: f32,
    /// Catalog entry loaded on startup.
    pub initial_selection: Option<String>,
    pub catalog: Catalog,
    pub params: ViewParams,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_root: "models".to_string(),
            spacing: LayoutOptions::DEFAULT_SPACING,
            spacing_mode: SpacingMode::default(),
            layout_axis: LayoutAxis::default(),
            min_fit_distance: crate::fit::DEFAULT_MIN_DISTANCE,
            // 0xbfe3dd
            background: [191.0 / 255.0, 227.0 / 255.0, 221.0 / 255.0],
            fov_degrees: 40.0,
            camera_position: [5.0, 2.0, 8.0],
            znear: 1.0,
            zfar: 100.0,
            initial_selection: Some("Room".to_string()),
            catalog: Catalog::default(),
            params: ViewParams::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: ViewerConfig = serde_json::from_str(json)?;
        config.params = config.params.clamped();
        Ok(config)
    }

    /// Reads `path`; a missing file falls back to the defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Resolves the config location from the command line or environment.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var(CONFIG_ENV).ok());
        match path {
            Some(path) => Self::from_file(std::path::Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            axis: self.layout_axis,
            spacing: self.spacing,
            mode: self.spacing_mode,
        }
    }

    /// The background in linear space; the sRGB surface encodes it again on output.
    pub fn clear_colour(&self) -> wgpu::Color {
        let [r, g, b] = self.background.map(srgb_to_linear);
        wgpu::Color { r, g, b, a: 1.0 }
    }
}

pub fn srgb_to_linear(c: f64) -> f64 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
