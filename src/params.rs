//! Live shading parameters driven by the UI.
//!
//! [`ViewParams`] is the application state of the showroom: the flow runtime owns the
//! single instance, UI handlers mutate it through the clamping setters and the render
//! step receives a copy every frame.

use serde::{Deserialize, Serialize};

/// Identifies one of the adjustable parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKey {
    Roughness,
    Metalness,
    Exposure,
}

impl ParamKey {
    pub const ALL: [ParamKey; 3] = [ParamKey::Roughness, ParamKey::Metalness, ParamKey::Exposure];

    /// Inclusive slider range.
    pub fn range(self) -> (f32, f32) {
        match self {
            ParamKey::Roughness | ParamKey::Metalness => (0.0, 1.0),
            ParamKey::Exposure => (0.0, 2.0),
        }
    }

    pub fn step(self) -> f32 {
        0.01
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamKey::Roughness => "roughness",
            ParamKey::Metalness => "metalness",
            ParamKey::Exposure => "exposure",
        }
    }

    pub fn parse(name: &str) -> Option<ParamKey> {
        ParamKey::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(name.trim()))
    }

    fn clamp(self, value: f32) -> f32 {
        let (lo, hi) = self.range();
        if value.is_nan() {
            return lo;
        }
        value.clamp(lo, hi)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewParams {
    roughness: f32,
    metalness: f32,
    exposure: f32,
}

impl ViewParams {
    pub fn new(roughness: f32, metalness: f32, exposure: f32) -> Self {
        let mut params = Self::default();
        params.set(ParamKey::Roughness, roughness);
        params.set(ParamKey::Metalness, metalness);
        params.set(ParamKey::Exposure, exposure);
        params
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    pub fn metalness(&self) -> f32 {
        self.metalness
    }

    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    pub fn get(&self, key: ParamKey) -> f32 {
        match key {
            ParamKey::Roughness => self.roughness,
            ParamKey::Metalness => self.metalness,
            ParamKey::Exposure => self.exposure,
        }
    }

    /// Sets `key`, clamped to its slider range. Returns the stored value.
    pub fn set(&mut self, key: ParamKey, value: f32) -> f32 {
        let value = key.clamp(value);
        match key {
            ParamKey::Roughness => self.roughness = value,
            ParamKey::Metalness => self.metalness = value,
            ParamKey::Exposure => self.exposure = value,
        }
        value
    }

    /// Moves `key` by a number of slider steps.
    pub fn nudge(&mut self, key: ParamKey, steps: i32) -> f32 {
        self.set(key, self.get(key) + key.step() * steps as f32)
    }

    /// Values loaded from configuration bypass the setters, so clamp them once.
    pub(crate) fn clamped(self) -> Self {
        Self::new(self.roughness, self.metalness, self.exposure)
    }
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            roughness: 0.5,
            metalness: 0.0,
            exposure: 1.0,
        }
    }
}
