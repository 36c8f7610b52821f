//! View fitter: frames the camera on a bounding box.
//!
//! The camera keeps looking from the direction it currently looks from; only its distance
//! to the new target and the clip planes change.

use cgmath::Rad;

use crate::{
    camera::{Camera, Projection},
    data_structures::bounds::Aabb,
};

pub const DEFAULT_MIN_DISTANCE: f32 = 1.0;

/// The camera placement produced by [`fit`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Framing {
    pub position: cgmath::Point3<f32>,
    pub target: cgmath::Point3<f32>,
    pub distance: f32,
    pub znear: f32,
    pub zfar: f32,
}

/// Distance at which a box with largest dimension `max_dimension` fits a vertical field of
/// view of `fovy`, never closer than `min_distance`.
pub fn fit_distance(max_dimension: f32, fovy: Rad<f32>, min_distance: f32) -> f32 {
    let distance = max_dimension / (fovy.0 / 2.0).tan();
    if distance.is_finite() {
        distance.max(min_distance)
    } else {
        min_distance
    }
}

/// Computes a framing for `bounds` as seen from the camera's current direction.
/// Returns `None` for an empty box.
pub fn fit(bounds: &Aabb, camera: &Camera, fovy: Rad<f32>, min_distance: f32) -> Option<Framing> {
    if bounds.is_empty() {
        return None;
    }
    let center = bounds.center();
    let distance = fit_distance(bounds.max_dimension(), fovy, min_distance);
    let direction = camera.direction();
    Some(Framing {
        position: center + direction * distance,
        target: center,
        distance,
        znear: distance / 100.0,
        zfar: distance * 10.0,
    })
}

/// Applies a framing to the camera and its projection.
pub fn apply(framing: &Framing, camera: &mut Camera, projection: &mut Projection) {
    camera.position = framing.position;
    camera.target = framing.target;
    projection.znear = framing.znear;
    projection.zfar = framing.zfar;
}
