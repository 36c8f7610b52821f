//! Layout engine: places the objects of a selection side by side.
//!
//! Each object is first recentered so its bounding-box centre sits on its own origin, then
//! moved along the layout axis. In [`SpacingMode::Packed`] neighbours are separated by
//! exactly `spacing`, whatever their sizes. [`SpacingMode::PerObject`] places object `i`
//! at `i * (size_i + spacing)`, which only packs evenly when all objects are equally wide.

use cgmath::{EuclideanSpace, Vector3};
use serde::{Deserialize, Serialize};

use crate::data_structures::{
    model::LoadedObject,
    scene_graph::{Generation, ModelGroup},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAxis {
    #[default]
    X,
    Y,
    Z,
}

impl LayoutAxis {
    pub fn unit(self) -> Vector3<f32> {
        match self {
            LayoutAxis::X => Vector3::unit_x(),
            LayoutAxis::Y => Vector3::unit_y(),
            LayoutAxis::Z => Vector3::unit_z(),
        }
    }

    pub fn component(self, v: Vector3<f32>) -> f32 {
        match self {
            LayoutAxis::X => v.x,
            LayoutAxis::Y => v.y,
            LayoutAxis::Z => v.z,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacingMode {
    #[default]
    Packed,
    PerObject,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutOptions {
    pub axis: LayoutAxis,
    pub spacing: f32,
    pub mode: SpacingMode,
}

impl LayoutOptions {
    pub const DEFAULT_SPACING: f32 = 1.0;
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            axis: LayoutAxis::default(),
            spacing: Self::DEFAULT_SPACING,
            mode: SpacingMode::default(),
        }
    }
}

/// Shifts the object's root so its bounding-box centre is at the origin.
/// Objects without geometry are left alone.
pub fn recenter(object: &mut LoadedObject) {
    let bounds = object.bounds();
    if bounds.is_empty() {
        return;
    }
    object.root.transform.position -= bounds.center().to_vec();
}

/// Offsets along the layout axis for objects of the given extents.
pub fn offsets(extents: &[f32], options: &LayoutOptions) -> Vec<f32> {
    match options.mode {
        SpacingMode::PerObject => extents
            .iter()
            .enumerate()
            .map(|(idx, size)| idx as f32 * (size + options.spacing))
            .collect(),
        SpacingMode::Packed => {
            let mut offsets = Vec::with_capacity(extents.len());
            let mut previous: Option<(f32, f32)> = None;
            for &size in extents {
                let offset = match previous {
                    None => 0.0,
                    Some((prev_offset, prev_size)) => {
                        prev_offset + prev_size / 2.0 + options.spacing + size / 2.0
                    }
                };
                offsets.push(offset);
                previous = Some((offset, size));
            }
            offsets
        }
    }
}

/// Recenters and arranges `objects` (in the given order) into a new group.
pub fn arrange(
    generation: Generation,
    objects: Vec<LoadedObject>,
    options: &LayoutOptions,
) -> ModelGroup {
    let mut objects = objects;
    objects.iter_mut().for_each(recenter);
    let extents: Vec<f32> = objects
        .iter()
        .map(|object| options.axis.component(object.bounds().size()))
        .collect();

    let mut group = ModelGroup::new(generation);
    for (mut object, offset) in objects.into_iter().zip(offsets(&extents, options)) {
        object.root.transform.position += options.axis.unit() * offset;
        log::debug!("Placed {} at {} along {:?}", object.name, offset, options.axis);
        group.add_child(object);
    }
    group
}
