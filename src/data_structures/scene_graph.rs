//! Scene graph: the scene and the single model group it displays.
//!
//! A [`ModelGroup`] is assembled off-scene and only attached once all of its
//! constituents are known, so the scene never shows a half-loaded selection.

use crate::data_structures::{bounds::Aabb, instance::Instance, model::LoadedObject};

/// Monotonically increasing selection counter; see [`crate::loader`].
pub type Generation = u64;

/// A container node owning the objects of one selection, in layout order.
#[derive(Clone, Debug, Default)]
pub struct ModelGroup {
    pub generation: Generation,
    pub transform: Instance,
    children: Vec<LoadedObject>,
}

impl ModelGroup {
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            transform: Instance::default(),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: LoadedObject) {
        self.children.push(child);
    }

    pub fn get_children(&self) -> &Vec<LoadedObject> {
        &self.children
    }

    pub fn get_children_mut(&mut self) -> &mut Vec<LoadedObject> {
        &mut self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// World-space bounds of every object in the group.
    pub fn bounds(&self) -> Aabb {
        self.children.iter().fold(Aabb::empty(), |acc, child| {
            acc.union(&child.root.bounds_in(&self.transform))
        })
    }
}

/// The displayed scene. Holds at most one group at a time.
#[derive(Debug, Default)]
pub struct Scene {
    group: Option<ModelGroup>,
    attach_count: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `group`, returning the group it replaces so the caller can dispose of it.
    pub fn attach(&mut self, group: ModelGroup) -> Option<ModelGroup> {
        self.attach_count += 1;
        self.group.replace(group)
    }

    pub fn detach(&mut self) -> Option<ModelGroup> {
        self.group.take()
    }

    pub fn group(&self) -> Option<&ModelGroup> {
        self.group.as_ref()
    }

    pub fn group_mut(&mut self) -> Option<&mut ModelGroup> {
        self.group.as_mut()
    }

    /// How many groups have been attached over the scene's lifetime.
    pub fn attach_count(&self) -> usize {
        self.attach_count
    }
}
