//! Selection loader: joins the independent loads of one selection.
//!
//! Every selection starts a new [`Generation`]. Loads report back tagged with the
//! generation and the slot (request index) they were started for; results of an older
//! generation are dropped, and the finished selection hands out its objects in request
//! order no matter in which order the loads completed.

use crate::{
    catalog::AssetDescriptor,
    data_structures::{model::LoadedObject, scene_graph::Generation},
    resources::LoadError,
};

/// One load to start for a selection.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadRequest {
    pub generation: Generation,
    pub slot: usize,
    pub descriptor: AssetDescriptor,
}

#[derive(Debug)]
enum Slot {
    Waiting,
    Loaded(LoadedObject),
    Failed,
}

/// Outcome of feeding one completion into the loader.
#[derive(Debug)]
pub enum Completion {
    /// The completion belongs to a superseded selection and was discarded.
    Stale,
    /// The slot was already settled; the completion was discarded.
    Duplicate,
    Pending {
        remaining: usize,
    },
    /// Every slot is settled. `objects` are in request order, failed slots omitted.
    Ready {
        generation: Generation,
        objects: Vec<LoadedObject>,
        failures: usize,
    },
}

#[derive(Debug, Default)]
pub struct SelectionLoader {
    generation: Generation,
    slots: Vec<Slot>,
    // Set once `Ready` was handed out so a selection is only delivered once
    delivered: bool,
}

impl SelectionLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Starts a new selection; any loads still running for older ones become stale.
    pub fn begin(&mut self, descriptors: Vec<AssetDescriptor>) -> Vec<LoadRequest> {
        self.generation += 1;
        self.delivered = false;
        self.slots = descriptors.iter().map(|_| Slot::Waiting).collect();
        log::info!(
            "Selection {} started with {} asset(s)",
            self.generation,
            descriptors.len()
        );
        descriptors
            .into_iter()
            .enumerate()
            .map(|(slot, descriptor)| LoadRequest {
                generation: self.generation,
                slot,
                descriptor,
            })
            .collect()
    }

    /// Result for a selection without any requests, which is complete right away.
    pub fn poll_empty(&mut self) -> Option<Completion> {
        if self.slots.is_empty() && !self.delivered && self.generation > 0 {
            self.delivered = true;
            return Some(Completion::Ready {
                generation: self.generation,
                objects: Vec::new(),
                failures: 0,
            });
        }
        None
    }

    pub fn remaining(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Waiting))
            .count()
    }

    pub fn complete(
        &mut self,
        generation: Generation,
        slot: usize,
        result: Result<LoadedObject, LoadError>,
    ) -> Completion {
        if generation != self.generation || self.delivered {
            log::debug!(
                "Dropping completion for slot {} of stale selection {} (current {})",
                slot,
                generation,
                self.generation
            );
            return Completion::Stale;
        }
        let Some(entry) = self.slots.get_mut(slot) else {
            log::warn!("Completion for unknown slot {} of selection {}", slot, generation);
            return Completion::Duplicate;
        };
        if !matches!(entry, Slot::Waiting) {
            return Completion::Duplicate;
        }
        *entry = match result {
            Ok(object) => {
                log::debug!("Slot {} of selection {} loaded {}", slot, generation, object.name);
                Slot::Loaded(object)
            }
            Err(e) => {
                log::warn!("Slot {} of selection {} failed: {}", slot, generation, e);
                Slot::Failed
            }
        };

        let remaining = self.remaining();
        if remaining > 0 {
            return Completion::Pending { remaining };
        }

        self.delivered = true;
        let mut failures = 0;
        let objects = std::mem::take(&mut self.slots)
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Loaded(object) => Some(object),
                Slot::Failed => {
                    failures += 1;
                    None
                }
                Slot::Waiting => None,
            })
            .collect();
        Completion::Ready {
            generation,
            objects,
            failures,
        }
    }
}
