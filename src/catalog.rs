//! Asset catalog: the fixed mapping from display names to loadable assets.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One loadable unit: a primary geometry/scene file and an optional material file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub display_name: String,
    pub primary: String,
    #[serde(default)]
    pub auxiliary: Option<String>,
}

/// The loader variant needed for an asset, derived from the primary file's extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Gltf,
    Obj,
}

impl AssetDescriptor {
    pub fn new(display_name: &str, primary: &str, auxiliary: Option<&str>) -> Self {
        Self {
            display_name: display_name.to_string(),
            primary: primary.to_string(),
            auxiliary: auxiliary.map(str::to_string),
        }
    }

    /// An OBJ with the MTL file of the same stem next to it.
    pub fn obj_pair(display_name: &str, stem: &str) -> Self {
        Self::new(
            display_name,
            &format!("{stem}.obj"),
            Some(&format!("{stem}.mtl")),
        )
    }

    pub fn kind(&self) -> Option<AssetKind> {
        let ext = self.primary.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "glb" | "gltf" => Some(AssetKind::Gltf),
            "obj" => Some(AssetKind::Obj),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no catalog entry named `{0}`")]
    UnknownEntry(String),
    #[error("catalog entry `{0}` is defined twice")]
    DuplicateEntry(String),
}

/// Ordered descriptors with unique names plus named collections of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogFile", into = "CatalogFile")]
pub struct Catalog {
    entries: Vec<AssetDescriptor>,
    collections: Vec<(String, Vec<String>)>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(entries: Vec<AssetDescriptor>) -> Result<Self, CatalogError> {
        let mut by_name = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if by_name.insert(entry.display_name.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateEntry(entry.display_name.clone()));
            }
        }
        Ok(Self {
            entries,
            collections: Vec::new(),
            by_name,
        })
    }

    /// Adds a name that resolves to several entries at once. Members must exist.
    pub fn with_collection(mut self, name: &str, members: &[&str]) -> Result<Self, CatalogError> {
        if self.by_name.contains_key(name) || self.collections.iter().any(|(n, _)| n == name) {
            return Err(CatalogError::DuplicateEntry(name.to_string()));
        }
        if let Some(missing) = members.iter().find(|m| !self.by_name.contains_key(**m)) {
            return Err(CatalogError::UnknownEntry(missing.to_string()));
        }
        self.collections.push((
            name.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        ));
        Ok(self)
    }

    pub fn entries(&self) -> &[AssetDescriptor] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&AssetDescriptor> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    /// Display names in UI order: single entries first, then collections.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .map(|e| e.display_name.as_str())
            .chain(self.collections.iter().map(|(name, _)| name.as_str()))
    }

    /// Resolves a UI name to the descriptors it stands for, in request order.
    pub fn resolve(&self, name: &str) -> Result<Vec<AssetDescriptor>, CatalogError> {
        if let Some(entry) = self.get(name) {
            return Ok(vec![entry.clone()]);
        }
        self.collections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, members)| {
                members
                    .iter()
                    .filter_map(|m| self.get(m).cloned())
                    .collect()
            })
            .ok_or_else(|| CatalogError::UnknownEntry(name.to_string()))
    }
}

impl Default for Catalog {
    /// The room scene and the "Meir" OBJ/MTL series shipped with the demo assets.
    fn default() -> Self {
        let meir = ["MB01", "MB02", "MB03", "MB04"];
        let mut entries = vec![AssetDescriptor::new("Room", "room.glb", None)];
        entries.extend(
            meir.iter()
                .map(|name| AssetDescriptor::obj_pair(name, &format!("Meir/{name}"))),
        );
        let by_name = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.display_name.clone(), idx))
            .collect();
        Self {
            entries,
            collections: vec![(
                "Meir".to_string(),
                meir.iter().map(|name| name.to_string()).collect(),
            )],
            by_name,
        }
    }
}

/// Serialized form: a flat entry list and a name -> members map.
#[derive(Serialize, Deserialize)]
struct CatalogFile {
    entries: Vec<AssetDescriptor>,
    #[serde(default)]
    collections: Vec<CollectionFile>,
}

#[derive(Serialize, Deserialize)]
struct CollectionFile {
    name: String,
    members: Vec<String>,
}

impl TryFrom<CatalogFile> for Catalog {
    type Error = CatalogError;

    fn try_from(file: CatalogFile) -> Result<Self, Self::Error> {
        file.collections
            .iter()
            .try_fold(Catalog::new(file.entries)?, |catalog, c| {
                let members: Vec<&str> = c.members.iter().map(String::as_str).collect();
                catalog.with_collection(&c.name, &members)
            })
    }
}

impl From<Catalog> for CatalogFile {
    fn from(catalog: Catalog) -> Self {
        CatalogFile {
            entries: catalog.entries,
            collections: catalog
                .collections
                .into_iter()
                .map(|(name, members)| CollectionFile { name, members })
                .collect(),
        }
    }
}
