//! Asset loader adapter.
//!
//! Fetches the files named by an [`AssetDescriptor`] and parses them into a CPU-side
//! [`LoadedObject`]. Natively files are read with `tokio::fs` below the asset root, on
//! the web they are requested relative to the page origin.
//!
//! - `obj` loads OBJ geometry with its MTL material file (`tobj`)
//! - `gltf_scene` loads glTF 2.0 scenes, JSON or binary (`gltf`)

use std::sync::Arc;

use base64::Engine as _;
use thiserror::Error;

use crate::{
    catalog::{AssetDescriptor, AssetKind},
    data_structures::model::{LoadedObject, TextureData},
};

pub mod gltf_scene;
pub mod obj;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not fetch {path}: {reason}")]
    Fetch { path: String, reason: String },
    #[error("could not parse {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("{path} is not supported: {reason}")]
    Unsupported { path: String, reason: String },
    #[error("could not decode texture {path}: {reason}")]
    Texture { path: String, reason: String },
}

impl LoadError {
    pub fn path(&self) -> &str {
        match self {
            LoadError::Fetch { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::Unsupported { path, .. }
            | LoadError::Texture { path, .. } => path,
        }
    }
}

/// Where asset paths are resolved against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetSource {
    root: String,
}

impl AssetSource {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    #[cfg(target_arch = "wasm32")]
    fn format_url(&self, file_name: &str) -> Result<reqwest::Url, LoadError> {
        let fetch_err = |reason: String| LoadError::Fetch {
            path: file_name.to_string(),
            reason,
        };
        let origin = web_sys::window()
            .ok_or_else(|| fetch_err("no window".to_string()))?
            .location()
            .origin()
            .map_err(|_| fetch_err("no page origin".to_string()))?;
        let base = reqwest::Url::parse(&format!("{}/{}/", origin, self.root.trim_matches('/')))
            .map_err(|e| fetch_err(e.to_string()))?;
        base.join(file_name).map_err(|e| fetch_err(e.to_string()))
    }

    pub async fn load_binary(&self, file_name: &str) -> Result<Vec<u8>, LoadError> {
        let fetch_err = |reason: String| LoadError::Fetch {
            path: file_name.to_string(),
            reason,
        };
        #[cfg(target_arch = "wasm32")]
        let data = {
            let url = self.format_url(file_name)?;
            let response = reqwest::get(url)
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| fetch_err(e.to_string()))?;
            response
                .bytes()
                .await
                .map_err(|e| fetch_err(e.to_string()))?
                .to_vec()
        };
        #[cfg(not(target_arch = "wasm32"))]
        let data = {
            let path = std::path::Path::new(&self.root).join(file_name);
            tokio::fs::read(&path)
                .await
                .map_err(|e| fetch_err(format!("{} ({})", e, path.display())))?
        };
        Ok(data)
    }

    pub async fn load_string(&self, file_name: &str) -> Result<String, LoadError> {
        let data = self.load_binary(file_name).await?;
        String::from_utf8(data).map_err(|e| LoadError::Parse {
            path: file_name.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Resolves `reference` relative to the directory of `file`.
pub fn sibling(file: &str, reference: &str) -> String {
    match file.rsplit_once('/') {
        Some((dir, _)) if !reference.starts_with('/') => format!("{dir}/{reference}"),
        _ => reference.trim_start_matches('/').to_string(),
    }
}

/// Payload of an embedded `data:` URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}

/// Decodes a base64 `data:` URI. Returns `None` when `uri` is not a data URI at all.
pub fn decode_data_uri(uri: &str) -> Option<Result<DataUri, String>> {
    let rest = uri.strip_prefix("data:")?;
    let Some((header, payload)) = rest.split_once(',') else {
        return Some(Err("data URI without payload".to_string()));
    };
    let Some(mime_type) = header.strip_suffix(";base64") else {
        return Some(Err("only base64 data URIs are supported".to_string()));
    };
    let mime_type = (!mime_type.is_empty()).then(|| mime_type.to_string());
    Some(
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map(|data| DataUri { mime_type, data })
            .map_err(|e| e.to_string()),
    )
}

/// Decodes an image file into RGBA8. `mime_type` is a hint; without one the format is guessed.
pub fn decode_texture(
    label: &str,
    bytes: &[u8],
    mime_type: Option<&str>,
) -> Result<Arc<TextureData>, LoadError> {
    let format = mime_type.and_then(image::ImageFormat::from_mime_type);
    let img = match format {
        Some(format) => image::load_from_memory_with_format(bytes, format),
        None => image::load_from_memory(bytes),
    }
    .map_err(|e| LoadError::Texture {
        path: label.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Arc::new(TextureData {
        label: label.to_string(),
        image: img.to_rgba8(),
    }))
}

/// Fetches and decodes a texture. Failures are logged and yield no texture.
pub async fn load_texture(source: &AssetSource, path: &str) -> Option<Arc<TextureData>> {
    let decoded = match source.load_binary(path).await {
        Ok(bytes) => decode_texture(path, &bytes, None),
        Err(e) => Err(e),
    };
    match decoded {
        Ok(texture) => Some(texture),
        Err(e) => {
            log::warn!("Colour map dropped: {}", e);
            None
        }
    }
}

/// Loads one asset with the loader its file type requires.
pub async fn load_object(
    source: &AssetSource,
    descriptor: &AssetDescriptor,
) -> Result<LoadedObject, LoadError> {
    log::debug!("Loading {} from {}", descriptor.display_name, descriptor.primary);
    match descriptor.kind() {
        Some(AssetKind::Obj) => obj::load_model_obj(source, descriptor).await,
        Some(AssetKind::Gltf) => gltf_scene::load_model_gltf(source, descriptor).await,
        None => Err(LoadError::Unsupported {
            path: descriptor.primary.clone(),
            reason: "unknown file extension".to_string(),
        }),
    }
}
