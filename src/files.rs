//! File Bundle
//!
//! A project travels as a flat map from relative path to file content. The
//! generated config document lives at [`CONFIG_PATH`]; every asset exports its
//! own entries next to it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{ProjectError, Result};

/// Path of the generated project config document.
pub const CONFIG_PATH: &str = "assets/index.json";

/// Config field holding the layering order of sprites.
pub const ZORDER_FIELD: &str = "zorder";

/// Name of the per-asset config file inside an asset directory.
pub const ASSET_CONFIG_FILE: &str = "index.json";

/// Directory holding one sub-directory per sprite.
pub const SPRITES_DIR: &str = "assets/sprites";

/// Directory holding one sub-directory per sound.
pub const SOUNDS_DIR: &str = "assets/sounds";

/// Root of all asset files.
pub const ASSETS_DIR: &str = "assets";

/// Script file of the stage.
pub const STAGE_CODE_FILE: &str = "main.spx";

/// Extension of sprite script files.
pub const CODE_EXTENSION: &str = "spx";

/// Mapping from relative path to file content.
pub type Files = BTreeMap<String, File>;

/// Immutable file content. Cloning shares the underlying buffer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct File {
    content: Arc<[u8]>,
}

impl File {
    /// Create a file from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content: Arc::from(bytes.into()),
        }
    }

    /// Create a file holding UTF-8 text.
    pub fn from_text(text: impl AsRef<str>) -> Self {
        Self::from_bytes(text.as_ref().as_bytes())
    }

    /// Raw content.
    pub fn bytes(&self) -> &[u8] {
        &self.content
    }

    /// Content as UTF-8 text, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text() {
            Some(text) if text.len() <= 64 => write!(f, "File({:?})", text),
            _ => write!(f, "File({} bytes)", self.content.len()),
        }
    }
}

impl From<&str> for File {
    fn from(text: &str) -> Self {
        File::from_text(text)
    }
}

impl From<Vec<u8>> for File {
    fn from(bytes: Vec<u8>) -> Self {
        File::from_bytes(bytes)
    }
}

/// Decode a config document. The document must be a JSON object.
pub fn decode_config(path: &str, file: &File) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_slice(file.bytes())
        .map_err(|e| ProjectError::malformed(path, e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ProjectError::malformed(
            path,
            format!("expected a JSON object, found {}", json_type_name(&other)),
        )),
    }
}

/// Encode a config document as pretty-printed JSON.
pub fn encode_config(document: &Map<String, Value>) -> File {
    // Display on a Value cannot fail, unlike the serializer entry points.
    File::from_text(format!("{:#}", Value::Object(document.clone())))
}

/// Check that a bundle path is relative and stays inside the bundle.
pub fn validate_path(path: &str) -> Result<()> {
    let invalid = path.is_empty()
        || Path::new(path)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
    if invalid {
        return Err(ProjectError::InvalidAssetPath {
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Files below `dir/`, keyed by their path relative to `dir`.
pub fn files_under(files: &Files, dir: &str) -> Files {
    let prefix = format!("{}/", dir);
    files
        .range(prefix.clone()..)
        .take_while(|(path, _)| path.starts_with(&prefix))
        .map(|(path, file)| (path[prefix.len()..].to_string(), file.clone()))
        .collect()
}

/// Names of the asset directories below `dir` that carry an `index.json`.
pub fn asset_names(files: &Files, dir: &str) -> Vec<String> {
    files_under(files, dir)
        .keys()
        .filter_map(|rel| rel.strip_suffix(&format!("/{}", ASSET_CONFIG_FILE)))
        .filter(|name| !name.contains('/'))
        .map(str::to_string)
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
