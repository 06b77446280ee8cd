//! Sounds
//!
//! A sound exports its config at `assets/sounds/<name>/index.json` and its
//! audio files below the same directory.

use serde_json::{Map, Value};

use super::ProjectKey;
use crate::error::{ProjectError, Result};
use crate::files::{
    asset_names, decode_config, encode_config, files_under, validate_path, File, Files,
    ASSET_CONFIG_FILE, SOUNDS_DIR,
};

/// A named audio asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Sound {
    name: String,
    config: Map<String, Value>,
    assets: Files,
    project: Option<ProjectKey>,
}

impl Sound {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Map::new(),
            assets: Files::new(),
            project: None,
        }
    }

    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    pub fn with_asset(mut self, path: &str, file: File) -> Result<Self> {
        self.set_asset(path, file)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.config
    }

    pub fn assets(&self) -> &Files {
        &self.assets
    }

    pub fn set_asset(&mut self, path: &str, file: File) -> Result<()> {
        validate_path(path)?;
        if path == ASSET_CONFIG_FILE {
            return Err(ProjectError::InvalidAssetPath {
                path: path.to_string(),
            });
        }
        self.assets.insert(path.to_string(), file);
        Ok(())
    }

    /// The project currently holding this sound.
    pub fn project(&self) -> Option<ProjectKey> {
        self.project
    }

    pub(crate) fn set_project(&mut self, project: Option<ProjectKey>) {
        self.project = project;
    }

    pub async fn load(name: &str, files: &Files) -> Result<Self> {
        let dir = asset_dir(name);
        let mut assets = files_under(files, &dir);
        let config = match assets.remove(ASSET_CONFIG_FILE) {
            Some(file) => decode_config(&format!("{}/{}", dir, ASSET_CONFIG_FILE), &file)?,
            None => Map::new(),
        };
        Ok(Self {
            name: name.to_string(),
            config,
            assets,
            project: None,
        })
    }

    pub async fn load_all(files: &Files) -> Result<Vec<Self>> {
        let mut sounds = Vec::new();
        for name in asset_names(files, SOUNDS_DIR) {
            sounds.push(Self::load(&name, files).await?);
        }
        Ok(sounds)
    }

    pub fn export(&self) -> Files {
        let dir = asset_dir(&self.name);
        let mut files = Files::new();
        files.insert(
            format!("{}/{}", dir, ASSET_CONFIG_FILE),
            encode_config(&self.config),
        );
        for (path, file) in &self.assets {
            files.insert(format!("{}/{}", dir, path), file.clone());
        }
        files
    }
}

fn asset_dir(name: &str) -> String {
    format!("{}/{}", SOUNDS_DIR, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_restores_exported_sound() {
        let sound = Sound::new("Meow")
            .with_config(json!({ "path": "meow.wav", "rate": 44100 }).as_object().unwrap().clone())
            .with_asset("meow.wav", File::from_bytes(vec![82, 73, 70, 70]))
            .unwrap();
        let files = sound.export();
        assert!(files.contains_key("assets/sounds/Meow/index.json"));
        assert!(files.contains_key("assets/sounds/Meow/meow.wav"));

        let loaded = Sound::load("Meow", &files).await.unwrap();
        assert_eq!(loaded, sound);
    }
}
