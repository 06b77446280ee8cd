//! Sprites
//!
//! A sprite exports three kinds of entries: its script at `<name>.spx`, its
//! config at `assets/sprites/<name>/index.json`, and its costume files below
//! the same directory.

use log::debug;
use serde_json::{Map, Value};

use super::ProjectKey;
use crate::error::{ProjectError, Result};
use crate::files::{
    asset_names, decode_config, encode_config, files_under, validate_path, File, Files,
    ASSET_CONFIG_FILE, CODE_EXTENSION, SPRITES_DIR,
};

/// A named, scriptable asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    name: String,
    code: String,
    config: Map<String, Value>,
    assets: Files,
    project: Option<ProjectKey>,
    disposed: bool,
}

impl Sprite {
    /// Create an empty sprite.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: String::new(),
            config: Map::new(),
            assets: Files::new(),
            project: None,
            disposed: false,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    /// Add an asset file, keyed relative to the sprite's asset directory.
    pub fn with_asset(mut self, path: &str, file: File) -> Result<Self> {
        self.set_asset(path, file)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the sprite.
    ///
    /// Inside a project, rename through [`crate::Project::rename_sprite`] or
    /// [`crate::Project::update_sprite`] so the layering order follows.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
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

    /// Insert or replace an asset file.
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

    pub fn remove_asset(&mut self, path: &str) -> Option<File> {
        self.assets.remove(path)
    }

    /// The project currently holding this sprite.
    pub fn project(&self) -> Option<ProjectKey> {
        self.project
    }

    pub(crate) fn set_project(&mut self, project: Option<ProjectKey>) {
        self.project = project;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release the sprite. A disposed sprite no longer belongs to any project.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        debug!("Disposing sprite {}", self.name);
        self.disposed = true;
        self.project = None;
    }

    /// Load the sprite called `name` from a bundle.
    pub async fn load(name: &str, files: &Files) -> Result<Self> {
        let dir = asset_dir(name);
        let mut assets = files_under(files, &dir);
        let config_path = format!("{}/{}", dir, ASSET_CONFIG_FILE);
        let config = match assets.remove(ASSET_CONFIG_FILE) {
            Some(file) => decode_config(&config_path, &file)?,
            None => Map::new(),
        };
        let code_path = code_path(name);
        let code = match files.get(&code_path) {
            Some(file) => file
                .text()
                .ok_or_else(|| ProjectError::malformed(&code_path, "script is not valid UTF-8"))?
                .to_string(),
            None => String::new(),
        };

        Ok(Self {
            name: name.to_string(),
            code,
            config,
            assets,
            project: None,
            disposed: false,
        })
    }

    /// Load every sprite found in a bundle.
    pub async fn load_all(files: &Files) -> Result<Vec<Self>> {
        let mut sprites = Vec::new();
        for name in asset_names(files, SPRITES_DIR) {
            sprites.push(Self::load(&name, files).await?);
        }
        Ok(sprites)
    }

    /// Export the sprite's bundle entries.
    pub fn export(&self) -> Files {
        let dir = asset_dir(&self.name);
        let mut files = Files::new();
        files.insert(code_path(&self.name), File::from_text(&self.code));
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
    format!("{}/{}", SPRITES_DIR, name)
}

fn code_path(name: &str) -> String {
    format!("{}.{}", name, CODE_EXTENSION)
}
