//! Stage
//!
//! The stage owns the top-level config document (minus the layering order,
//! which the project manages), the `main.spx` script, and any asset file under
//! `assets/` that belongs to neither a sprite nor a sound.

use serde_json::{Map, Value};

use crate::error::{ProjectError, Result};
use crate::files::{
    files_under, validate_path, File, Files, ASSETS_DIR, ASSET_CONFIG_FILE, STAGE_CODE_FILE,
};

const SPRITES_SUBDIR: &str = "sprites/";
const SOUNDS_SUBDIR: &str = "sounds/";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stage {
    code: String,
    config: Map<String, Value>,
    assets: Files,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
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

    /// Insert or replace a stage asset, keyed relative to `assets/`.
    pub fn set_asset(&mut self, path: &str, file: File) -> Result<()> {
        validate_path(path)?;
        if !is_stage_asset(path) {
            return Err(ProjectError::InvalidAssetPath {
                path: path.to_string(),
            });
        }
        self.assets.insert(path.to_string(), file);
        Ok(())
    }

    /// Load the stage from its config document and the bundle.
    pub async fn load(config: Map<String, Value>, files: &Files) -> Result<Self> {
        let code = match files.get(STAGE_CODE_FILE) {
            Some(file) => file
                .text()
                .ok_or_else(|| {
                    ProjectError::malformed(STAGE_CODE_FILE, "script is not valid UTF-8")
                })?
                .to_string(),
            None => String::new(),
        };
        let assets = files_under(files, ASSETS_DIR)
            .into_iter()
            .filter(|(path, _)| is_stage_asset(path))
            .collect();
        Ok(Self {
            code,
            config,
            assets,
        })
    }

    /// Export the stage's config document and files.
    pub fn export(&self) -> (Map<String, Value>, Files) {
        let mut files = Files::new();
        files.insert(STAGE_CODE_FILE.to_string(), File::from_text(&self.code));
        for (path, file) in &self.assets {
            files.insert(format!("{}/{}", ASSETS_DIR, path), file.clone());
        }
        (self.config.clone(), files)
    }
}

fn is_stage_asset(path: &str) -> bool {
    path != ASSET_CONFIG_FILE && !path.starts_with(SPRITES_SUBDIR) && !path.starts_with(SOUNDS_SUBDIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_load_picks_only_stage_files() {
        let mut files = Files::new();
        files.insert("main.spx".into(), File::from_text("onStart => {}"));
        files.insert("assets/index.json".into(), File::from_text("{}"));
        files.insert("assets/backdrops/sky.png".into(), File::from_bytes(vec![1, 2]));
        files.insert("assets/sprites/Hero/index.json".into(), File::from_text("{}"));
        files.insert("assets/sounds/Meow/index.json".into(), File::from_text("{}"));

        let config = json!({ "backdropIndex": 0 }).as_object().unwrap().clone();
        let stage = Stage::load(config.clone(), &files).await.unwrap();
        assert_eq!(stage.code(), "onStart => {}");
        assert_eq!(stage.config(), &config);
        assert_eq!(stage.assets().len(), 1);
        assert!(stage.assets().contains_key("backdrops/sky.png"));
    }

    #[test]
    fn test_stage_asset_outside_reserved_dirs() {
        let mut stage = Stage::new();
        assert!(stage.set_asset("backdrops/sky.png", File::from_bytes(vec![0])).is_ok());
        assert!(stage.set_asset("sprites/Hero/x.png", File::from_bytes(vec![0])).is_err());
        assert!(stage.set_asset("index.json", File::from_text("{}")).is_err());
    }

    #[test]
    fn test_export_places_assets_under_assets_dir() {
        let mut stage = Stage::new();
        stage.set_asset("backdrops/sky.png", File::from_bytes(vec![0])).unwrap();
        let (_, files) = stage.export();
        assert!(files.contains_key("main.spx"));
        assert!(files.contains_key("assets/backdrops/sky.png"));
    }
}
