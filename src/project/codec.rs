//! Conversion between a live project and its (metadata, files) snapshot.

use log::info;
use serde_json::{Map, Value};

use super::{Metadata, Project, RevisionState, Snapshot, Zorder};
use crate::assets::{Sound, Sprite, Stage};
use crate::error::{ProjectError, Result};
use crate::files::{decode_config, encode_config, Files, CONFIG_PATH, ZORDER_FIELD};

impl Project {
    /// Export the full snapshot, revision state included.
    pub fn export(&self) -> Snapshot {
        let mut snapshot = self.export_without_revision_state();
        snapshot.metadata.revision = self.revision_state();
        snapshot
    }

    /// Export identity, visibility and files only. Used to detect content
    /// changes; never persisted.
    pub fn export_without_revision_state(&self) -> Snapshot {
        let metadata = Metadata {
            id: self.id.clone(),
            owner: self.owner.clone(),
            name: self.name.clone(),
            visibility: Some(self.visibility),
            revision: RevisionState::default(),
        };

        let (mut config, mut files) = self.stage.export();
        config.insert(
            ZORDER_FIELD.to_string(),
            Value::from(self.zorder.as_slice().to_vec()),
        );
        files.insert(CONFIG_PATH.to_string(), encode_config(&config));
        for sprite in &self.sprites {
            files.extend(sprite.export());
        }
        for sound in &self.sounds {
            files.extend(sound.export());
        }

        Snapshot { metadata, files }
    }

    /// Replace the whole project with the content of a snapshot.
    ///
    /// Stage, sounds and sprites are read concurrently. Loaded sprites and
    /// sounds then go through the same naming and zorder wiring as
    /// [`Project::add_sprite`] / [`Project::add_sound`].
    pub async fn load(&mut self, metadata: Metadata, files: Files) -> Result<()> {
        let mut config = match files.get(CONFIG_PATH) {
            Some(file) => decode_config(CONFIG_PATH, file)?,
            None => Map::new(),
        };
        let zorder = match config.remove(ZORDER_FIELD) {
            Some(value) => serde_json::from_value::<Vec<String>>(value).map_err(|e| {
                ProjectError::malformed(
                    CONFIG_PATH,
                    format!("{} must be a list of names: {}", ZORDER_FIELD, e),
                )
            })?,
            None => Vec::new(),
        };

        let (stage, sounds, sprites) = tokio::try_join!(
            Stage::load(config, &files),
            Sound::load_all(&files),
            Sprite::load_all(&files)
        )?;

        for mut sprite in self.sprites.drain(..) {
            sprite.dispose();
        }
        for mut sound in self.sounds.drain(..) {
            sound.set_project(None);
        }

        self.assign_metadata(metadata);
        self.stage = stage;
        self.zorder = Zorder::from_names(zorder);
        for sound in sounds {
            self.insert_sound(sound);
        }
        for sprite in sprites {
            self.insert_sprite(sprite);
        }
        let live: Vec<String> = self.sprites.iter().map(|s| s.name().to_string()).collect();
        self.zorder.retain_live(live.iter().map(String::as_str));

        info!(
            "Loaded project {} ({} sprites, {} sounds)",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.sprites.len(),
            self.sounds.len()
        );
        self.notify_changed();
        Ok(())
    }

    fn revision_state(&self) -> RevisionState {
        RevisionState {
            version: Some(self.version),
            c_time: self.c_time,
            u_time: self.u_time,
            has_unsynced_changes: Some(self.has_unsynced_changes),
        }
    }
}
