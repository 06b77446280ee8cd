//! Project Model
//!
//! A project is a stage, a list of sprites, a list of sounds and the zorder.
//! All mutation goes through methods on [`Project`]; each one keeps names
//! unique, keeps the zorder a permutation of the sprite names, and then
//! notifies the installed watchers.

pub mod codec;
pub mod metadata;
pub mod naming;
pub mod persist;
pub mod watch;
pub mod zorder;

use chrono::{DateTime, Utc};
use log::debug;

use crate::assets::{ProjectKey, Sound, Sprite, Stage};
use crate::error::{ProjectError, Result};

pub use metadata::{Metadata, RevisionState, Snapshot, Visibility};
pub use naming::{
    unique_name, validate_name, DEFAULT_SOUND_NAME, DEFAULT_SPRITE_NAME, RESERVED_SPRITE_NAMES,
};
pub use watch::SyncOptions;
pub use zorder::{Zorder, ZorderIndex};

use watch::Watcher;

/// In-memory project model.
#[derive(Debug)]
pub struct Project {
    key: ProjectKey,

    id: Option<String>,
    owner: Option<String>,
    name: Option<String>,
    visibility: Visibility,

    version: u64,
    c_time: Option<DateTime<Utc>>,
    u_time: Option<DateTime<Utc>>,
    has_unsynced_changes: bool,

    stage: Stage,
    sprites: Vec<Sprite>,
    sounds: Vec<Sound>,
    zorder: Zorder,

    watchers: Vec<Watcher>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// Create an empty project.
    pub fn new() -> Self {
        Self {
            key: ProjectKey::new(),
            id: None,
            owner: None,
            name: None,
            visibility: Visibility::default(),
            version: 0,
            c_time: None,
            u_time: None,
            has_unsynced_changes: false,
            stage: Stage::new(),
            sprites: Vec::new(),
            sounds: Vec::new(),
            zorder: Zorder::new(),
            watchers: Vec::new(),
        }
    }

    /// Create an empty project owned by `owner` and called `name`.
    pub fn with_identity(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let mut project = Self::new();
        project.owner = Some(owner.into());
        project.name = Some(name.into());
        project
    }

    /// Identity of this in-memory instance, as seen by its assets.
    pub fn key(&self) -> ProjectKey {
        self.key
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn c_time(&self) -> Option<DateTime<Utc>> {
        self.c_time
    }

    pub fn u_time(&self) -> Option<DateTime<Utc>> {
        self.u_time
    }

    /// True when content changed since the last successful cloud save.
    pub fn has_unsynced_changes(&self) -> bool {
        self.has_unsynced_changes
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    pub fn zorder(&self) -> &[String] {
        self.zorder.as_slice()
    }

    pub fn sprite(&self, name: &str) -> Option<&Sprite> {
        self.sprites.iter().find(|s| s.name() == name)
    }

    pub fn sound(&self, name: &str) -> Option<&Sound> {
        self.sounds.iter().find(|s| s.name() == name)
    }

    // === Sprites ===

    /// Add a sprite under a name unique among the sprites. Returns that name.
    pub fn add_sprite(&mut self, sprite: Sprite) -> String {
        let name = self.insert_sprite(sprite);
        debug!("Added sprite {}", name);
        self.notify_changed();
        name
    }

    /// Remove a sprite and dispose it.
    pub fn remove_sprite(&mut self, name: &str) -> Result<Sprite> {
        let idx = self.sprite_index(name)?;
        let mut sprite = self.sprites.remove(idx);
        self.dispose_sprite(&mut sprite);
        debug!("Removed sprite {}", name);
        self.notify_changed();
        Ok(sprite)
    }

    /// Rename a sprite in place; its zorder position is kept.
    pub fn rename_sprite(&mut self, name: &str, new_name: &str) -> Result<()> {
        self.update_sprite(name, |sprite| sprite.set_name(new_name))
    }

    /// Edit a sprite.
    ///
    /// A rename done inside `f` is carried over to the zorder. If the new
    /// name is not a valid path segment (`InvalidAssetPath`), is reserved or
    /// already used by another sprite (`NameConflict`), the old name is
    /// restored and the error returned. Disposing the sprite inside `f`
    /// removes it.
    pub fn update_sprite<R>(&mut self, name: &str, f: impl FnOnce(&mut Sprite) -> R) -> Result<R> {
        let idx = self.sprite_index(name)?;
        let out = f(&mut self.sprites[idx]);

        let new_name = self.sprites[idx].name().to_string();
        let mut rejected = None;
        if new_name != name {
            let taken = RESERVED_SPRITE_NAMES.contains(&new_name.as_str())
                || self
                    .sprites
                    .iter()
                    .enumerate()
                    .any(|(i, s)| i != idx && s.name() == new_name);
            if let Err(e) = validate_name(&new_name) {
                self.sprites[idx].set_name(name);
                rejected = Some(e);
            } else if taken {
                self.sprites[idx].set_name(name);
                rejected = Some(ProjectError::NameConflict { name: new_name });
            } else {
                debug!("Renamed sprite {} to {}", name, new_name);
                self.zorder.rename(name, &new_name);
            }
        }

        if self.sprites[idx].is_disposed() {
            let sprite = self.sprites.remove(idx);
            self.zorder.remove(sprite.name());
        }

        self.notify_changed();
        match rejected {
            Some(e) => Err(e),
            None => Ok(out),
        }
    }

    /// Move a sprite to `target` in the zorder.
    pub fn set_sprite_zorder_idx(&mut self, name: &str, target: impl Into<ZorderIndex>) -> Result<()> {
        let idx = self.zorder.move_to(name, target.into())?;
        debug!("Moved sprite {} to zorder index {}", name, idx);
        self.notify_changed();
        Ok(())
    }

    pub fn up_sprite_zorder(&mut self, name: &str) -> Result<()> {
        self.set_sprite_zorder_idx(name, ZorderIndex::up())
    }

    pub fn down_sprite_zorder(&mut self, name: &str) -> Result<()> {
        self.set_sprite_zorder_idx(name, ZorderIndex::down())
    }

    pub fn top_sprite_zorder(&mut self, name: &str) -> Result<()> {
        self.set_sprite_zorder_idx(name, ZorderIndex::top())
    }

    pub fn bottom_sprite_zorder(&mut self, name: &str) -> Result<()> {
        self.set_sprite_zorder_idx(name, ZorderIndex::bottom())
    }

    // === Sounds ===

    /// Add a sound under a name unique among the sounds. Returns that name.
    pub fn add_sound(&mut self, sound: Sound) -> String {
        let name = self.insert_sound(sound);
        debug!("Added sound {}", name);
        self.notify_changed();
        name
    }

    /// Remove a sound. The sound is detached, not disposed.
    pub fn remove_sound(&mut self, name: &str) -> Result<Sound> {
        let idx = self.sound_index(name)?;
        let mut sound = self.sounds.remove(idx);
        sound.set_project(None);
        debug!("Removed sound {}", name);
        self.notify_changed();
        Ok(sound)
    }

    pub fn rename_sound(&mut self, name: &str, new_name: &str) -> Result<()> {
        self.update_sound(name, |sound| sound.set_name(new_name))
    }

    /// Edit a sound. An invalid name (`InvalidAssetPath`) or a rename onto a
    /// sibling's name (`NameConflict`) is reverted.
    pub fn update_sound<R>(&mut self, name: &str, f: impl FnOnce(&mut Sound) -> R) -> Result<R> {
        let idx = self.sound_index(name)?;
        let out = f(&mut self.sounds[idx]);

        let new_name = self.sounds[idx].name().to_string();
        let mut rejected = None;
        if new_name != name {
            let taken = self
                .sounds
                .iter()
                .enumerate()
                .any(|(i, s)| i != idx && s.name() == new_name);
            if let Err(e) = validate_name(&new_name) {
                rejected = Some(e);
            } else if taken {
                rejected = Some(ProjectError::NameConflict { name: new_name });
            }
            if rejected.is_some() {
                self.sounds[idx].set_name(name);
            }
        }

        self.notify_changed();
        match rejected {
            Some(e) => Err(e),
            None => Ok(out),
        }
    }

    // === Stage & metadata ===

    pub fn update_stage<R>(&mut self, f: impl FnOnce(&mut Stage) -> R) -> R {
        let out = f(&mut self.stage);
        self.notify_changed();
        out
    }

    /// Assign every field present in `metadata`; absent fields are left alone.
    pub fn apply_metadata(&mut self, metadata: Metadata) {
        self.assign_metadata(metadata);
        self.notify_changed();
    }

    /// Dispose every sprite and stop watching for changes.
    pub fn dispose(&mut self) {
        self.watchers.clear();
        let mut sprites = std::mem::take(&mut self.sprites);
        for sprite in &mut sprites {
            self.dispose_sprite(sprite);
        }
        debug!("Disposed project {}", self.key);
    }

    // === Internals ===

    fn assign_metadata(&mut self, metadata: Metadata) {
        let Metadata {
            id,
            owner,
            name,
            visibility,
            revision,
        } = metadata;
        if id.is_some() {
            self.id = id;
        }
        if owner.is_some() {
            self.owner = owner;
        }
        if name.is_some() {
            self.name = name;
        }
        if let Some(visibility) = visibility {
            self.visibility = visibility;
        }
        if let Some(version) = revision.version {
            self.version = version;
        }
        if revision.c_time.is_some() {
            self.c_time = revision.c_time;
        }
        if revision.u_time.is_some() {
            self.u_time = revision.u_time;
        }
        if let Some(flag) = revision.has_unsynced_changes {
            self.has_unsynced_changes = flag;
        }
    }

    fn set_has_unsynced_changes(&mut self, flag: bool) {
        self.has_unsynced_changes = flag;
        self.notify_changed();
    }

    fn insert_sprite(&mut self, mut sprite: Sprite) -> String {
        let name = unique_name(
            sprite.name(),
            DEFAULT_SPRITE_NAME,
            self.sprites
                .iter()
                .map(Sprite::name)
                .chain(RESERVED_SPRITE_NAMES.iter().copied()),
        );
        sprite.set_name(name.clone());
        sprite.set_project(Some(self.key));
        self.sprites.push(sprite);
        self.zorder.push_if_absent(&name);
        name
    }

    fn insert_sound(&mut self, mut sound: Sound) -> String {
        let name = unique_name(
            sound.name(),
            DEFAULT_SOUND_NAME,
            self.sounds.iter().map(Sound::name),
        );
        sound.set_name(name.clone());
        sound.set_project(Some(self.key));
        self.sounds.push(sound);
        name
    }

    fn dispose_sprite(&mut self, sprite: &mut Sprite) {
        self.zorder.remove(sprite.name());
        sprite.dispose();
    }

    fn sprite_index(&self, name: &str) -> Result<usize> {
        self.sprites
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| ProjectError::SpriteNotFound {
                name: name.to_string(),
            })
    }

    fn sound_index(&self, name: &str) -> Result<usize> {
        self.sounds
            .iter()
            .position(|s| s.name() == name)
            .ok_or_else(|| ProjectError::SoundNotFound {
                name: name.to_string(),
            })
    }

    /// Run the watchers, in installation order, against the current state.
    fn notify_changed(&mut self) {
        if self.watchers.is_empty() {
            return;
        }
        let mut watchers = std::mem::take(&mut self.watchers);
        for watcher in &mut watchers {
            watcher.observe(self);
        }
        self.watchers = watchers;
    }
}
