//! Assets Module
//!
//! The stage, sprites and sounds that make up a project. Sprites and sounds
//! remember which project currently holds them through a [`ProjectKey`]; that
//! key is a plain relation, the project alone owns the asset.

pub mod sound;
pub mod sprite;
pub mod stage;

use std::fmt;

use uuid::Uuid;

pub use sound::Sound;
pub use sprite::Sprite;
pub use stage::Stage;

/// Identifies one in-memory project instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectKey(Uuid);

impl ProjectKey {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
