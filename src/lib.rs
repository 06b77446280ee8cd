//! spx-project - Project Model for Asset-Based Game Projects
//!
//! A project is a stage, named sprites, named sounds and a zorder (the
//! bottom-to-top layering of sprites). This crate keeps that model
//! consistent under edits and moves it in and out of storage.
//!
//! # Architecture
//!
//! - [`project`]: the live model, its file-bundle codec and change watchers
//! - [`assets`]: stage, sprite and sound types
//! - [`files`]: the bundle format (`path -> bytes`) and config documents
//! - [`persistence`]: cloud, local cache and `.gbp` archive adapters

pub mod assets;
pub mod cli;
pub mod error;
pub mod files;
pub mod persistence;
pub mod project;

pub use assets::{ProjectKey, Sound, Sprite, Stage};
pub use error::{ErrorKind, ProjectError, Result};
pub use files::{File, Files};
pub use persistence::{ArchiveCodec, CloudSource, CloudStore, LocalCache, ProjectData};
pub use project::{Metadata, Project, RevisionState, Snapshot, SyncOptions, Visibility, ZorderIndex};
