//! Persistence Module
//!
//! Contracts for the three places a project snapshot can go: the cloud, a
//! local cache, and a single-file archive. Bundled implementations cover an
//! in-memory cloud, a directory-backed cache, an in-memory cache and the
//! `.gbp` zip archive.

pub mod cloud;
pub mod gbp;
pub mod local_cache;

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::files::Files;
use crate::project::{Metadata, Snapshot};

pub use cloud::MemoryCloud;
pub use gbp::GbpArchive;
pub use local_cache::{FsLocalCache, MemoryLocalCache};

/// Raw project record as the cloud returns it: metadata plus a URL per file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    #[serde(flatten)]
    pub metadata: Metadata,
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

/// Where [`crate::Project::load_from_cloud`] reads from.
#[derive(Debug, Clone)]
pub enum CloudSource {
    /// Look the project up by owner and name.
    Named { owner: String, name: String },
    /// A record that was already fetched.
    Payload(ProjectData),
}

impl CloudSource {
    pub fn named(owner: impl Into<String>, name: impl Into<String>) -> Self {
        CloudSource::Named {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl From<ProjectData> for CloudSource {
    fn from(data: ProjectData) -> Self {
        CloudSource::Payload(data)
    }
}

/// Remote project storage.
pub trait CloudStore {
    fn load(&self, owner: &str, name: &str) -> impl Future<Output = Result<Snapshot>> + Send;

    /// Resolve an already-fetched record into a snapshot.
    fn parse(&self, data: &ProjectData) -> impl Future<Output = Result<Snapshot>> + Send;

    /// Store a snapshot. Returns the server-assigned metadata (id, version,
    /// timestamps).
    fn save(
        &self,
        metadata: &Metadata,
        files: &Files,
    ) -> impl Future<Output = Result<Metadata>> + Send;
}

/// Keyed snapshot storage on the local machine.
pub trait LocalCache {
    /// `Ok(None)` when nothing is stored under `key`.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<Snapshot>>> + Send;

    fn save(
        &self,
        key: &str,
        metadata: &Metadata,
        files: &Files,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Single-blob packaging of a snapshot.
pub trait ArchiveCodec {
    fn decode(&self, blob: &[u8]) -> impl Future<Output = Result<Snapshot>> + Send;

    fn encode(
        &self,
        metadata: &Metadata,
        files: &Files,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}
