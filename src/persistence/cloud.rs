//! In-memory cloud store.
//!
//! File contents are uploaded once per distinct content and addressed by
//! their SHA-256 digest; a project record maps each path to such a URL.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use log::info;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{CloudStore, ProjectData};
use crate::error::{ProjectError, Result};
use crate::files::{validate_path, File, Files};
use crate::project::{Metadata, RevisionState, Snapshot};

/// URL scheme of blobs held by [`MemoryCloud`].
pub const BLOB_SCHEME: &str = "mem://";

#[derive(Debug, Default)]
struct CloudState {
    projects: HashMap<(String, String), ProjectData>,
    blobs: HashMap<String, File>,
}

/// A cloud store living in process memory.
#[derive(Debug, Default)]
pub struct MemoryCloud {
    state: Mutex<CloudState>,
}

impl MemoryCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the raw record of a project.
    pub fn fetch(&self, owner: &str, name: &str) -> Result<ProjectData> {
        self.state()
            .projects
            .get(&(owner.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| ProjectError::CloudProjectNotFound {
                owner: owner.to_string(),
                name: name.to_string(),
            })
    }

    pub fn project_count(&self) -> usize {
        self.state().projects.len()
    }

    pub fn blob_count(&self) -> usize {
        self.state().blobs.len()
    }

    fn state(&self) -> MutexGuard<'_, CloudState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn blob_url(file: &File) -> String {
    format!("{}{:x}", BLOB_SCHEME, Sha256::digest(file.bytes()))
}

impl CloudStore for MemoryCloud {
    async fn load(&self, owner: &str, name: &str) -> Result<Snapshot> {
        let data = self.fetch(owner, name)?;
        self.parse(&data).await
    }

    async fn parse(&self, data: &ProjectData) -> Result<Snapshot> {
        let state = self.state();
        let mut files = Files::new();
        for (path, url) in &data.files {
            let file = state.blobs.get(url).ok_or_else(|| ProjectError::Cloud {
                reason: format!("missing blob {} for {}", url, path),
            })?;
            files.insert(path.clone(), file.clone());
        }
        Ok(Snapshot::new(data.metadata.clone(), files))
    }

    async fn save(&self, metadata: &Metadata, files: &Files) -> Result<Metadata> {
        let (owner, name) = match (&metadata.owner, &metadata.name) {
            (Some(owner), Some(name)) => (owner.clone(), name.clone()),
            _ => return Err(ProjectError::MissingIdentity),
        };

        let mut state = self.state();
        let mut urls = BTreeMap::new();
        for (path, file) in files {
            validate_path(path)?;
            let url = blob_url(file);
            state
                .blobs
                .entry(url.clone())
                .or_insert_with(|| file.clone());
            urls.insert(path.clone(), url);
        }

        let now = Utc::now();
        let record_key = (owner.clone(), name.clone());
        let previous = state.projects.get(&record_key).map(|data| data.metadata.clone());
        let (id, revision) = match previous {
            Some(prev) => (
                prev.id,
                RevisionState {
                    version: Some(prev.revision.version.unwrap_or(0) + 1),
                    c_time: prev.revision.c_time,
                    u_time: Some(now),
                    has_unsynced_changes: None,
                },
            ),
            None => (
                None,
                RevisionState {
                    version: Some(1),
                    c_time: Some(now),
                    u_time: Some(now),
                    has_unsynced_changes: None,
                },
            ),
        };

        let saved = Metadata {
            id: Some(id.unwrap_or_else(|| Uuid::new_v4().to_string())),
            owner: Some(owner),
            name: Some(name),
            visibility: Some(metadata.visibility.unwrap_or_default()),
            revision,
        };
        state.projects.insert(
            record_key,
            ProjectData {
                metadata: saved.clone(),
                files: urls,
            },
        );
        info!(
            "Saved cloud project {}/{} at version {}",
            saved.owner.as_deref().unwrap_or_default(),
            saved.name.as_deref().unwrap_or_default(),
            saved.revision.version.unwrap_or_default()
        );
        Ok(saved)
    }
}
