//! Project Metadata
//!
//! The part of a project that travels next to its files. Revision state is
//! kept as its own group so content comparisons can drop it in one step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::files::Files;

/// Who can see a project in the cloud.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

/// Version, timestamps and the unsynced-changes flag.
///
/// None of these count as user content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevisionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub c_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub u_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_unsynced_changes: Option<bool>,
}

/// Project metadata. Every field is optional so a partial value can be
/// applied on top of an existing project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    #[serde(flatten)]
    pub revision: RevisionState,
}

impl Metadata {
    /// Metadata carrying only a project name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// The same metadata with the revision group cleared.
    pub fn without_revision(mut self) -> Self {
        self.revision = RevisionState::default();
        self
    }
}

/// A full exportable picture of a project: metadata plus file bundle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub metadata: Metadata,
    pub files: Files,
}

impl Snapshot {
    pub fn new(metadata: Metadata, files: Files) -> Self {
        Self { metadata, files }
    }

    /// The content part of the snapshot, used for change detection.
    pub fn content(&self) -> Snapshot {
        Snapshot {
            metadata: self.metadata.clone().without_revision(),
            files: self.files.clone(),
        }
    }
}
