//! Project persistence through the storage adapters.

use log::{info, warn};

use super::Project;
use crate::error::{ProjectError, Result};
use crate::persistence::{ArchiveCodec, CloudSource, CloudStore, LocalCache};

impl Project {
    /// Save the full snapshot to the cloud and adopt the metadata it returns.
    ///
    /// The unsynced-changes flag is only cleared on success.
    pub async fn save_to_cloud<S: CloudStore>(&mut self, cloud: &S) -> Result<()> {
        let snapshot = self.export();
        let saved = match cloud.save(&snapshot.metadata, &snapshot.files).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Cloud save failed: {}", e);
                return Err(e);
            }
        };
        self.apply_metadata(saved);
        self.set_has_unsynced_changes(false);
        info!(
            "Saved project {} to cloud (version {})",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.version
        );
        Ok(())
    }

    /// Replace this project with a cloud project, by name or from a fetched record.
    pub async fn load_from_cloud<S: CloudStore>(
        &mut self,
        cloud: &S,
        source: CloudSource,
    ) -> Result<()> {
        let snapshot = match source {
            CloudSource::Named { owner, name } => cloud.load(&owner, &name).await?,
            CloudSource::Payload(data) => cloud.parse(&data).await?,
        };
        self.load(snapshot.metadata, snapshot.files).await
    }

    pub async fn load_from_local_cache<C: LocalCache>(&mut self, cache: &C, key: &str) -> Result<()> {
        let snapshot = cache
            .load(key)
            .await?
            .ok_or_else(|| ProjectError::CacheEntryNotFound {
                key: key.to_string(),
            })?;
        self.load(snapshot.metadata, snapshot.files).await
    }

    /// Import an archive. A name already set on this project wins over the
    /// archived one.
    pub async fn load_gbp_file<A: ArchiveCodec>(&mut self, codec: &A, blob: &[u8]) -> Result<()> {
        let mut snapshot = codec.decode(blob).await?;
        if self.name.is_some() {
            snapshot.metadata.name = self.name.clone();
        }
        self.load(snapshot.metadata, snapshot.files).await
    }

    pub async fn export_gbp_file<A: ArchiveCodec>(&self, codec: &A) -> Result<Vec<u8>> {
        let snapshot = self.export();
        codec.encode(&snapshot.metadata, &snapshot.files).await
    }
}
