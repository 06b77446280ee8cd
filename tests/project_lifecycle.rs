//! Project Lifecycle Tests
//!
//! End-to-end flows: editing, syncing to the cloud and the local cache, and
//! archive import/export.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use spx_project::files::{decode_config, CONFIG_PATH};
use spx_project::persistence::{FsLocalCache, GbpArchive, MemoryCloud, MemoryLocalCache};
use spx_project::{
    CloudSource, CloudStore, Files, LocalCache, Metadata, Project, ProjectError, Result, Snapshot,
    Sound, Sprite, SyncOptions, Visibility,
};

/// Cloud store whose saves always fail.
struct OfflineCloud;

impl CloudStore for OfflineCloud {
    async fn load(&self, owner: &str, name: &str) -> Result<Snapshot> {
        Err(ProjectError::CloudProjectNotFound {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    async fn parse(&self, _data: &spx_project::ProjectData) -> Result<Snapshot> {
        Err(ProjectError::Cloud {
            reason: "offline".into(),
        })
    }

    async fn save(&self, _metadata: &Metadata, _files: &Files) -> Result<Metadata> {
        Err(ProjectError::Cloud {
            reason: "offline".into(),
        })
    }
}

fn pong() -> Project {
    let mut project = Project::with_identity("alice", "Pong");
    project.update_stage(|stage| stage.set_code("onStart => {}"));
    project.add_sprite(Sprite::new("Paddle").with_code("onKey => {}"));
    project.add_sprite(Sprite::new("Ball"));
    project.add_sound(Sound::new("Bounce"));
    project
}

// === Editing ===

#[test]
fn test_zorder_tracks_sprite_lifecycle() {
    let mut project = Project::new();
    for name in ["a", "b", "c"] {
        project.add_sprite(Sprite::new(name));
    }

    project.rename_sprite("b", "bee").unwrap();
    project.up_sprite_zorder("a").unwrap();
    assert_eq!(project.zorder(), ["bee", "a", "c"]);

    project.remove_sprite("a").unwrap();
    project.add_sprite(Sprite::new("a"));
    assert_eq!(project.zorder(), ["bee", "c", "a"]);

    project.set_sprite_zorder_idx("a", 0usize).unwrap();
    assert_eq!(project.zorder(), ["a", "bee", "c"]);
}

#[test]
fn test_set_zorder_index_is_clamped() {
    let mut project = Project::new();
    for name in ["a", "b", "c"] {
        project.add_sprite(Sprite::new(name));
    }
    project.set_sprite_zorder_idx("a", 10usize).unwrap();
    assert_eq!(project.zorder(), ["b", "c", "a"]);
}

#[test]
fn test_unknown_zorder_target_is_not_found() {
    let mut project = pong();
    let err = project.top_sprite_zorder("Ghost").unwrap_err();
    assert_eq!(err.kind(), spx_project::ErrorKind::NotFound);
}

// === Dirty Tracking ===

#[tokio::test]
async fn test_dirty_flag_cleared_by_cloud_save() {
    let cloud = MemoryCloud::new();
    let mut project = pong();
    project.start_watch_to_set_has_unsynced_changes();
    assert!(!project.has_unsynced_changes());

    project.add_sprite(Sprite::new("Wall"));
    assert!(project.has_unsynced_changes());

    project.save_to_cloud(&cloud).await.unwrap();
    assert!(!project.has_unsynced_changes());
    assert_eq!(project.version(), 1);
    assert!(project.c_time().is_some());

    project.update_stage(|stage| stage.set_code("onStart => { wait 1 }"));
    assert!(project.has_unsynced_changes());
}

#[tokio::test]
async fn test_failed_cloud_save_leaves_flag_set() {
    let mut project = pong();
    project.start_watch_to_set_has_unsynced_changes();
    project.add_sprite(Sprite::new("Wall"));

    let err = project.save_to_cloud(&OfflineCloud).await.unwrap_err();
    assert_eq!(err.error_code(), "CLOUD_ERROR");
    assert!(project.has_unsynced_changes());
    assert_eq!(project.version(), 0);
}

#[test]
fn test_metadata_only_update_is_not_an_edit() {
    let mut project = pong();
    project.start_watch_to_set_has_unsynced_changes();
    project.apply_metadata(Metadata {
        visibility: None,
        ..Metadata::default()
    });
    assert!(!project.has_unsynced_changes());

    project.apply_metadata(Metadata {
        visibility: Some(Visibility::Public),
        ..Metadata::default()
    });
    assert!(project.has_unsynced_changes());
}

// === Cloud ===

#[tokio::test]
async fn test_load_from_cloud_by_name_and_payload() {
    let cloud = MemoryCloud::new();
    let mut original = pong();
    original.top_sprite_zorder("Paddle").unwrap();
    original.save_to_cloud(&cloud).await.unwrap();

    let mut by_name = Project::new();
    by_name
        .load_from_cloud(&cloud, CloudSource::named("alice", "Pong"))
        .await
        .unwrap();
    assert_eq!(by_name.id(), original.id());
    assert_eq!(by_name.zorder(), ["Ball", "Paddle"]);

    let payload = cloud.fetch("alice", "Pong").unwrap();
    let mut by_payload = Project::new();
    by_payload.load_from_cloud(&cloud, payload.into()).await.unwrap();
    assert_eq!(by_payload.export(), by_name.export());
}

#[tokio::test]
async fn test_load_from_cloud_unknown_project() {
    let cloud = MemoryCloud::new();
    let mut project = Project::new();
    let err = project
        .load_from_cloud(&cloud, CloudSource::named("nobody", "Nothing"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "CLOUD_PROJECT_NOT_FOUND");
}

// === Local Cache ===

#[tokio::test(start_paused = true)]
async fn test_burst_of_edits_is_saved_once() {
    let cache = Arc::new(MemoryLocalCache::new());
    let mut project = pong();
    project.start_watch_to_set_has_unsynced_changes();
    project.start_watch_to_sync_local_cache(cache.clone(), "pong");

    // Setup fires once on its own.
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(cache.save_count(), 1);

    for i in 0..5 {
        project.add_sprite(Sprite::new(format!("Brick{}", i)));
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    assert_eq!(cache.save_count(), 1);

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(cache.save_count(), 2);

    let saved = cache.get("pong").unwrap();
    assert_eq!(saved, project.export());
    // The dirty watcher ran first, so the cached snapshot carries the flag.
    assert_eq!(saved.metadata.revision.has_unsynced_changes, Some(true));
}

#[tokio::test(start_paused = true)]
async fn test_custom_debounce_window() {
    let cache = Arc::new(MemoryLocalCache::new());
    let mut project = pong();
    project.start_watch_to_sync_local_cache_with(
        cache.clone(),
        "pong",
        SyncOptions::with_debounce(Duration::from_millis(100)),
    );

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(cache.save_count(), 1);

    project.remove_sprite("Ball").unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(cache.save_count(), 2);
}

#[tokio::test]
async fn test_fs_cache_restores_project() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FsLocalCache::new(dir.path()));
    let mut project = pong();
    project.start_watch_to_sync_local_cache_with(
        cache.clone(),
        "pong",
        SyncOptions::with_debounce(Duration::from_millis(10)),
    );
    project.rename_sprite("Ball", "Puck").unwrap();
    project.stop_watchers().await;

    let mut restored = Project::new();
    restored.load_from_local_cache(cache.as_ref(), "pong").await.unwrap();
    assert_eq!(restored.export(), project.export());
    assert!(restored.sprite("Puck").is_some());
}

#[tokio::test]
async fn test_missing_cache_entry_is_not_found() {
    let dir = TempDir::new().unwrap();
    let cache = FsLocalCache::new(dir.path());
    assert_eq!(cache.load("pong").await.unwrap(), None);

    let mut project = Project::new();
    let err = project.load_from_local_cache(&cache, "pong").await.unwrap_err();
    assert_eq!(err.error_code(), "CACHE_ENTRY_NOT_FOUND");
}

// === Archive ===

#[tokio::test]
async fn test_gbp_round_trip() {
    let project = pong();
    let blob = project.export_gbp_file(&GbpArchive).await.unwrap();

    let mut imported = Project::new();
    imported.load_gbp_file(&GbpArchive, &blob).await.unwrap();
    assert_eq!(imported.export().files, project.export().files);
    assert_eq!(imported.name(), Some("Pong"));

    let config = decode_config(CONFIG_PATH, &imported.export().files[CONFIG_PATH]).unwrap();
    assert_eq!(config["zorder"], serde_json::json!(["Paddle", "Ball"]));
}

#[tokio::test]
async fn test_gbp_import_prefers_existing_name() {
    let blob = pong().export_gbp_file(&GbpArchive).await.unwrap();
    let mut project = Project::with_identity("bob", "Breakout");
    project.load_gbp_file(&GbpArchive, &blob).await.unwrap();
    assert_eq!(project.name(), Some("Breakout"));
    assert_eq!(project.sprites().len(), 2);
}

#[tokio::test]
async fn test_gbp_round_trip_with_reserved_sprite_name() {
    let mut project = pong();
    project.add_sprite(Sprite::new("main").with_code("onClick => {}"));
    let blob = project.export_gbp_file(&GbpArchive).await.unwrap();

    let mut imported = Project::new();
    imported.load_gbp_file(&GbpArchive, &blob).await.unwrap();
    assert_eq!(imported.stage().code(), "onStart => {}");
    assert_eq!(imported.sprite("main2").unwrap().code(), "onClick => {}");
    assert_eq!(imported.zorder(), ["Paddle", "Ball", "main2"]);
}
