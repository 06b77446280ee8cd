//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use log::{info, warn};
use walkdir::WalkDir;

use super::ZorderMove;
use crate::error::{ProjectError, Result};
use crate::files::{File, Files};
use crate::persistence::{FsLocalCache, GbpArchive, LocalCache};
use crate::project::{Metadata, Project};

/// Load a project from a `.gbp` archive on disk.
pub async fn open_archive(path: &Path) -> Result<Project> {
    let blob = fs::read(path)?;
    let mut project = Project::new();
    project.load_gbp_file(&GbpArchive, &blob).await?;
    Ok(project)
}

/// Write a project to a `.gbp` archive on disk.
pub async fn write_archive(project: &Project, path: &Path) -> Result<()> {
    let blob = project.export_gbp_file(&GbpArchive).await?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, blob)?;
    Ok(())
}

/// Read every file below `dir` into a bundle keyed by `/`-separated path.
pub fn read_bundle_dir(dir: &Path) -> Result<Files> {
    let mut files = Files::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(|e| ProjectError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| ProjectError::Internal(e.to_string()))?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.insert(rel, File::from_bytes(fs::read(entry.path())?));
    }
    Ok(files)
}

pub async fn inspect(archive: &Path) -> Result<()> {
    info!("Inspecting archive: {}", archive.display());
    let project = open_archive(archive).await?;

    println!("Project: {}", project.name().unwrap_or("<unnamed>"));
    if let Some(owner) = project.owner() {
        println!("Owner: {}", owner);
    }
    println!("Version: {}", project.version());
    println!("{:-<60}", "");

    println!("Sprites ({}):", project.sprites().len());
    for sprite in project.sprites() {
        println!("  {} ({} assets)", sprite.name(), sprite.assets().len());
    }
    println!("Sounds ({}):", project.sounds().len());
    for sound in project.sounds() {
        println!("  {}", sound.name());
    }
    println!("Zorder (bottom to top): {}", project.zorder().join(", "));

    Ok(())
}

pub async fn pack(dir: &Path, output: &Path, name: Option<&str>) -> Result<()> {
    info!("Packing {} into {}", dir.display(), output.display());
    let files = read_bundle_dir(dir)?;

    let name = name
        .map(str::to_string)
        .or_else(|| dir.file_name().map(|n| n.to_string_lossy().into_owned()));
    let metadata = Metadata {
        name,
        ..Metadata::default()
    };

    let mut project = Project::new();
    project.load(metadata, files).await?;
    write_archive(&project, output).await?;

    println!(
        "Packed {} sprites and {} sounds into {}",
        project.sprites().len(),
        project.sounds().len(),
        output.display()
    );
    Ok(())
}

pub async fn unpack(archive: &Path, output: &Path) -> Result<()> {
    info!("Unpacking {} into {}", archive.display(), output.display());
    let project = open_archive(archive).await?;
    let snapshot = project.export();

    for (path, file) in &snapshot.files {
        let target = output.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, file.bytes())?;
    }

    println!("Unpacked {} files into {}", snapshot.files.len(), output.display());
    Ok(())
}

pub async fn zorder(archive: &Path, sprite: &str, to: ZorderMove) -> Result<()> {
    info!("Moving {} ({:?}) in {}", sprite, to, archive.display());
    let mut project = open_archive(archive).await?;
    project.set_sprite_zorder_idx(sprite, to)?;
    write_archive(&project, archive).await?;

    println!("Zorder: {}", project.zorder().join(", "));
    Ok(())
}

pub async fn rename_sprite(archive: &Path, from: &str, to: &str) -> Result<()> {
    info!("Renaming sprite {} to {} in {}", from, to, archive.display());
    let mut project = open_archive(archive).await?;
    project.rename_sprite(from, to)?;
    write_archive(&project, archive).await?;

    println!("Renamed sprite: {} -> {}", from, to);
    Ok(())
}

pub async fn cache_store(cache_dir: &Path, archive: &Path, key: &str) -> Result<()> {
    info!("Caching {} under {}", archive.display(), key);
    let project = open_archive(archive).await?;
    let snapshot = project.export();

    let cache = FsLocalCache::new(cache_dir);
    cache.save(key, &snapshot.metadata, &snapshot.files).await?;

    println!("Stored {} in {} as {}", archive.display(), cache_dir.display(), key);
    Ok(())
}

pub async fn cache_restore(cache_dir: &Path, key: &str, output: &Path) -> Result<()> {
    info!("Restoring cache entry {} to {}", key, output.display());
    let cache = FsLocalCache::new(cache_dir);
    let mut project = Project::new();
    project.load_from_local_cache(&cache, key).await?;
    write_archive(&project, output).await?;

    println!("Restored {} to {}", key, output.display());
    Ok(())
}

pub fn cache_list(cache_dir: &Path) -> Result<()> {
    let cache = FsLocalCache::new(cache_dir);
    let keys = cache.list_keys()?;

    if keys.is_empty() {
        warn!("No cache entries in {}", cache_dir.display());
        println!("No cached projects.");
        return Ok(());
    }
    for key in keys {
        println!("{}", key);
    }
    Ok(())
}
