//! `.gbp` archive codec.
//!
//! A `.gbp` file is a zip archive holding the project files at their bundle
//! paths plus a `.metadata` entry with the project metadata as JSON.

use std::io::{Cursor, Read, Write};

use log::debug;
use zip::{write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};

use super::ArchiveCodec;
use crate::error::Result;
use crate::files::{validate_path, File, Files};
use crate::project::{Metadata, Snapshot};

/// Archive entry holding the metadata.
pub const METADATA_ENTRY: &str = ".metadata";

/// Zip-based archive codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct GbpArchive;

impl GbpArchive {
    fn decode_sync(blob: &[u8]) -> Result<Snapshot> {
        let mut archive = ZipArchive::new(Cursor::new(blob))?;
        let mut metadata = Metadata::default();
        let mut files = Files::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let path = entry.name().to_string();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes)?;

            if path == METADATA_ENTRY {
                metadata = serde_json::from_slice(&bytes)?;
            } else {
                validate_path(&path)?;
                files.insert(path, File::from_bytes(bytes));
            }
        }

        debug!("Decoded archive with {} files", files.len());
        Ok(Snapshot::new(metadata, files))
    }

    fn encode_sync(metadata: &Metadata, files: &Files) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(METADATA_ENTRY, options)?;
        zip.write_all(&serde_json::to_vec(metadata)?)?;
        for (path, file) in files {
            validate_path(path)?;
            zip.start_file(path.as_str(), options)?;
            zip.write_all(file.bytes())?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl ArchiveCodec for GbpArchive {
    async fn decode(&self, blob: &[u8]) -> Result<Snapshot> {
        Self::decode_sync(blob)
    }

    async fn encode(&self, metadata: &Metadata, files: &Files) -> Result<Vec<u8>> {
        Self::encode_sync(metadata, files)
    }
}
