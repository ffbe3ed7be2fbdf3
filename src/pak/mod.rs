//! Write-side pak archive.
//!
//! Entries accumulate in memory; the container is written to disk only
//! when the archive is finished (or dropped). Callers must treat the
//! archive as an all-or-nothing scoped resource with no partial
//! visibility until scope exit. The full pak virtual filesystem lives
//! elsewhere; this is only the writer the export pipeline needs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::util::{Error, Result};

/// Container magic.
pub const PAK_MAGIC: &[u8; 4] = b"PAK1";
/// Container version.
pub const PAK_VERSION: u32 = 1;

/// Entry stored uncompressed.
pub const METHOD_STORE: u8 = 0;
/// Entry compressed with zlib.
pub const METHOD_ZLIB: u8 = 1;

struct Entry {
    name: String,
    method: u8,
    raw_size: u64,
    mtime_secs: u64,
    data: Vec<u8>,
}

/// Pak archive writer with deferred container write.
pub struct PakArchive {
    path: PathBuf,
    entries: Vec<Entry>,
    finished: bool,
}

impl PakArchive {
    /// Create an archive that will be written to `path`. No file I/O
    /// happens until the archive is finished.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
            finished: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add one entry, compressing it when that saves space and storing
    /// it raw otherwise. The modification time is recorded in the entry
    /// table.
    pub fn add_entry(&mut self, name: &str, data: &[u8], mtime: SystemTime) -> Result<()> {
        if self.finished {
            return Err(Error::ArchiveFinished);
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;

        let (method, stored) = if compressed.len() >= data.len() {
            (METHOD_STORE, data.to_vec())
        } else {
            (METHOD_ZLIB, compressed)
        };

        let mtime_secs = mtime
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.entries.push(Entry {
            name: name.to_string(),
            method,
            raw_size: data.len() as u64,
            mtime_secs,
            data: stored,
        });
        Ok(())
    }

    /// Write the container and consume the archive.
    pub fn finish(mut self) -> Result<()> {
        self.write_container()
    }

    fn write_container(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(PAK_MAGIC)?;
        writer.write_u32::<LittleEndian>(PAK_VERSION)?;
        writer.write_u32::<LittleEndian>(self.entries.len() as u32)?;

        for entry in &self.entries {
            writer.write_u16::<LittleEndian>(entry.name.len() as u16)?;
            writer.write_all(entry.name.as_bytes())?;
            writer.write_u8(entry.method)?;
            writer.write_u64::<LittleEndian>(entry.raw_size)?;
            writer.write_u64::<LittleEndian>(entry.data.len() as u64)?;
            writer.write_u64::<LittleEndian>(entry.mtime_secs)?;
            writer.write_all(&entry.data)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Drop for PakArchive {
    fn drop(&mut self) {
        let _ = self.write_container();
    }
}
