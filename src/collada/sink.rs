//! Output sinks for the XML writer.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::SystemTime;

use crate::pak::PakArchive;
use crate::util::Result;

/// Byte sink the XML writer streams into.
pub trait XmlSink {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Flush and finalize. Called once, after the document is complete.
    fn finish(&mut self) -> Result<()>;
}

impl<T: XmlSink + ?Sized> XmlSink for &mut T {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        (**self).write_bytes(data)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Direct file sink.
pub struct FileSink {
    writer: BufWriter<std::fs::File>,
}

impl FileSink {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl XmlSink for FileSink {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Sink that accumulates the document in memory and hands it to a pak
/// archive as one entry. Nothing reaches the archive until `finish`
/// (or drop), and the entry records the document's modification time.
pub struct PakSink<'a> {
    archive: &'a mut PakArchive,
    entry_name: String,
    buffer: Vec<u8>,
    finished: bool,
}

impl<'a> PakSink<'a> {
    pub fn new(archive: &'a mut PakArchive, entry_name: impl Into<String>) -> Self {
        Self {
            archive,
            entry_name: entry_name.into(),
            buffer: Vec::new(),
            finished: false,
        }
    }

    fn flush_to_archive(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.archive
            .add_entry(&self.entry_name, &self.buffer, SystemTime::now())
    }
}

impl XmlSink for PakSink<'_> {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.flush_to_archive()
    }
}

impl Drop for PakSink<'_> {
    fn drop(&mut self) {
        let _ = self.flush_to_archive();
    }
}

/// In-memory sink for tests and buffered document builds.
#[derive(Default)]
pub struct VecSink {
    bytes: Vec<u8>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl XmlSink for VecSink {
    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
