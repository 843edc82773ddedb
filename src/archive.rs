//! EPUB archive assembly.
//!
//! The archive is written next to the destination under a temporary name
//! and moved into place only once the zip is complete, so a failed build
//! never leaves a partial file at the output path.

use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::{Error, Result};

/// Content of the leading `mimetype` entry.
pub const MIMETYPE: &[u8] = b"application/epub+zip";

/// One file to place in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path inside the archive.
    pub name: String,
    pub source: EntrySource,
}

/// Where an entry's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

impl ArchiveEntry {
    pub fn bytes(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            source: EntrySource::Bytes(data.into()),
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: EntrySource::File(path.into()),
        }
    }
}

/// Zip writer that always starts with a stored `mimetype` entry.
pub struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    deflated: SimpleFileOptions,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    /// Start a new archive and write the `mimetype` entry.
    pub fn new(writer: W) -> Result<Self> {
        let mut zip = ZipWriter::new(writer);

        // mimetype must be first and uncompressed
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file("mimetype", stored)?;
        zip.write_all(MIMETYPE).map_err(|e| archive_error("cannot write mimetype", e))?;

        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        Ok(Self { zip, deflated })
    }

    /// Add an entry from memory.
    pub fn add_bytes(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.deflated)?;
        self.zip
            .write_all(data)
            .map_err(|e| archive_error(&format!("cannot write {name}"), e))
    }

    /// Add an entry by streaming a file from disk.
    pub fn add_file(&mut self, name: &str, path: &Path) -> Result<()> {
        let mut file = File::open(path)
            .map_err(|e| archive_error(&format!("cannot open {}", path.display()), e))?;
        self.zip.start_file(name, self.deflated)?;
        io::copy(&mut file, &mut self.zip)
            .map_err(|e| archive_error(&format!("cannot write {name}"), e))?;
        Ok(())
    }

    pub fn add(&mut self, entry: &ArchiveEntry) -> Result<()> {
        match &entry.source {
            EntrySource::Bytes(data) => self.add_bytes(&entry.name, data),
            EntrySource::File(path) => self.add_file(&entry.name, path),
        }
    }

    /// Write the central directory and return the underlying writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.zip.finish()?)
    }
}

/// Build an archive in memory.
pub fn archive_to_bytes(entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    let mut archive = ArchiveWriter::new(io::Cursor::new(Vec::new()))?;
    for entry in entries {
        archive.add(entry)?;
    }
    Ok(archive.finish()?.into_inner())
}

/// Write `entries` to `output`, replacing any existing file only on success.
pub fn write_archive(output: &Path, entries: &[ArchiveEntry]) -> Result<()> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staging = NamedTempFile::new_in(parent)
        .map_err(|e| archive_error(&format!("cannot stage archive in {}", parent.display()), e))?;

    let mut archive = ArchiveWriter::new(staging.as_file_mut())?;
    for entry in entries {
        archive.add(entry)?;
    }
    let file = archive.finish()?;
    file.sync_all()
        .map_err(|e| archive_error("cannot flush archive", e))?;

    staging.persist(output).map_err(|e| {
        archive_error(&format!("cannot move archive to {}", output.display()), e.error)
    })?;

    log::debug!("archive written to {} ({} entries)", output.display(), entries.len() + 1);
    Ok(())
}

fn archive_error(context: &str, e: io::Error) -> Error {
    Error::Archive(format!("{context}: {e}"))
}
