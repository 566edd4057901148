//! TAR backend, reusing the compression auto-detection already built for
//! the tar-creation pipeline (`crate::io::dec::wrap_reader`) against
//! gzip/xz/zstd-wrapped tarballs, a common shimeji distribution shape
//! alongside plain ZIP.

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use tar::Archive;

use crate::archive_reader::{ArchiveReader, RawEntry};
use crate::io::dec::wrap_reader;

/// TAR entries are read once, sequentially, into memory at open time:
/// `tar::Archive` only supports a single forward pass over its reader, so
/// unlike the ZIP/7z backends this one can't re-seek for a later
/// `stream_entry` call on an arbitrary index.
pub struct TarReader {
    entries: Vec<(RawEntry, Vec<u8>)>,
}

impl TarReader {
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        let reader = wrap_reader(Cursor::new(bytes)).context("detecting tar compression")?;
        let mut archive = Archive::new(reader);
        let mut entries = Vec::new();
        for (index, entry) in archive.entries().context("not a TAR archive")?.enumerate() {
            let mut entry = entry.context("reading tar entry header")?;
            let path = entry.path().context("reading tar entry path")?;
            let raw_name = path.to_string_lossy().into_owned().into_bytes();
            let size = entry.header().size().unwrap_or(0);
            let is_dir = entry.header().entry_type().is_dir();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).context("reading tar entry bytes")?;
            entries.push((RawEntry { index, raw_name, size, is_dir }, data));
        }
        if entries.is_empty() {
            anyhow::bail!("empty or unreadable tar archive");
        }
        Ok(Self { entries })
    }
}

impl ArchiveReader for TarReader {
    fn enumerate(&mut self) -> Result<Vec<RawEntry>> {
        Ok(self.entries.iter().map(|(raw, _)| raw.clone()).collect())
    }

    fn stream_entry(&mut self, index: usize, sink: &mut dyn FnMut(&[u8]) -> Result<()>) -> Result<()> {
        let (_, data) = self
            .entries
            .get(index)
            .with_context(|| format!("no tar entry at index {index}"))?;
        for chunk in data.chunks(64 * 1024) {
            sink(chunk)?;
        }
        Ok(())
    }
}
