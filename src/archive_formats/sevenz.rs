//! 7z backend, built on `sevenz-rust2`, which decompresses entry-by-entry
//! via a visiting closure rather than a `Read`-seekable per-entry handle.

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use sevenz_rust2::{SevenZArchiveEntry, SevenZReader as RawSevenZReader};

use crate::archive_reader::{ArchiveReader, RawEntry};

/// Like [`super::tar::TarReader`], 7z's visitor-style API reads every entry
/// up front rather than exposing random-access seeking, so entries are
/// buffered at open time.
pub struct SevenZReaderBackend {
    entries: Vec<(RawEntry, Vec<u8>)>,
}

impl SevenZReaderBackend {
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        let len = bytes.len() as u64;
        let mut reader = RawSevenZReader::new(Cursor::new(bytes), len, Default::default())
            .context("not a 7z archive")?;
        let mut entries = Vec::new();
        let mut index = 0usize;
        reader
            .for_each_entries(&mut |entry: &SevenZArchiveEntry, data: &mut dyn Read| {
                let mut buf = Vec::new();
                data.read_to_end(&mut buf)?;
                entries.push((
                    RawEntry {
                        index,
                        raw_name: entry.name().as_bytes().to_vec(),
                        size: entry.size(),
                        is_dir: entry.is_directory(),
                    },
                    buf,
                ));
                index += 1;
                Ok(true)
            })
            .context("reading 7z entries")?;
        Ok(Self { entries })
    }
}

// Re-export under the name `SevenZReader` the rest of the crate expects,
// without colliding with `sevenz_rust2::SevenZReader`.
pub use SevenZReaderBackend as SevenZReader;

impl ArchiveReader for SevenZReaderBackend {
    fn enumerate(&mut self) -> Result<Vec<RawEntry>> {
        Ok(self.entries.iter().map(|(raw, _)| raw.clone()).collect())
    }

    fn stream_entry(&mut self, index: usize, sink: &mut dyn FnMut(&[u8]) -> Result<()>) -> Result<()> {
        let (_, data) = self
            .entries
            .get(index)
            .with_context(|| format!("no 7z entry at index {index}"))?;
        for chunk in data.chunks(64 * 1024) {
            sink(chunk)?;
        }
        Ok(())
    }
}
