//! ZIP backend, built on the `zip` crate.

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use zip::ZipArchive;

use crate::archive_reader::{ArchiveReader, RawEntry};

pub struct ZipReader {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl ZipReader {
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes)).context("not a ZIP archive")?;
        Ok(Self { archive })
    }
}

impl ArchiveReader for ZipReader {
    fn enumerate(&mut self) -> Result<Vec<RawEntry>> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let file = self.archive.by_index_raw(index).context("reading zip entry header")?;
            entries.push(RawEntry {
                index,
                raw_name: file.name_raw().to_vec(),
                size: file.size(),
                is_dir: file.is_dir(),
            });
        }
        Ok(entries)
    }

    fn stream_entry(&mut self, index: usize, sink: &mut dyn FnMut(&[u8]) -> Result<()>) -> Result<()> {
        let mut file = self.archive.by_index(index).context("opening zip entry")?;
        let mut buf = [0u8; 64 * 1024];
        loop {
            let read = file.read(&mut buf).context("reading zip entry bytes")?;
            if read == 0 {
                break;
            }
            sink(&buf[..read])?;
        }
        Ok(())
    }
}
