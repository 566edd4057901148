//! RAR backend, built on the `unrar` crate, which wraps the UnRAR library.
//! UnRAR only operates on a real file path, so this backend spills its
//! input to a temporary file at open time rather than reading from memory
//! directly.

use anyhow::{Context, Result};
use unrar::Archive;

use crate::archive_reader::{ArchiveReader, RawEntry};

pub struct RarReader {
    _tmp: tempfile::TempPath,
    entries: Vec<(RawEntry, std::path::PathBuf)>,
}

impl RarReader {
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        let mut tmp = tempfile::NamedTempFile::new().context("creating temp file for rar spill")?;
        std::io::Write::write_all(&mut tmp, &bytes).context("writing rar bytes to temp file")?;
        let tmp_path = tmp.into_temp_path();

        let mut archive = Archive::new(&tmp_path).open_for_listing().context("not a RAR archive")?;
        let mut entries = Vec::new();
        let mut index = 0usize;
        while let Some(header) = archive.next().transpose().context("reading rar header")? {
            entries.push((
                RawEntry {
                    index,
                    raw_name: header.filename.to_string_lossy().into_owned().into_bytes(),
                    size: header.unpacked_size as u64,
                    is_dir: header.is_directory(),
                },
                std::path::PathBuf::from(header.filename),
            ));
            index += 1;
        }
        Ok(Self { _tmp: tmp_path, entries })
    }
}

impl ArchiveReader for RarReader {
    fn enumerate(&mut self) -> Result<Vec<RawEntry>> {
        Ok(self.entries.iter().map(|(raw, _)| raw.clone()).collect())
    }

    fn stream_entry(&mut self, index: usize, sink: &mut dyn FnMut(&[u8]) -> Result<()>) -> Result<()> {
        let (_, target_path) = self
            .entries
            .get(index)
            .with_context(|| format!("no rar entry at index {index}"))?;
        let mut archive = Archive::new(&self._tmp).open_for_processing().context("reopening rar archive")?;
        while let Some(cursor) = archive.read_header().context("reading rar header")? {
            let is_match = cursor.entry().filename == *target_path;
            if is_match {
                let (data, _) = cursor.read().context("extracting rar entry")?;
                sink(&data)?;
                return Ok(());
            }
            archive = cursor.skip().context("skipping rar entry")?;
        }
        anyhow::bail!("rar entry at index {index} disappeared on reread")
    }
}
