//! `ArchiveReader`: the trait every container-format backend implements,
//! plus `open_best_reader`'s try-in-order backend selection.
//!
//! Each backend owns one real crate (`zip`, `tar`, `sevenz_rust2`, `unrar`)
//! and `open_best_reader` walks them in a fixed, deterministic order instead
//! of sniffing magic bytes speculatively across libraries.

use anyhow::Result;

use crate::archive_formats::{rar, sevenz, tar, zip};

/// One entry as surfaced by an [`ArchiveReader`], before any encoding repair
/// or extension filtering is applied.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub index: usize,
    pub raw_name: Vec<u8>,
    pub size: u64,
    pub is_dir: bool,
}

/// A format-specific archive backend.
///
/// Implementations own the underlying file handle and may only enumerate
/// once; `read_entry` must accept indices in any order since Discovery reads
/// a subset of entries during its intermediate pre-extraction pass and a
/// (possibly different) subset during final extraction.
pub trait ArchiveReader {
    /// Full directory listing, in on-disk order; directories are included so
    /// [`RawEntry::is_dir`] callers can skip them explicitly.
    fn enumerate(&mut self) -> Result<Vec<RawEntry>>;

    /// Streams the bytes of entry `index`, invoking `sink` once per chunk.
    fn stream_entry(&mut self, index: usize, sink: &mut dyn FnMut(&[u8]) -> Result<()>) -> Result<()>;

    /// Reads entry `index` fully into memory. Used for nested-archive spill
    /// (the size cap is enforced by the caller, not this trait) and for
    /// small intermediate XML reads.
    fn read_entry_to_vec(&mut self, index: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.stream_entry(index, &mut |chunk| {
            buf.extend_from_slice(chunk);
            Ok(())
        })?;
        Ok(buf)
    }
}

/// Opens `bytes` with the first backend that successfully parses it as its
/// own container format, trying ZIP, then TAR(+compression), then 7z, then
/// RAR.
pub fn open_best_reader(bytes: Vec<u8>) -> Result<Box<dyn ArchiveReader>> {
    if let Ok(reader) = zip::ZipReader::open(bytes.clone()) {
        return Ok(Box::new(reader));
    }
    if let Ok(reader) = tar::TarReader::open(bytes.clone()) {
        return Ok(Box::new(reader));
    }
    if let Ok(reader) = sevenz::SevenZReader::open(bytes.clone()) {
        return Ok(Box::new(reader));
    }
    let reader = rar::RarReader::open(bytes)?;
    Ok(Box::new(reader))
}
