//! Core data model shared by every component: [`Entry`], [`ExtractTarget`],
//! and the [`EntryTable`] that indexes entries surviving the asset filter.
//!
//! Expressed as owned Rust values rather than heap-allocated,
//! index-addressed objects.

use crate::path_utils::{dirname, file_extension, last_component};

/// What an [`ExtractTarget`] will be materialized as once pulled out of the
/// archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractKind {
    Image,
    Sound,
    Xml,
    /// No kind was specified by the referencing XML attribute; used as the
    /// default bucket for in-memory pre-extraction sinks.
    Unspecified,
}

/// A single destination an [`Entry`]'s bytes should be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractTarget {
    pub mascot: String,
    pub output_name: String,
    pub kind: ExtractKind,
}

/// One entry surviving the `png|wav|xml` extension filter, plus every
/// output location its bytes have been claimed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Index into the archive's original enumeration order; stable across
    /// both discovery passes.
    pub index: usize,
    pub path: String,
    pub lower_path: String,
    pub size: u64,
    pub targets: Vec<ExtractTarget>,
}

impl Entry {
    #[must_use]
    pub fn new(index: usize, path: String, size: u64) -> Self {
        let lower_path = crate::path_utils::ascii_lowercase(&path);
        Self {
            index,
            path,
            lower_path,
            size,
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        last_component(&self.path)
    }

    #[must_use]
    pub fn dir(&self) -> &str {
        dirname(&self.path)
    }

    #[must_use]
    pub fn lower_extension(&self) -> String {
        crate::path_utils::ascii_lowercase(file_extension(&self.path))
    }

    /// Adds a new output claim. Two targets on the same entry is allowed and
    /// expected (invariant 3): the same picture can be referenced by several
    /// poses under different mascots or output names.
    pub fn add_target(&mut self, mascot: impl Into<String>, output_name: impl Into<String>, kind: ExtractKind) {
        self.targets.push(ExtractTarget {
            mascot: mascot.into(),
            output_name: output_name.into(),
            kind,
        });
    }
}

/// Extensions considered assets worth tracking at all; anything else is
/// dropped at enumeration time.
fn is_tracked_extension(ext: &str) -> bool {
    matches!(ext, "png" | "wav" | "xml")
}

/// Index-aligned table of every [`Entry`] whose extension survived the
/// `png|wav|xml` filter, built once per archive and shared read-only by
/// both discovery passes.
#[derive(Debug, Default)]
pub struct EntryTable {
    entries: Vec<Entry>,
}

impl EntryTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a raw archive entry. Entries whose extension doesn't match
    /// `png|wav|xml` are silently dropped; `index` must be the entry's
    /// position in the archive's own enumeration order so later passes over
    /// the same archive can realign to it.
    pub fn push_raw(&mut self, index: usize, path: String, size: u64) {
        let ext = crate::path_utils::ascii_lowercase(file_extension(&path));
        if is_tracked_extension(&ext) {
            self.entries.push(Entry::new(index, path, size));
        }
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.entries.iter_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds an entry by its original archive index. Used when a second
    /// enumeration pass needs to realign with targets collected during the
    /// first pass.
    #[must_use]
    pub fn by_index(&self, index: usize) -> Option<&Entry> {
        self.entries.iter().find(|e| e.index == index)
    }

    #[must_use]
    pub fn by_index_mut(&mut self, index: usize) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.index == index)
    }

    /// Finds an entry whose lower-cased path exactly equals `lower_path`.
    #[must_use]
    pub fn by_lower_path(&self, lower_path: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.lower_path == lower_path)
    }

    #[must_use]
    pub fn by_lower_path_mut(&mut self, lower_path: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.lower_path == lower_path)
    }
}
