//! Ties every component together: open the archive, enumerate and filter
//! entries, run the three discovery phases, extract claimed targets, and
//! emit default XML configs for mascots discovered without their own.

use std::collections::HashMap;

use anyhow::{Context, Result};
use camino::Utf8Path;

use crate::archive_reader::{open_best_reader, ArchiveReader};
use crate::discovery::{phase_a, phase_b, phase_c};
use crate::encoding::EncodingGuard;
use crate::error::AnalyzeError;
use crate::extractor::fs::FsExtractor;
use crate::extractor::thumbnail::ThumbnailExtractor;
use crate::extractor::Extractor;
use crate::folder_tree::FolderTree;
use crate::model::EntryTable;
use crate::path_utils::{ascii_lowercase, file_extension, last_component};
use crate::policy::SecurityPolicy;
use crate::report::Report;

/// Nested archives are spilled fully into memory rather than streamed, so a
/// hard cap keeps a maliciously large nested archive from exhausting
/// memory.
const NESTED_SPILL_CAP: u64 = 50 * 1024 * 1024;

/// Synthetic indices for entries that came from inside a nested archive are
/// offset well past any plausible top-level entry count, so they never
/// collide with a real archive index.
const NESTED_INDEX_BASE: usize = 1_000_000;

fn is_nested_archive_extension(ext: &str) -> bool {
    matches!(ext, "zip" | "tar" | "gz" | "tgz" | "xz" | "zst" | "7z" | "rar")
}

/// `src.<ext>` at any depth is skipped by convention: it holds an
/// unmodified copy of the mascot's own source archive, not a mascot.
fn is_skipped_by_convention(name: &str) -> bool {
    let stem = last_component(name).rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name);
    ascii_lowercase(stem) == "src"
}

/// Tuning knobs for a single [`run`] call.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Name used for a mascot whose folder structure gives no better hint
    /// (e.g. a bare `img/`+`conf/` pair at the archive root).
    pub fallback_name: String,
    /// When set, `extract` only writes one representative image per mascot
    /// instead of the full asset tree.
    pub only_thumbnails: bool,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            fallback_name: "Mascot".to_string(),
            only_thumbnails: false,
        }
    }
}

/// A fully-resolved archive: every discoverable mascot's targets have
/// already been assigned on [`Self::entries`]. Produced by [`analyze`];
/// pass to [`extract`] to materialize the targets on disk.
pub struct Analyzed {
    entries: EntryTable,
    #[allow(dead_code)] // kept for callers that want to inspect structure (e.g. `list`)
    tree: FolderTree,
    nested_cache: HashMap<usize, Vec<u8>>,
    reader: Box<dyn ArchiveReader>,
    /// Mascots with no `actions.xml` of their own (Phase C orphans), which
    /// need [`crate::default_xmls`] emitted alongside their assets.
    pub default_xml_mascots: Vec<String>,
}

impl Analyzed {
    #[must_use]
    pub fn entries(&self) -> &EntryTable {
        &self.entries
    }

    #[must_use]
    pub fn report(&self) -> Report {
        Report::from_entries(&self.entries, self.default_xml_mascots.clone())
    }
}

/// Runs Phase A/B/C discovery over `bytes`, an archive file's raw contents.
/// Never fails for malformed individual entries — only for a completely
/// unreadable archive.
pub fn analyze(bytes: Vec<u8>, config: &AnalyzeConfig) -> Result<Analyzed> {
    let mut reader = open_best_reader(bytes).map_err(|err| AnalyzeError::OpenFailed(err.to_string()))?;
    let raw_entries = reader.enumerate().context("enumerating archive entries")?;
    let guard = EncodingGuard::new();

    let mut entries = EntryTable::new();
    let mut nested_cache: HashMap<usize, Vec<u8>> = HashMap::new();

    for raw in &raw_entries {
        if raw.is_dir {
            continue;
        }
        let Some(name) = guard.repair_entry_name(&raw.raw_name) else {
            eprintln!("warning: skipping entry with unrepairable encoding (index {})", raw.index);
            continue;
        };
        let ext = ascii_lowercase(file_extension(&name));

        if is_nested_archive_extension(&ext) {
            if is_skipped_by_convention(&name) {
                continue;
            }
            absorb_nested_archive(&mut *reader, raw.index, raw.size, &name, &guard, &mut entries, &mut nested_cache);
            continue;
        }

        entries.push_raw(raw.index, name, raw.size);
    }

    let mut tree = FolderTree::new();
    for entry in entries.iter() {
        tree.insert_path(&entry.path);
    }

    let candidates = phase_a(&entries, &tree);

    let mut xml_by_index = HashMap::new();
    for candidate in &candidates {
        for index in [candidate.actions_index, candidate.behaviors_index] {
            if xml_by_index.contains_key(&index) {
                continue;
            }
            match read_bytes(&mut *reader, &nested_cache, index) {
                Ok(raw) => {
                    if let Some(text) = guard.decode_text(&raw) {
                        xml_by_index.insert(index, text);
                    } else {
                        eprintln!("warning: could not decode XML at index {index}");
                    }
                }
                Err(err) => eprintln!("warning: could not pre-extract XML at index {index}: {err}"),
            }
        }
    }

    let claimed = phase_b(&mut entries, &tree, &candidates, &xml_by_index, &config.fallback_name);
    let orphan_mascots = phase_c(&mut entries, &tree, &claimed, &config.fallback_name);

    Ok(Analyzed {
        entries,
        tree,
        nested_cache,
        reader,
        default_xml_mascots: orphan_mascots,
    })
}

#[allow(clippy::too_many_arguments)]
fn absorb_nested_archive(
    reader: &mut dyn ArchiveReader,
    raw_index: usize,
    raw_size: u64,
    name: &str,
    guard: &EncodingGuard,
    entries: &mut EntryTable,
    nested_cache: &mut HashMap<usize, Vec<u8>>,
) {
    if raw_size > NESTED_SPILL_CAP {
        eprintln!("warning: skipping oversized nested archive {name} ({raw_size} bytes)");
        return;
    }
    let bytes = match reader.read_entry_to_vec(raw_index) {
        Ok(b) => b,
        Err(err) => {
            eprintln!("warning: failed to read nested archive {name}: {err}");
            return;
        }
    };
    let mut nested_reader = match open_best_reader(bytes) {
        Ok(r) => r,
        Err(err) => {
            eprintln!("warning: failed to open nested archive {name}: {err}");
            return;
        }
    };
    let nested_raw = match nested_reader.enumerate() {
        Ok(r) => r,
        Err(err) => {
            eprintln!("warning: failed to enumerate nested archive {name}: {err}");
            return;
        }
    };
    for inner in nested_raw {
        if inner.is_dir {
            continue;
        }
        let Some(inner_name) = guard.repair_entry_name(&inner.raw_name) else {
            continue;
        };
        let Ok(inner_bytes) = nested_reader.read_entry_to_vec(inner.index) else {
            continue;
        };
        let synthetic_index = NESTED_INDEX_BASE + raw_index * 10_000 + inner.index;
        let full_path = format!("{name}/{inner_name}");
        nested_cache.insert(synthetic_index, inner_bytes);
        entries.push_raw(synthetic_index, full_path, inner.size);
    }
}

fn read_bytes(reader: &mut dyn ArchiveReader, nested_cache: &HashMap<usize, Vec<u8>>, index: usize) -> Result<Vec<u8>> {
    if let Some(cached) = nested_cache.get(&index) {
        return Ok(cached.clone());
    }
    reader.read_entry_to_vec(index)
}

/// Materializes every [`crate::model::ExtractTarget`] discovered by
/// [`analyze`] under `output_root`, then emits [`crate::default_xmls`] for
/// any mascot lacking its own config.
pub fn extract(analyzed: &mut Analyzed, output_root: &Utf8Path, policy: SecurityPolicy, config: &AnalyzeConfig) -> Result<Report> {
    if config.only_thumbnails {
        let mut sink = ThumbnailExtractor::new(output_root.to_owned(), policy.clone());
        stream_targets(analyzed, &mut sink)?;
    } else {
        let mut sink = FsExtractor::new(output_root.to_owned(), policy.clone());
        stream_targets(analyzed, &mut sink)?;
    }

    for mascot in &analyzed.default_xml_mascots {
        emit_default_xmls(mascot, output_root, &policy)?;
    }

    Ok(analyzed.report())
}

fn stream_targets(analyzed: &mut Analyzed, sink: &mut dyn Extractor) -> Result<()> {
    let indices: Vec<usize> = analyzed
        .entries
        .iter()
        .filter(|e| !e.targets.is_empty())
        .map(|e| e.index)
        .collect();

    for index in indices {
        let targets = analyzed.entries.by_index(index).map(|e| e.targets.clone()).unwrap_or_default();
        if targets.is_empty() {
            continue;
        }
        let bytes = match read_bytes(&mut *analyzed.reader, &analyzed.nested_cache, index) {
            Ok(b) => b,
            Err(err) => {
                eprintln!("warning: failed to read entry {index} for extraction: {err}");
                continue;
            }
        };
        sink.begin_write(&targets)?;
        sink.write_next(&bytes)?;
        sink.end_write()?;
    }
    Ok(())
}

fn emit_default_xmls(mascot: &str, output_root: &Utf8Path, policy: &SecurityPolicy) -> Result<()> {
    for (name, contents) in crate::default_xmls::default_xml_files() {
        let relative = Utf8Path::new(&format!("{mascot}.mascot")).join(name);
        let validated = policy
            .normalize_and_validate(&relative, output_root)
            .with_context(|| format!("validating default xml path for {mascot}"))?;
        if let Some(parent) = validated.abs.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("creating {parent}"))?;
        }
        std::fs::write(&validated.abs, contents).with_context(|| format!("writing {}", validated.abs))?;
    }
    Ok(())
}
