//! UTF-8 validation and Shift-JIS repair for archive entry names.
//!
//! Japanese-authored shimeji archives commonly store filenames (and XML
//! attribute values) in Shift-JIS rather than UTF-8. [`EncodingGuard`]
//! centralizes the repair so the rest of the pipeline only ever sees valid
//! UTF-8 paths.

use encoding_rs::SHIFT_JIS;

/// Legacy two-character Japanese filenames that some archivers mangle beyond
/// a clean Shift-JIS round trip. Rewritten verbatim to their canonical
/// English form when encountered.
const LEGACY_QUIRKS: &[(&str, &str)] = &[("行動.xml", "behaviors.xml"), ("動作.xml", "actions.xml")];

/// Threads Shift-JIS repair through the pipeline. Stateless today, but kept
/// as a constructed value (rather than free functions) so a cached
/// converter-singleton has a natural, lazily-initialized home if one is
/// ever needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct EncodingGuard;

impl EncodingGuard {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Whether `bytes` is valid UTF-8.
    #[must_use]
    pub fn is_valid_utf8(&self, bytes: &[u8]) -> bool {
        std::str::from_utf8(bytes).is_ok()
    }

    /// Attempts a Shift-JIS to UTF-8 conversion. Returns `None` if the bytes
    /// contain sequences `encoding_rs` cannot map (replacement characters
    /// are treated as failure, not success).
    #[must_use]
    pub fn shift_jis_to_utf8(&self, bytes: &[u8]) -> Option<String> {
        let (cow, _, had_errors) = SHIFT_JIS.decode(bytes);
        if had_errors {
            None
        } else {
            Some(cow.into_owned())
        }
    }

    /// Repairs arbitrary file content (an XML document's raw bytes, not a
    /// path) into valid UTF-8. Unlike [`Self::repair_entry_name`] this never
    /// applies the legacy filename quirk table, which only makes sense for
    /// names.
    #[must_use]
    pub fn decode_text(&self, bytes: &[u8]) -> Option<String> {
        if self.is_valid_utf8(bytes) {
            String::from_utf8(bytes.to_vec()).ok()
        } else {
            self.shift_jis_to_utf8(bytes)
        }
    }

    /// Repairs a raw archive entry name into valid UTF-8, applying the
    /// legacy filename quirk table. Returns `None` if the name is neither
    /// valid UTF-8 nor repairable Shift-JIS (the entry should be dropped).
    #[must_use]
    pub fn repair_entry_name(&self, bytes: &[u8]) -> Option<String> {
        let repaired = if self.is_valid_utf8(bytes) {
            // SAFETY-free: already checked valid above.
            String::from_utf8(bytes.to_vec()).ok()?
        } else {
            self.shift_jis_to_utf8(bytes)?
        };
        Some(apply_legacy_quirks(&repaired))
    }
}

fn apply_legacy_quirks(path: &str) -> String {
    let last_slash = path.rfind('/').map(|p| p + 1).unwrap_or(0);
    let (dir, name) = path.split_at(last_slash);
    for (mangled, canonical) in LEGACY_QUIRKS {
        if name == *mangled {
            return format!("{dir}{canonical}");
        }
    }
    path.to_string()
}
