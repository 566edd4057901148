//! Shared error helpers for consistent exit codes.

use thiserror::Error;

/// Represents a user input error (invalid flags, missing paths, etc.).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct UserInputError(pub String);

impl UserInputError {
    /// Convenience constructor.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Pass-aborting failures the discovery/extraction pipeline can raise.
///
/// Per-entry failures (unreadable entry, unparseable XML, unrepairable
/// encoding, a nested archive that won't open) are handled by logging a
/// warning and skipping the offending entry — the algorithm itself never
/// returns `Err` for a single bad entry. Only a failure to open the archive
/// at all, or to write an extraction target, aborts the pass.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("failed to open archive: {0}")]
    OpenFailed(String),
    #[error("failed to write extraction target {path}: {source}")]
    SinkError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
