//! Sinks that materialize [`ExtractTarget`](crate::model::ExtractTarget)s
//! from entry bytes streamed one chunk at a time.
//!
//! A single entry's bytes are streamed once, and every target claiming that
//! entry receives a copy via a "parallel writers" broadcast, rather than
//! buffering the whole entry and copying it N times afterward.

pub mod fs;
pub mod memory;
pub mod thumbnail;

use anyhow::Result;

use crate::model::ExtractTarget;

/// A destination for streamed entry bytes.
///
/// Call order per entry: [`Extractor::begin_write`] once with every target
/// claiming that entry, then [`Extractor::write_next`] any number of times as
/// chunks arrive, then [`Extractor::end_write`] once. Implementations that
/// can't usefully stream (e.g. an in-memory sink) are free to buffer
/// internally between `begin_write` and `end_write`.
pub trait Extractor {
    /// Prepares one writer per target, discarding any unopenable target
    /// (untrusted output names should never abort this stage — the entry's
    /// other targets still deserve their bytes).
    fn begin_write(&mut self, targets: &[ExtractTarget]) -> Result<()>;

    /// Broadcasts `chunk` to every writer opened by the last `begin_write`.
    fn write_next(&mut self, chunk: &[u8]) -> Result<()>;

    /// Flushes and closes every writer opened by the last `begin_write`.
    fn end_write(&mut self) -> Result<()>;
}
