//! In-memory sink used for the pre-extraction pass: buffers bytes per
//! output name instead of touching disk, so discovered XML configs can be
//! parsed before the real output layout is known.

use std::collections::HashMap;

use anyhow::Result;

use crate::model::ExtractTarget;

use super::Extractor;

/// Buffers each active target's bytes in memory and exposes them by output
/// name once `end_write` is called.
#[derive(Debug, Default)]
pub struct MemoryExtractor {
    outputs: HashMap<String, Vec<u8>>,
    buffer: Vec<u8>,
    active_names: Vec<String>,
}

impl MemoryExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, output_name: &str) -> Option<&[u8]> {
        self.outputs.get(output_name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn take(&mut self, output_name: &str) -> Option<Vec<u8>> {
        self.outputs.remove(output_name)
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.outputs.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl Extractor for MemoryExtractor {
    fn begin_write(&mut self, targets: &[ExtractTarget]) -> Result<()> {
        self.buffer.clear();
        self.active_names = targets.iter().map(|t| t.output_name.clone()).collect();
        Ok(())
    }

    fn write_next(&mut self, chunk: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    fn end_write(&mut self) -> Result<()> {
        for name in self.active_names.drain(..) {
            self.outputs.insert(name, self.buffer.clone());
        }
        self.buffer.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExtractKind;

    #[test]
    fn broadcasts_bytes_to_every_active_target() {
        let mut sink = MemoryExtractor::new();
        let targets = vec![
            ExtractTarget { mascot: "Foo".into(), output_name: "a.xml".into(), kind: ExtractKind::Xml },
            ExtractTarget { mascot: "Foo".into(), output_name: "b.xml".into(), kind: ExtractKind::Xml },
        ];
        sink.begin_write(&targets).unwrap();
        sink.write_next(b"<Mascot").unwrap();
        sink.write_next(b"/>").unwrap();
        sink.end_write().unwrap();
        assert_eq!(sink.get("a.xml"), Some(&b"<Mascot/>"[..]));
        assert_eq!(sink.get("b.xml"), Some(&b"<Mascot/>"[..]));
    }
}
