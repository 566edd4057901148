//! Thumbnail sink: like [`super::fs::FsExtractor`] but keeps only the first
//! image target claimed per mascot, so `extract --thumbnails` produces one
//! preview file per mascot instead of the full asset tree. There is no
//! direct original-implementation counterpart; this mode exists purely for
//! the CLI's quick-preview use case.

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;

use crate::model::{ExtractKind, ExtractTarget};
use crate::policy::SecurityPolicy;

use super::Extractor;

pub struct ThumbnailExtractor {
    output_root: Utf8PathBuf,
    policy: SecurityPolicy,
    seen_mascots: HashSet<String>,
    active: Vec<File>,
}

impl ThumbnailExtractor {
    #[must_use]
    pub fn new(output_root: impl Into<Utf8PathBuf>, policy: SecurityPolicy) -> Self {
        Self {
            output_root: output_root.into(),
            policy,
            seen_mascots: HashSet::new(),
            active: Vec::new(),
        }
    }

    fn wanted(&self, target: &ExtractTarget) -> bool {
        target.kind == ExtractKind::Image && !self.seen_mascots.contains(&target.mascot)
    }
}

impl Extractor for ThumbnailExtractor {
    fn begin_write(&mut self, targets: &[ExtractTarget]) -> Result<()> {
        self.active.clear();
        let wanted_targets: Vec<&ExtractTarget> = targets.iter().filter(|t| self.wanted(t)).collect();
        for target in wanted_targets {
            let relative = camino::Utf8Path::new(&format!("{}.png", target.mascot)).to_owned();
            let validated = match self.policy.normalize_and_validate(&relative, &self.output_root) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("warning: skipping unsafe thumbnail path {relative}: {err}");
                    continue;
                }
            };
            if let Some(parent) = validated.abs.parent() {
                std::fs::create_dir_all(parent).with_context(|| format!("creating {parent}"))?;
            }
            let file = File::create(&validated.abs)
                .with_context(|| format!("creating thumbnail {}", validated.abs))?;
            self.active.push(file);
            self.seen_mascots.insert(target.mascot.clone());
        }
        Ok(())
    }

    fn write_next(&mut self, chunk: &[u8]) -> Result<()> {
        for file in &mut self.active {
            file.write_all(chunk).context("writing thumbnail bytes")?;
        }
        Ok(())
    }

    fn end_write(&mut self) -> Result<()> {
        for file in &mut self.active {
            file.flush().context("flushing thumbnail")?;
        }
        self.active.clear();
        Ok(())
    }
}
