//! Filesystem sink: writes image/sound targets under
//! `<output_root>/<mascot>.mascot/<img|sound>/<output_name>`, and XML targets
//! directly at `<output_root>/<mascot>.mascot/<output_name>` (no subfolder).

use std::fs::File;
use std::io::Write;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

use crate::model::{ExtractKind, ExtractTarget};
use crate::policy::SecurityPolicy;

use super::Extractor;

fn kind_dir(kind: ExtractKind) -> Option<&'static str> {
    match kind {
        ExtractKind::Image => Some("img"),
        ExtractKind::Sound => Some("sound"),
        ExtractKind::Xml | ExtractKind::Unspecified => None,
    }
}

/// Streams entry bytes straight to disk, one open [`File`] per active target.
pub struct FsExtractor {
    output_root: Utf8PathBuf,
    policy: SecurityPolicy,
    active: Vec<File>,
}

impl FsExtractor {
    #[must_use]
    pub fn new(output_root: impl Into<Utf8PathBuf>, policy: SecurityPolicy) -> Self {
        Self {
            output_root: output_root.into(),
            policy,
            active: Vec::new(),
        }
    }

    fn target_path(&self, target: &ExtractTarget) -> Utf8PathBuf {
        let mascot_root = Utf8Path::new(&format!("{}.mascot", target.mascot)).to_owned();
        match kind_dir(target.kind) {
            Some(dir) => mascot_root.join(dir).join(&target.output_name),
            None => mascot_root.join(&target.output_name),
        }
    }
}

impl Extractor for FsExtractor {
    fn begin_write(&mut self, targets: &[ExtractTarget]) -> Result<()> {
        self.active.clear();
        for target in targets {
            let relative = self.target_path(target);
            let validated = match self.policy.normalize_and_validate(&relative, &self.output_root) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("warning: skipping unsafe output path {relative}: {err}");
                    continue;
                }
            };
            if let Some(parent) = validated.abs.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating output directory {parent}"))?;
            }
            let file = File::create(&validated.abs)
                .with_context(|| format!("creating output file {}", validated.abs))?;
            self.active.push(file);
        }
        Ok(())
    }

    fn write_next(&mut self, chunk: &[u8]) -> Result<()> {
        for file in &mut self.active {
            file.write_all(chunk).context("writing extracted bytes")?;
        }
        Ok(())
    }

    fn end_write(&mut self) -> Result<()> {
        for file in &mut self.active {
            file.flush().context("flushing extracted file")?;
        }
        self.active.clear();
        Ok(())
    }
}
