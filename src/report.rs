//! JSON summary of a discovery/extraction run: gives the CLI a serializable
//! record of what happened without coupling callers to the internal data
//! model.

use serde::Serialize;

use crate::model::{EntryTable, ExtractKind};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum ReportKind {
    Image,
    Sound,
    Xml,
    Unspecified,
}

impl From<ExtractKind> for ReportKind {
    fn from(kind: ExtractKind) -> Self {
        match kind {
            ExtractKind::Image => Self::Image,
            ExtractKind::Sound => Self::Sound,
            ExtractKind::Xml => Self::Xml,
            ExtractKind::Unspecified => Self::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportTarget {
    pub entry: String,
    pub mascot: String,
    pub output_name: String,
    pub kind: ReportKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub mascots: Vec<String>,
    pub default_xml_mascots: Vec<String>,
    pub targets: Vec<ReportTarget>,
}

impl Report {
    /// Builds a report from a fully-resolved entry table (every
    /// `ExtractTarget` already assigned by Discovery) plus the list of
    /// mascots that fell back to [`crate::default_xmls`].
    #[must_use]
    pub fn from_entries(entries: &EntryTable, default_xml_mascots: Vec<String>) -> Self {
        let mut mascots = std::collections::BTreeSet::new();
        let mut targets = Vec::new();
        for entry in entries.iter() {
            for target in &entry.targets {
                mascots.insert(target.mascot.clone());
                targets.push(ReportTarget {
                    entry: entry.path.clone(),
                    mascot: target.mascot.clone(),
                    output_name: target.output_name.clone(),
                    kind: target.kind.into(),
                });
            }
        }
        Self {
            mascots: mascots.into_iter().collect(),
            default_xml_mascots,
            targets,
        }
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
