//! Fallback `actions.xml`/`behaviors.xml` bodies, embedded at compile time
//! and emitted for any mascot discovered without its own XML config.

pub const DEFAULT_ACTIONS_XML: &str = include_str!("../assets/default_actions.xml");
pub const DEFAULT_BEHAVIORS_XML: &str = include_str!("../assets/default_behaviors.xml");

/// The pair of files every mascot lacking its own config gets, named the
/// way [`crate::extractor::fs::FsExtractor`] expects.
#[must_use]
pub fn default_xml_files() -> [(&'static str, &'static str); 2] {
    [("actions.xml", DEFAULT_ACTIONS_XML), ("behaviors.xml", DEFAULT_BEHAVIORS_XML)]
}
