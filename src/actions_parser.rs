//! Parses `actions.xml`-shaped documents for image/sound references.
//!
//! Finds the `Mascot`/`マスコット` root (English and Japanese element names
//! are both legitimate, matching shimeji packages built for either locale),
//! then walks every `Pose`/`ポーズ` descendant and collects its
//! `画像`/`Image`/`ImageRight`/`Sound` attributes. `roxmltree` gives us the
//! whole document as a tree up front, which lets this walk be a plain
//! breadth-first traversal instead of a streaming parser's state machine.

use roxmltree::{Document, Node};

/// Which attribute a [`PoseReference`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseAttribute {
    Image,
    ImageRight,
    Sound,
}

/// One `(attribute, raw path)` pair pulled off a `Pose` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoseReference {
    pub attribute: PoseAttribute,
    pub raw_path: String,
}

const MASCOT_NAMES: [&str; 2] = ["Mascot", "マスコット"];
const POSE_NAMES: [&str; 2] = ["Pose", "ポーズ"];

fn is_pose(node: Node) -> bool {
    node.is_element() && POSE_NAMES.iter().any(|n| node.has_tag_name(*n))
}

/// Parses an actions/behaviors document and returns every pose reference
/// found under a `Mascot`/`マスコット` root, in document order.
///
/// Returns `None` if the bytes aren't well-formed XML or no mascot root is
/// present; this is a non-fatal condition the caller should log and skip,
/// not propagate.
#[must_use]
pub fn parse_pose_references(xml: &str) -> Option<Vec<PoseReference>> {
    let doc = Document::parse(xml).ok()?;
    let root = find_first(doc.root(), &MASCOT_NAMES)?;

    let mut refs = Vec::new();
    let mut queue: Vec<Node> = vec![root];
    let mut cursor = 0;
    while cursor < queue.len() {
        let node = queue[cursor];
        cursor += 1;
        if is_pose(node) {
            collect_pose_attributes(node, &mut refs);
        }
        for child in node.children().filter(Node::is_element) {
            queue.push(child);
        }
    }
    Some(refs)
}

fn collect_pose_attributes(node: Node, out: &mut Vec<PoseReference>) {
    for attr in node.attributes() {
        let kind = match attr.name() {
            "画像" | "Image" => Some(PoseAttribute::Image),
            "ImageRight" => Some(PoseAttribute::ImageRight),
            "Sound" => Some(PoseAttribute::Sound),
            _ => None,
        };
        if let Some(attribute) = kind {
            let value = attr.value().trim();
            if !value.is_empty() {
                out.push(PoseReference {
                    attribute,
                    raw_path: value.to_string(),
                });
            }
        }
    }
}

/// Breadth-first search for the first descendant element whose tag name is
/// one of `names`.
fn find_first<'a, 'input>(start: Node<'a, 'input>, names: &[&str]) -> Option<Node<'a, 'input>> {
    let mut queue: Vec<Node> = vec![start];
    let mut cursor = 0;
    while cursor < queue.len() {
        let node = queue[cursor];
        cursor += 1;
        if node.is_element() && names.iter().any(|n| node.has_tag_name(*n)) {
            return Some(node);
        }
        for child in node.children().filter(Node::is_element) {
            queue.push(child);
        }
    }
    None
}
