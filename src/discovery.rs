//! The three-phase discovery algorithm: tree-walk collection of candidate
//! mascot definitions (Phase A), XML-driven image/sound association
//! (Phase B), and orphaned `shimeN.png` run detection (Phase C).

use std::collections::{HashMap, HashSet};

use crate::actions_parser::parse_pose_references;
use crate::folder_tree::{FolderId, FolderTree};
use crate::model::{EntryTable, ExtractKind};
use crate::path_utils::{ascii_lowercase, last_component, normalize_filename};

/// Known synonyms for a mascot's behaviors/actions configuration files.
/// Archivers and older Shimeji-EE bundles use any of these names for the
/// same role.
const BEHAVIORS_SYNONYMS: &[&str] = &["行動.xml", "behaviors.xml", "behavior.xml", "two.xml", "2.xml"];
const ACTIONS_SYNONYMS: &[&str] = &["動作.xml", "actions.xml", "action.xml", "one.xml", "1.xml"];

/// Folder names that never count as a mascot's own name when climbing the
/// tree from a candidate base folder toward a usable display name.
const NAME_BLACKLIST: &[&str] = &["img", "conf", "shimeji", "unused", "shimeji-ee", "src", "/"];

/// One Phase A finding: a folder containing both an actions-synonym and a
/// behaviors-synonym entry (an "unparsed pair" in the source algorithm's
/// terms).
#[derive(Debug, Clone, Copy)]
pub struct PhaseACandidate {
    pub folder: FolderId,
    pub actions_index: usize,
    pub behaviors_index: usize,
}

/// BFS's `tree` looking for folders that contain both an actions-synonym and
/// a behaviors-synonym file. Returns one candidate per such folder, without
/// reading any file contents.
#[must_use]
pub fn phase_a(entries: &EntryTable, tree: &FolderTree) -> Vec<PhaseACandidate> {
    let mut candidates = Vec::new();
    let mut queue = vec![tree.root()];
    let mut cursor = 0;
    while cursor < queue.len() {
        let folder = queue[cursor];
        cursor += 1;

        if let (Some(actions_index), Some(behaviors_index)) =
            (find_synonym_index(entries, tree, folder, ACTIONS_SYNONYMS), find_synonym_index(entries, tree, folder, BEHAVIORS_SYNONYMS))
        {
            candidates.push(PhaseACandidate { folder, actions_index, behaviors_index });
        }

        for child in tree.child_folders(folder) {
            queue.push(child);
        }
    }
    candidates
}

fn has_own_config(entries: &EntryTable, tree: &FolderTree, folder: FolderId) -> bool {
    find_synonym_index(entries, tree, folder, ACTIONS_SYNONYMS).is_some() || find_synonym_index(entries, tree, folder, BEHAVIORS_SYNONYMS).is_some()
}

fn find_synonym_index(entries: &EntryTable, tree: &FolderTree, folder: FolderId, synonyms: &[&str]) -> Option<usize> {
    synonyms.iter().find_map(|name| find_index(entries, tree, folder, name))
}

fn find_index(entries: &EntryTable, tree: &FolderTree, folder: FolderId, name: &str) -> Option<usize> {
    let original_name = tree.entry_named(folder, name)?;
    let lower_path = ascii_lowercase(&format!("{}/{}", folder_path(tree, folder), original_name));
    entries.by_lower_path(&lower_path).map(|e| e.index)
}

fn folder_path(tree: &FolderTree, folder: FolderId) -> String {
    let mut parts = Vec::new();
    let mut current = folder;
    while !tree.is_root(current) {
        parts.push(tree.name(current).to_string());
        current = tree.parent(current);
    }
    parts.reverse();
    parts.join("/")
}

/// Climbs from `start` toward the root, skipping blacklisted or empty
/// folder names, returning the first acceptable one found. Falls back to
/// `fallback_name` if the climb reaches the root without finding one.
fn derive_mascot_name(tree: &FolderTree, start: FolderId, fallback_name: &str) -> String {
    let mut current = start;
    loop {
        if tree.is_root(current) {
            return fallback_name.to_string();
        }
        let name = tree.name(current);
        if !name.is_empty() && !NAME_BLACKLIST.contains(&ascii_lowercase(name).as_str()) {
            return name.to_string();
        }
        current = tree.parent(current);
    }
}

/// For each unparsed pair found by [`phase_a`], parses its actions XML into
/// a path set, then either splits the pair across a Shimeji-EE bundle's
/// `img` subfolders (one mascot per subfolder, sharing the pair's XMLs) or
/// associates the pair's own folder as a single mascot. Returns the set of
/// entry indices claimed, so Phase C can skip them.
pub fn phase_b(entries: &mut EntryTable, tree: &FolderTree, candidates: &[PhaseACandidate], xml_by_index: &HashMap<usize, String>, fallback_name: &str) -> HashSet<usize> {
    let mut claimed = HashSet::new();
    for candidate in candidates {
        let Some(xml) = xml_by_index.get(&candidate.actions_index) else { continue };
        let Some(refs) = parse_pose_references(xml) else { continue };

        let mut paths: Vec<String> = refs.into_iter().map(|r| r.raw_path).collect();
        paths.sort();
        paths.dedup();
        if paths.is_empty() {
            continue;
        }

        let folder = candidate.folder;
        let parent = tree.parent(folder);
        let is_conf = ascii_lowercase(tree.name(folder)) == "conf";
        let sibling_img = if is_conf { tree.folder_named(parent, "img") } else { None };

        let mut bundle_successes = 0;
        if let Some(img_folder) = sibling_img {
            for subfolder in tree.child_folders(img_folder).collect::<Vec<_>>() {
                if ascii_lowercase(tree.name(subfolder)) == "unused" {
                    continue;
                }
                if has_own_config(entries, tree, subfolder) {
                    continue;
                }
                if associate(tree, entries, subfolder, &paths, candidate.actions_index, candidate.behaviors_index, fallback_name, &mut claimed) {
                    bundle_successes += 1;
                }
            }
        }

        if bundle_successes == 0 {
            associate(tree, entries, folder, &paths, candidate.actions_index, candidate.behaviors_index, fallback_name, &mut claimed);
        }
    }
    claimed
}

/// Search roots fanned out from `base`, in the order the association
/// procedure tries them: the base folder itself, its `img`/`sound`
/// subfolders, then the same three at the parent level.
fn search_roots(tree: &FolderTree, base: FolderId) -> Vec<FolderId> {
    let mut roots = vec![base];
    if let Some(id) = tree.folder_named(base, "img") {
        roots.push(id);
    }
    if let Some(id) = tree.folder_named(base, "sound") {
        roots.push(id);
    }
    let parent = tree.parent(base);
    roots.push(parent);
    if let Some(id) = tree.folder_named(parent, "img") {
        roots.push(id);
    }
    if let Some(id) = tree.folder_named(parent, "sound") {
        roots.push(id);
    }
    roots
}

/// Resolves `raw_path` (an actions-XML path reference, possibly rooted with
/// a leading `/` and possibly naming subdirectories) against `base`, trying
/// exactly one search root.
fn relative_file(tree: &FolderTree, entries: &EntryTable, base: FolderId, raw_path: &str) -> Option<usize> {
    let cleaned = raw_path.trim_start_matches('/');
    let mut parts: Vec<&str> = cleaned.split('/').filter(|c| !c.is_empty()).collect();
    let file_name = parts.pop()?;
    let dir_relative = parts.join("/");
    let folder = tree.relative_folder(base, &dir_relative);
    let original_name = tree.entry_named(folder, file_name)?;
    let full_path = if tree.is_root(folder) { original_name.to_string() } else { format!("{}/{}", folder_path(tree, folder), original_name) };
    entries.by_lower_path(&ascii_lowercase(&full_path)).map(|e| e.index)
}

/// The association procedure: derives `base`'s mascot name, resolves every
/// path in `paths` against the search-root fan-out, and — if at least one
/// resolved to a PNG — registers the mascot, attaching IMAGE/SOUND targets
/// for every resolved hit plus an `actions.xml`/`behaviors.xml` target on
/// the pair's own entries. Returns whether the association was accepted.
fn associate(
    tree: &FolderTree,
    entries: &mut EntryTable,
    base: FolderId,
    paths: &[String],
    actions_index: usize,
    behaviors_index: usize,
    fallback_name: &str,
    claimed: &mut HashSet<usize>,
) -> bool {
    let mascot_name = derive_mascot_name(tree, base, fallback_name);
    let roots = search_roots(tree, base);

    let mut hits: Vec<(usize, ExtractKind, String)> = Vec::new();
    for raw_path in paths {
        let Some(index) = roots.iter().find_map(|&root| relative_file(tree, entries, root, raw_path)) else {
            continue;
        };
        let kind = match entries.by_index(index).map(|e| e.lower_extension()) {
            Some(ext) if ext == "png" => ExtractKind::Image,
            Some(ext) if ext == "wav" => ExtractKind::Sound,
            _ => continue,
        };
        hits.push((index, kind, raw_path.clone()));
    }

    if !hits.iter().any(|(_, kind, _)| *kind == ExtractKind::Image) {
        return false;
    }

    for (index, kind, raw_path) in &hits {
        let output_name = normalize_filename(raw_path);
        if let Some(entry) = entries.by_index_mut(*index) {
            entry.add_target(mascot_name.as_str(), output_name, *kind);
        }
        claimed.insert(*index);
    }
    if let Some(entry) = entries.by_index_mut(actions_index) {
        entry.add_target(mascot_name.as_str(), "actions.xml", ExtractKind::Xml);
    }
    if let Some(entry) = entries.by_index_mut(behaviors_index) {
        entry.add_target(mascot_name.as_str(), "behaviors.xml", ExtractKind::Xml);
    }
    true
}

/// Required run length for an orphaned `shimeN.png` bundle.
const SHIME_RUN_LENGTH: u32 = 46;

/// Finds directories containing an unclaimed, exactly-46-long
/// `shime1.png..shime46.png` run with no `shime47.png` present, and claims
/// them as their own mascot.
pub fn phase_c(entries: &mut EntryTable, tree: &FolderTree, already_claimed: &HashSet<usize>, fallback_name: &str) -> Vec<String> {
    let mut by_dir: HashMap<String, Vec<(u32, usize)>> = HashMap::new();
    for entry in entries.iter() {
        if already_claimed.contains(&entry.index) {
            continue;
        }
        if let Some(n) = shime_index(entry.name()) {
            by_dir.entry(entry.dir().to_string()).or_default().push((n, entry.index));
        }
    }

    let mut mascots = Vec::new();
    for (dir, mut members) in by_dir {
        members.sort_by_key(|(n, _)| *n);
        let present: HashSet<u32> = members.iter().map(|(n, _)| *n).collect();
        let run_complete = (1..=SHIME_RUN_LENGTH).all(|n| present.contains(&n));
        if !run_complete || present.contains(&(SHIME_RUN_LENGTH + 1)) {
            continue;
        }

        let folder = resolve_folder(tree, &dir);
        let mascot_name = derive_mascot_name(tree, folder, fallback_name);
        for (n, index) in &members {
            if *n > SHIME_RUN_LENGTH {
                continue;
            }
            if let Some(entry) = entries.by_index_mut(*index) {
                entry.add_target(mascot_name.as_str(), format!("shime{n}.png"), ExtractKind::Image);
            }
        }
        mascots.push(mascot_name);
    }
    mascots
}

fn resolve_folder(tree: &FolderTree, dir: &str) -> FolderId {
    tree.relative_folder(tree.root(), dir)
}

/// Parses `shimeN.png` (case-insensitive), returning `N`.
fn shime_index(file_name: &str) -> Option<u32> {
    let lower = ascii_lowercase(file_name);
    let stem = lower.strip_prefix("shime")?.strip_suffix(".png")?;
    stem.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_tree(paths: &[&str]) -> (EntryTable, FolderTree) {
        let mut entries = EntryTable::new();
        let mut tree = FolderTree::new();
        for (index, path) in paths.iter().enumerate() {
            entries.push_raw(index, (*path).to_string(), 10);
            tree.insert_path(path);
        }
        (entries, tree)
    }

    #[test]
    fn phase_a_finds_classic_conf_pair() {
        let (entries, tree) = build_tree(&["MyPet/conf/actions.xml", "MyPet/conf/behaviors.xml", "MyPet/img/shime1.png"]);
        let candidates = phase_a(&entries, &tree);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn phase_a_recognizes_filename_synonyms() {
        let (entries, tree) = build_tree(&["MyPet/conf/action.xml", "MyPet/conf/behavior.xml"]);
        let candidates = phase_a(&entries, &tree);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn phase_b_resolves_rooted_image_reference_under_mascot_img_folder() {
        let (mut entries, tree) = build_tree(&["MyPet/conf/actions.xml", "MyPet/conf/behaviors.xml", "MyPet/img/shime1.png"]);
        let candidates = phase_a(&entries, &tree);
        let actions_index = candidates[0].actions_index;
        let mut xml = HashMap::new();
        xml.insert(actions_index, r#"<Mascot><Pose Image="/shime1.png"/></Mascot>"#.to_string());
        let claimed = phase_b(&mut entries, &tree, &candidates, &xml, "fallback");
        let image_entry = entries.by_lower_path("mypet/img/shime1.png").unwrap();
        assert_eq!(image_entry.targets.len(), 1);
        assert_eq!(image_entry.targets[0].mascot, "MyPet");
        assert!(claimed.contains(&image_entry.index));

        let actions_entry = entries.by_index(actions_index).unwrap();
        assert!(actions_entry.targets.iter().any(|t| t.output_name == "actions.xml" && t.mascot == "MyPet"));
        let behaviors_entry = entries.by_index(candidates[0].behaviors_index).unwrap();
        assert!(behaviors_entry.targets.iter().any(|t| t.output_name == "behaviors.xml" && t.mascot == "MyPet"));
    }

    #[test]
    fn phase_b_splits_shimeji_ee_bundle_by_img_subfolder() {
        let (mut entries, tree) = build_tree(&[
            "conf/actions.xml",
            "conf/behaviors.xml",
            "img/Cat/shime1.png",
            "img/Dog/shime1.png",
            "img/unused/shime1.png",
        ]);
        let candidates = phase_a(&entries, &tree);
        assert_eq!(candidates.len(), 1);
        let actions_index = candidates[0].actions_index;
        let mut xml = HashMap::new();
        xml.insert(actions_index, r#"<Mascot><Pose Image="/shime1.png"/></Mascot>"#.to_string());
        let claimed = phase_b(&mut entries, &tree, &candidates, &xml, "fallback");

        assert_eq!(entries.by_lower_path("img/cat/shime1.png").unwrap().targets[0].mascot, "Cat");
        assert_eq!(entries.by_lower_path("img/dog/shime1.png").unwrap().targets[0].mascot, "Dog");
        assert!(entries.by_lower_path("img/unused/shime1.png").unwrap().targets.is_empty());
        assert_eq!(claimed.len(), 2);

        let actions_entry = entries.by_index(actions_index).unwrap();
        assert!(actions_entry.targets.iter().any(|t| t.mascot == "Cat" && t.output_name == "actions.xml"));
        assert!(actions_entry.targets.iter().any(|t| t.mascot == "Dog" && t.output_name == "actions.xml"));
    }

    #[test]
    fn phase_b_falls_back_to_whole_folder_when_bundle_scan_finds_nothing() {
        let (mut entries, tree) = build_tree(&["conf/actions.xml", "conf/behaviors.xml", "shime1.png"]);
        let candidates = phase_a(&entries, &tree);
        let actions_index = candidates[0].actions_index;
        let mut xml = HashMap::new();
        xml.insert(actions_index, r#"<Mascot><Pose Image="/shime1.png"/></Mascot>"#.to_string());
        let claimed = phase_b(&mut entries, &tree, &candidates, &xml, "Fallback");
        let image_entry = entries.by_lower_path("shime1.png").unwrap();
        assert_eq!(image_entry.targets[0].mascot, "Fallback");
        assert_eq!(claimed.len(), 1);
    }

    #[test]
    fn association_is_rejected_without_an_image_hit() {
        let (mut entries, tree) = build_tree(&["MyPet/conf/actions.xml", "MyPet/conf/behaviors.xml", "MyPet/sound/tap.wav"]);
        let candidates = phase_a(&entries, &tree);
        let actions_index = candidates[0].actions_index;
        let mut xml = HashMap::new();
        xml.insert(actions_index, r#"<Mascot><Pose Sound="/tap.wav"/></Mascot>"#.to_string());
        let claimed = phase_b(&mut entries, &tree, &candidates, &xml, "fallback");
        assert!(claimed.is_empty());
        assert!(entries.by_lower_path("mypet/sound/tap.wav").unwrap().targets.is_empty());
    }

    #[test]
    fn derive_mascot_name_skips_the_full_blacklist() {
        let mut tree = FolderTree::new();
        tree.insert_path("shimeji-ee/src/unused/shime1.png");
        let folder = tree.relative_folder(tree.root(), "shimeji-ee/src/unused");
        assert_eq!(derive_mascot_name(&tree, folder, "Fallback"), "Fallback");
    }

    #[test]
    fn phase_c_detects_exact_46_run() {
        let paths: Vec<String> = (1..=46).map(|n| format!("Orphan/shime{n}.png")).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let (mut entries, tree) = build_tree(&refs);
        let claimed = HashSet::new();
        let mascots = phase_c(&mut entries, &tree, &claimed, "fallback");
        assert_eq!(mascots, vec!["Orphan".to_string()]);
        assert_eq!(entries.by_lower_path("orphan/shime1.png").unwrap().targets.len(), 1);
    }

    #[test]
    fn phase_c_rejects_run_with_shime47() {
        let mut paths: Vec<String> = (1..=46).map(|n| format!("Orphan/shime{n}.png")).collect();
        paths.push("Orphan/shime47.png".to_string());
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let (mut entries, tree) = build_tree(&refs);
        let claimed = HashSet::new();
        let mascots = phase_c(&mut entries, &tree, &claimed, "fallback");
        assert!(mascots.is_empty());
    }

    #[test]
    fn phase_c_rejects_incomplete_run() {
        let paths: Vec<String> = (1..=45).map(|n| format!("Orphan/shime{n}.png")).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let (mut entries, tree) = build_tree(&refs);
        let claimed = HashSet::new();
        let mascots = phase_c(&mut entries, &tree, &claimed, "fallback");
        assert!(mascots.is_empty());
    }

    #[test]
    fn phase_c_skips_already_claimed_entries() {
        let paths: Vec<String> = (1..=46).map(|n| format!("Orphan/shime{n}.png")).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let (mut entries, tree) = build_tree(&refs);
        let first_index = entries.by_lower_path("orphan/shime1.png").unwrap().index;
        let mut claimed = HashSet::new();
        claimed.insert(first_index);
        let mascots = phase_c(&mut entries, &tree, &claimed, "fallback");
        assert!(mascots.is_empty(), "a claimed member should break the run");
    }
}
