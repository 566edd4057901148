//! Case-insensitive virtual directory tree over an archive's entries.
//!
//! Rust has no natural null-parent sentinel without `Option` everywhere, so
//! this tree uses an arena (`Vec<FolderNodeData>`) with parent links as
//! plain `usize` indices: the root's parent index is its own index, so
//! walking "up" from the root is a no-op instead of a branch.

use std::collections::BTreeMap;

/// Index into [`FolderTree`]'s arena. `BTreeMap` children give deterministic,
/// case-folded iteration order (invariant 2).
pub type FolderId = usize;

#[derive(Debug, Clone)]
struct FolderNodeData {
    parent: FolderId,
    name: String,
    children: BTreeMap<String, FolderId>,
    /// Lower-cased file name -> original-case entry path, for files living
    /// directly in this folder.
    files: BTreeMap<String, String>,
}

/// Arena-owned, case-insensitive directory tree built from an archive's
/// entry paths.
#[derive(Debug, Clone)]
pub struct FolderTree {
    nodes: Vec<FolderNodeData>,
    root: FolderId,
}

impl FolderTree {
    /// Builds an empty tree whose root's parent is itself, so that
    /// following `..` past the root simply stays at the root.
    #[must_use]
    pub fn new() -> Self {
        let root_node = FolderNodeData {
            parent: 0,
            name: String::new(),
            children: BTreeMap::new(),
            files: BTreeMap::new(),
        };
        Self {
            nodes: vec![root_node],
            root: 0,
        }
    }

    #[must_use]
    pub fn root(&self) -> FolderId {
        self.root
    }

    /// Registers a file path (e.g. `"MyPet/Conf/Actions.xml"`), creating any
    /// missing intermediate folders.
    pub fn insert_path(&mut self, path: &str) {
        let mut components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
        let Some(file_name) = components.pop() else {
            return;
        };
        let mut current = self.root;
        for component in components {
            current = self.child_or_create(current, component);
        }
        let lower = crate::path_utils::ascii_lowercase(file_name);
        self.nodes[current].files.insert(lower, file_name.to_string());
    }

    fn child_or_create(&mut self, parent: FolderId, name: &str) -> FolderId {
        let lower = crate::path_utils::ascii_lowercase(name);
        if let Some(&id) = self.nodes[parent].children.get(&lower) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(FolderNodeData {
            parent,
            name: name.to_string(),
            children: BTreeMap::new(),
            files: BTreeMap::new(),
        });
        self.nodes[parent].children.insert(lower, id);
        id
    }

    /// The parent of `id`; the root is its own parent.
    #[must_use]
    pub fn parent(&self, id: FolderId) -> FolderId {
        self.nodes[id].parent
    }

    #[must_use]
    pub fn is_root(&self, id: FolderId) -> bool {
        id == self.root
    }

    #[must_use]
    pub fn name(&self, id: FolderId) -> &str {
        &self.nodes[id].name
    }

    /// Case-insensitive lookup of a direct child folder by name.
    #[must_use]
    pub fn folder_named(&self, id: FolderId, name: &str) -> Option<FolderId> {
        let lower = crate::path_utils::ascii_lowercase(name);
        self.nodes[id].children.get(&lower).copied()
    }

    /// Case-insensitive lookup of a direct child file by name, returning its
    /// original-case name as stored.
    #[must_use]
    pub fn entry_named(&self, id: FolderId, name: &str) -> Option<&str> {
        let lower = crate::path_utils::ascii_lowercase(name);
        self.nodes[id].files.get(&lower).map(String::as_str)
    }

    #[must_use]
    pub fn child_folders(&self, id: FolderId) -> impl Iterator<Item = FolderId> + '_ {
        self.nodes[id].children.values().copied()
    }

    #[must_use]
    pub fn child_files(&self, id: FolderId) -> impl Iterator<Item = &str> {
        self.nodes[id].files.values().map(String::as_str)
    }

    /// Resolves a `/`-separated relative path from `from`, honoring `.` and
    /// `..` components; `..` at the root stays at the root rather than
    /// erroring, mirroring `archive_folder::parent()`'s clamp behavior.
    #[must_use]
    pub fn relative_folder(&self, from: FolderId, relative: &str) -> FolderId {
        let mut current = from;
        for component in relative.split('/').filter(|c| !c.is_empty()) {
            current = match component {
                "." => current,
                ".." => self.parent(current),
                name => match self.folder_named(current, name) {
                    Some(id) => id,
                    None => return current,
                },
            };
        }
        current
    }
}

impl Default for FolderTree {
    fn default() -> Self {
        Self::new()
    }
}
