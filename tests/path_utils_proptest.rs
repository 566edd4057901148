//! Property tests for `PathUtils` and `FolderTree::relative_folder`.

use proptest::prelude::*;
use shimeji_extract::folder_tree::FolderTree;
use shimeji_extract::path_utils::{ascii_lowercase, dirname, file_extension, last_component};

proptest! {
    #[test]
    fn last_component_and_dirname_recombine(
        segments in prop::collection::vec("[a-z0-9]{1,6}", 1..5),
    ) {
        let path = segments.join("/");
        let dir = dirname(&path);
        let name = last_component(&path);
        let recombined = if dir.is_empty() { name.to_string() } else { format!("{dir}/{name}") };
        prop_assert_eq!(recombined, path);
    }

    #[test]
    fn ascii_lowercase_is_idempotent(s in ".*") {
        let once = ascii_lowercase(&s);
        let twice = ascii_lowercase(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn file_extension_is_substring_of_last_component(
        segments in prop::collection::vec("[a-zA-Z0-9.]{1,8}", 1..4),
    ) {
        let path = segments.join("/");
        let ext = file_extension(&path);
        let name = last_component(&path);
        prop_assert!(ext.is_empty() || name.ends_with(ext));
    }

    #[test]
    fn relative_folder_parent_dot_dot_never_panics(
        segments in prop::collection::vec(
            prop_oneof![
                "[a-z0-9]{1,6}".prop_map(|s| s),
                Just("..".to_string()),
                Just(".".to_string()),
            ],
            1..8,
        )
    ) {
        let mut tree = FolderTree::new();
        tree.insert_path("a/b/c/d.xml");
        let relative = segments.join("/");
        let _ = tree.relative_folder(tree.root(), &relative);
    }
}
