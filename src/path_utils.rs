//! ASCII-only path helpers used throughout discovery.
//!
//! Everything here operates on `/`-separated, already-UTF-8 strings; locale
//! and platform path separators never enter this module.

/// Lower-cases ASCII letters only, leaving every other byte untouched.
#[must_use]
pub fn ascii_lowercase(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_ascii_uppercase() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// The substring after the last `.` in the last path component, or `""`.
#[must_use]
pub fn file_extension(path: &str) -> &str {
    let name = last_component(path);
    match name.rfind('.') {
        Some(pos) => &name[pos + 1..],
        None => "",
    }
}

/// The substring after the last `/`, or the whole string if there is none.
#[must_use]
pub fn last_component(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// The substring before the last `/`, or `""` if there is none.
#[must_use]
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// Flattens a nested asset path into a single lower-cased output filename:
/// strip leading `/`s, replace remaining `/` with `_`, lower-case.
#[must_use]
pub fn normalize_filename(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    ascii_lowercase(&trimmed.replace('/', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_ascii_only() {
        assert_eq!(ascii_lowercase("MyPet_画像.PNG"), "mypet_画像.png");
    }

    #[test]
    fn extension_of_last_component() {
        assert_eq!(file_extension("a/b/shime1.PNG"), "PNG");
        assert_eq!(file_extension("a/b/noext"), "");
        assert_eq!(file_extension("a.b/noext"), "");
    }

    #[test]
    fn last_component_strips_directories() {
        assert_eq!(last_component("a/b/c.xml"), "c.xml");
        assert_eq!(last_component("c.xml"), "c.xml");
    }

    #[test]
    fn dirname_strips_filename() {
        assert_eq!(dirname("a/b/c.xml"), "a/b");
        assert_eq!(dirname("c.xml"), "");
    }

    #[test]
    fn normalize_flattens_and_lowercases() {
        assert_eq!(normalize_filename("/Sub/Shime1.PNG"), "sub_shime1.png");
        assert_eq!(normalize_filename("shime1.png"), "shime1.png");
    }
}
