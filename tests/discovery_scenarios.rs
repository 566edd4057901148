//! End-to-end discovery scenarios, each built as a synthetic ZIP archive on
//! the fly with the `zip` crate's writer API rather than a checked-in binary
//! fixture.

use std::io::Write as _;

use shimeji_extract::orchestrator::{analyze, extract, AnalyzeConfig};
use shimeji_extract::policy::SecurityPolicy;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn zip_with(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    let mut writer = ZipWriter::new(&mut buf);
    let opts = SimpleFileOptions::default();
    for (name, contents) in files {
        writer.start_file(*name, opts).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap();
    buf.into_inner()
}

fn config() -> AnalyzeConfig {
    AnalyzeConfig {
        fallback_name: "Fallback".to_string(),
        only_thumbnails: false,
    }
}

/// S1: a single monolithic mascot — rooted pose references (`"/shime1.png"`)
/// resolve through the parent-folder `img` search root, and the pair's own
/// actions/behaviors entries get claimed as targets too.
#[test]
fn s1_classic_layout_discovers_single_mascot() {
    let bytes = zip_with(&[
        ("MyPet/conf/actions.xml", br#"<Mascot><Pose Image="/shime1.png"/><Pose Image="/shime2.png"/></Mascot>"#),
        ("MyPet/conf/behaviors.xml", b"<Mascot></Mascot>"),
        ("MyPet/img/shime1.png", b"png-bytes-1"),
        ("MyPet/img/shime2.png", b"png-bytes-2"),
    ]);
    let analyzed = analyze(bytes, &config()).expect("analyze");
    let report = analyzed.report();
    assert_eq!(report.mascots, vec!["MyPet".to_string()]);
    assert!(report.default_xml_mascots.is_empty());
    // 2 images + actions.xml + behaviors.xml
    assert_eq!(report.targets.len(), 4);
    assert!(report.targets.iter().any(|t| t.output_name == "actions.xml"));
    assert!(report.targets.iter().any(|t| t.output_name == "behaviors.xml"));
}

/// S2: a Shimeji-EE bundle — one shared `conf/actions.xml`+`behaviors.xml`
/// pair, with per-mascot assets under `img/<Name>/`, and an `img/unused`
/// folder that must not become a third mascot.
#[test]
fn s2_shimeji_ee_bundle_discovers_multiple_mascots() {
    let bytes = zip_with(&[
        ("conf/actions.xml", br#"<Mascot><Pose Image="/shime1.png"/></Mascot>"#),
        ("conf/behaviors.xml", b"<Mascot></Mascot>"),
        ("img/Cat/shime1.png", b"a"),
        ("img/Cat/shime2.png", b"a2"),
        ("img/Dog/shime1.png", b"b"),
        ("img/Dog/shime2.png", b"b2"),
        ("img/unused/shime1.png", b"ignored"),
    ]);
    let analyzed = analyze(bytes, &config()).expect("analyze");
    let mut mascots = analyzed.report().mascots;
    mascots.sort();
    assert_eq!(mascots, vec!["Cat".to_string(), "Dog".to_string()]);
    assert!(analyzed.entries().iter().find(|e| e.lower_path == "img/unused/shime1.png").unwrap().targets.is_empty());
}

/// S3: an orphaned directory of exactly `shime1.png`..`shime46.png` with no
/// actions.xml is still discovered, via Phase C, and gets default XMLs.
#[test]
fn s3_orphaned_shime_run_falls_back_to_default_xmls() {
    let mut files: Vec<(String, Vec<u8>)> =
        (1..=46).map(|n| (format!("Orphan/shime{n}.png"), b"x".to_vec())).collect();
    files.push(("unrelated.txt".to_string(), b"ignored".to_vec()));
    let refs: Vec<(&str, &[u8])> = files.iter().map(|(n, d)| (n.as_str(), d.as_slice())).collect();
    let bytes = zip_with(&refs);

    let analyzed = analyze(bytes, &config()).expect("analyze");
    let report = analyzed.report();
    assert_eq!(report.mascots, vec!["Orphan".to_string()]);
    assert_eq!(report.default_xml_mascots, vec!["Orphan".to_string()]);
    assert_eq!(report.targets.len(), 46);
}

/// S4: a 45-file (incomplete) run is not mistaken for a mascot.
#[test]
fn s4_incomplete_shime_run_is_not_a_mascot() {
    let files: Vec<(String, Vec<u8>)> =
        (1..=45).map(|n| (format!("Orphan/shime{n}.png"), b"x".to_vec())).collect();
    let refs: Vec<(&str, &[u8])> = files.iter().map(|(n, d)| (n.as_str(), d.as_slice())).collect();
    let bytes = zip_with(&refs);

    let analyzed = analyze(bytes, &config()).expect("analyze");
    assert!(analyzed.report().mascots.is_empty());
}

/// S5: an image living directly in the shared `img` folder, outside any
/// subfolder, is resolved by every bundle mascot via the parent search root
/// and ends up with two targets on the same entry (invariant 3); extraction
/// writes both copies without error.
#[test]
fn s5_shared_image_gets_two_targets_and_extracts_both() {
    let bytes = zip_with(&[
        ("conf/actions.xml", br#"<Mascot><Pose Image="/shared.png"/></Mascot>"#),
        ("conf/behaviors.xml", b"<Mascot></Mascot>"),
        ("img/shared.png", b"shared-bytes"),
        ("img/Cat/marker.png", b"cat-marker"),
        ("img/Dog/marker.png", b"dog-marker"),
    ]);
    let mut analyzed = analyze(bytes, &config()).expect("analyze");
    let shared = analyzed.entries().iter().find(|e| e.lower_path == "img/shared.png").expect("shared entry");
    assert_eq!(shared.targets.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let root = camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let report = extract(&mut analyzed, &root, SecurityPolicy::new(), &config()).expect("extract");
    assert!(report.targets.len() >= 2);
    assert!(root.join("Cat.mascot/img/shared.png").exists());
    assert!(root.join("Dog.mascot/img/shared.png").exists());
}

/// S6: a nested `src.zip` is skipped by convention (unmodified copy of the
/// mascot's own source), while a sibling nested archive is still recursed
/// into and registered normally.
#[test]
fn s6_nested_src_zip_is_skipped_by_convention() {
    let cat_zip = zip_with(&[
        ("Cat/conf/actions.xml", br#"<Mascot><Pose Image="/shime1.png"/></Mascot>"#),
        ("Cat/conf/behaviors.xml", b"<Mascot></Mascot>"),
        ("Cat/img/shime1.png", b"cat-bytes"),
    ]);
    let src_zip = zip_with(&[
        ("Hidden/conf/actions.xml", br#"<Mascot><Pose Image="/shime1.png"/></Mascot>"#),
        ("Hidden/conf/behaviors.xml", b"<Mascot></Mascot>"),
        ("Hidden/img/shime1.png", b"src-bytes"),
    ]);
    let outer = zip_with(&[("Cat.zip", &cat_zip), ("src.zip", &src_zip)]);

    let analyzed = analyze(outer, &config()).expect("analyze");
    assert_eq!(analyzed.report().mascots, vec!["Cat".to_string()]);
}

/// Entries that fail the extension filter (`png|wav|xml`) never reach
/// discovery at all, even if they share a mascot's directory.
#[test]
fn untracked_extensions_are_filtered_before_discovery() {
    let bytes = zip_with(&[
        ("Tori/conf/actions.xml", br#"<Mascot><Pose Image="img/shime1.png"/></Mascot>"#),
        ("Tori/conf/behaviors.xml", b"<Mascot></Mascot>"),
        ("Tori/img/shime1.png", b"png-bytes"),
        ("Tori/readme.txt", b"not tracked"),
        ("Tori/license.md", b"not tracked"),
    ]);
    let analyzed = analyze(bytes, &config()).expect("analyze");
    assert_eq!(analyzed.entries().len(), 3);
}
