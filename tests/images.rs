//! Image Index and Matcher Integration Tests
//!
//! Builds indexes from real directory trees and resolves slugs against them.

use std::fs;
use std::path::Path;

use feedkit::images::{find_match, match_image, ImageIndex, MatchKind};
use tempfile::TempDir;

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"img").unwrap();
}

fn tree(files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in files {
        touch(dir.path(), file);
    }
    dir
}

#[test]
fn test_index_scans_recursively_and_filters_extensions() {
    let dir = tree(&[
        "Сон/Как спать лучше.png",
        "Спорт/Йога дома.PNG",
        "Спорт/deep/nested/Питание.png",
        "notes.txt",
        "cover.jpg",
    ]);

    let index = ImageIndex::build(dir.path(), &["png"]);

    assert_eq!(index.len(), 3);
    assert!(index.get("kak-spat-luchshe").is_some());
    assert!(index.get("yoga-doma").is_some());
    assert!(index.get("pitanie").is_some());
    assert!(index.get("cover").is_none());
}

#[test]
fn test_index_honours_configured_extensions() {
    let dir = tree(&["a/cover.jpg", "b/Сон.png"]);

    let index = ImageIndex::build(dir.path(), &[".JPG", "png"]);

    assert_eq!(index.file_count(), 2);
    assert!(index.get("cover").is_some());
}

#[test]
fn test_missing_root_gives_empty_index() {
    let dir = TempDir::new().unwrap();
    let index = ImageIndex::build(&dir.path().join("absent"), &["png"]);

    assert!(index.is_empty());
    assert!(index.pool().is_empty());
}

#[test]
fn test_shortest_filename_is_preferred() {
    let dir = tree(&["x/longer/YOGA .png", "x/Yoga.png"]);
    let index = ImageIndex::build(dir.path(), &["png"]);

    assert_eq!(index.get("yoga").map(|p| p.len()), Some(2));
    assert_eq!(
        match_image(&index, "yoga"),
        Some(dir.path().join("x/Yoga.png").as_path())
    );
}

#[test]
fn test_match_rules_in_priority_order() {
    let dir = tree(&[
        "Как спать лучше.png",
        "Йога дома 2.png",
        "Как спать.png",
        "Польза сна.png",
    ]);
    let index = ImageIndex::build(dir.path(), &["png"]);

    let kind = |slug: &str| find_match(&index, slug).map(|m| m.kind);

    assert_eq!(kind("kak-spat-luchshe"), Some(MatchKind::Exact));
    assert_eq!(kind("yoga-doma"), Some(MatchKind::Suffix(2)));
    assert_eq!(kind("kak-spat-bystro"), Some(MatchKind::Prefix));
    // "polza-sna" is a plain prefix here, so the token rule never runs
    assert_eq!(kind("polza-sna-dlya-zdorovya"), Some(MatchKind::Prefix));
    assert_eq!(kind("polza-krepkogo-sna"), Some(MatchKind::Fuzzy(22)));
    assert_eq!(kind("ovoshchi-letom"), None);
    assert_eq!(kind(""), None);
}

#[test]
fn test_pool_covers_every_file() {
    let dir = tree(&["a/Сон.png", "b/Сон.png", "c/Питание.png"]);
    let index = ImageIndex::build(dir.path(), &["png"]);

    assert_eq!(index.len(), 2);
    assert_eq!(index.pool().len(), 3);
}
