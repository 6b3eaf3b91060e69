//! Index of candidate cover images keyed by slugified basename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::article::slugify;

/// Image extensions picked up when none are configured
pub const DEFAULT_EXTENSIONS: &[&str] = &["png"];

/// Mapping from slugified image basename to candidate paths.
///
/// Keys iterate in lexicographic order. Each path list is ordered by
/// filename length, shortest first, so the first path is the preferred one.
#[derive(Debug, Clone, Default)]
pub struct ImageIndex {
    entries: BTreeMap<String, Vec<PathBuf>>,
}

impl ImageIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Recursively scan `root` for files with one of `extensions` (case-insensitive).
    ///
    /// A missing root yields an empty index; callers decide whether that is fatal.
    pub fn build(root: &Path, extensions: &[impl AsRef<str>]) -> Self {
        let mut index = Self::new();

        if !root.is_dir() {
            tracing::debug!("Image directory {} does not exist", root.display());
            return index;
        }

        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
        {
            if has_extension(entry.path(), extensions) {
                index.insert(entry.into_path());
            }
        }

        index.sort_candidates();
        index
    }

    /// Add a path under the slug of its file stem
    pub fn insert(&mut self, path: PathBuf) {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.entries.entry(slugify(&stem)).or_default().push(path);
    }

    /// Order every candidate list shortest filename first (stable)
    pub fn sort_candidates(&mut self) {
        for paths in self.entries.values_mut() {
            paths.sort_by_key(|p| file_name_len(p));
        }
    }

    /// Candidates for an exact key
    pub fn get(&self, key: &str) -> Option<&[PathBuf]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Stored key and candidates for an exact key
    pub fn get_entry(&self, key: &str) -> Option<(&str, &[PathBuf])> {
        self.entries
            .get_key_value(key)
            .map(|(key, paths)| (key.as_str(), paths.as_slice()))
    }

    /// Keys with their candidates, in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.entries
            .iter()
            .map(|(key, paths)| (key.as_str(), paths.as_slice()))
    }

    /// Every indexed path, flattened in key order
    pub fn pool(&self) -> Vec<&Path> {
        self.entries
            .values()
            .flat_map(|paths| paths.iter().map(PathBuf::as_path))
            .collect()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of indexed files
    pub fn file_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

fn has_extension(path: &Path, extensions: &[impl AsRef<str>]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|allowed| allowed.as_ref().trim_start_matches('.').eq_ignore_ascii_case(ext))
}

fn file_name_len(path: &Path) -> usize {
    path.file_name()
        .map(|n| n.to_string_lossy().chars().count())
        .unwrap_or(0)
}
