//! Expansion of a delivered batch into an analysis scope.
//!
//! A changed file implicates its whole directory (sibling files share
//! package-level state), so the batch is first widened to a set of
//! directories and then narrowed to the direct child files of each.

use std::collections::HashSet;
use std::path::PathBuf;

use autoinspect_watcher::ArtifactHandle;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// The set of files one inspection run covers.
#[derive(Debug, Clone, Default)]
pub struct AnalysisScope {
    /// Files to inspect.
    pub files: HashSet<PathBuf>,

    /// Whether library sources are inspected too. Always off for
    /// change-triggered runs.
    pub search_in_libraries: bool,
}

impl AnalysisScope {
    /// Check if the scope covers nothing.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of files in the scope.
    pub fn len(&self) -> usize {
        self.files.len()
    }
}

/// Expand a delivered batch into an analysis scope.
///
/// Artifacts that no longer exist on disk are dropped silently; the
/// upstream source is mutable after delivery, so every handle is
/// re-validated here. Directory artifacts contribute their own direct
/// children; file artifacts contribute the direct children of their parent
/// directory. Expansion is non-recursive.
pub fn expand_batch(batch: &HashSet<ArtifactHandle>) -> AnalysisScope {
    let mut directories: HashSet<PathBuf> = HashSet::new();

    for artifact in batch {
        let path = artifact.path();

        if !path.exists() {
            trace!("dropping stale artifact: {}", path.display());
            continue;
        }

        if path.is_dir() {
            directories.insert(path.to_path_buf());
        } else if let Some(parent) = path.parent() {
            directories.insert(parent.to_path_buf());
        }
    }

    let mut files: HashSet<PathBuf> = HashSet::new();

    for dir in &directories {
        let walker = WalkDir::new(dir).min_depth(1).max_depth(1);

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() {
                files.insert(entry.path().to_path_buf());
            }
        }
    }

    debug!(
        "expanded {} artifact(s) into {} file(s) across {} directory(ies)",
        batch.len(),
        files.len(),
        directories.len()
    );

    AnalysisScope {
        files,
        search_in_libraries: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_file_expands_to_its_siblings() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let a = temp_dir.path().join("a.go");
        let b = temp_dir.path().join("b.go");
        fs::write(&a, "package p\n").unwrap();
        fs::write(&b, "package p\n").unwrap();

        let mut batch = HashSet::new();
        batch.insert(ArtifactHandle::file(&a));

        let scope = expand_batch(&batch);
        assert_eq!(scope.len(), 2);
        assert!(scope.files.contains(&a));
        assert!(scope.files.contains(&b));
        assert!(!scope.search_in_libraries);
    }

    #[test]
    fn test_directory_expands_to_direct_children_only() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let top = temp_dir.path().join("top.go");
        let sub = temp_dir.path().join("sub");
        fs::write(&top, "package p\n").unwrap();
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("nested.go"), "package sub\n").unwrap();

        let mut batch = HashSet::new();
        batch.insert(ArtifactHandle::directory(temp_dir.path()));

        let scope = expand_batch(&batch);
        assert_eq!(scope.len(), 1);
        assert!(scope.files.contains(&top));
    }

    #[test]
    fn test_missing_artifacts_are_dropped() {
        let temp_dir = tempfile::TempDir::new().unwrap();

        let mut batch = HashSet::new();
        batch.insert(ArtifactHandle::file(temp_dir.path().join("deleted.go")));

        // The parent directory exists but the artifact does not; the
        // artifact contributes nothing.
        let scope = expand_batch(&batch);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_two_files_in_one_directory_coalesce() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let a = temp_dir.path().join("a.go");
        let b = temp_dir.path().join("b.go");
        fs::write(&a, "package p\n").unwrap();
        fs::write(&b, "package p\n").unwrap();

        let mut batch = HashSet::new();
        batch.insert(ArtifactHandle::file(&a));
        batch.insert(ArtifactHandle::file(&b));

        let scope = expand_batch(&batch);
        assert_eq!(scope.len(), 2);
    }
}
