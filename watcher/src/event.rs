//! Artifact handles and change events.

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of resource an artifact handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Leaf, file-like resource.
    File,

    /// Container, directory-like resource.
    Directory,
}

/// Opaque handle to a watched resource.
///
/// Identity is the path alone: two handles for the same path compare and
/// hash equal even when their recorded kinds differ, so repeated
/// notifications for one resource collapse to a single batch entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHandle {
    /// Path to the resource.
    pub path: PathBuf,

    /// Whether the resource is file-like or container-like.
    pub kind: ArtifactKind,
}

impl ArtifactHandle {
    /// Create a handle to a file-like resource.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ArtifactKind::File,
        }
    }

    /// Create a handle to a container-like resource.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ArtifactKind::Directory,
        }
    }

    /// Create a handle by probing the file system for the kind.
    ///
    /// Paths that no longer exist are recorded as file-like; consumers
    /// re-validate handles before acting on them anyway.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = if path.is_dir() {
            ArtifactKind::Directory
        } else {
            ArtifactKind::File
        };

        Self { path, kind }
    }

    /// Path to the underlying resource.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if this handle refers to a container.
    pub fn is_directory(&self) -> bool {
        self.kind == ArtifactKind::Directory
    }

    /// Check if the resource still exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl PartialEq for ArtifactHandle {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for ArtifactHandle {}

impl Hash for ArtifactHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// A single change notification from the upstream source.
///
/// Ephemeral: events exist only on the intake path and are not retained
/// past batch accumulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The artifact that changed.
    pub artifact: ArtifactHandle,

    /// When the notification arrived.
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create a new change event stamped with the current time.
    pub fn new(artifact: ArtifactHandle) -> Self {
        Self {
            artifact,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_is_path_only() {
        let a = ArtifactHandle::file("/src/main.go");
        let b = ArtifactHandle::directory("/src/main.go");

        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_from_path_detects_directories() {
        let temp_dir = tempfile::TempDir::new().unwrap();

        let dir = ArtifactHandle::from_path(temp_dir.path());
        assert!(dir.is_directory());

        let missing = ArtifactHandle::from_path(temp_dir.path().join("gone.go"));
        assert_eq!(missing.kind, ArtifactKind::File);
        assert!(!missing.exists());
    }

    #[test]
    fn test_change_event_carries_artifact() {
        let event = ChangeEvent::new(ArtifactHandle::file("/test/a.go"));
        assert_eq!(event.artifact.path(), Path::new("/test/a.go"));
    }
}
