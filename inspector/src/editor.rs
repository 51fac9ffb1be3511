//! Editor visibility state backing the watcher's filter predicate.
//!
//! Inspections only re-run for artifacts the user can actually see: files
//! that are open in an editor tab, minus anything living under the scratch
//! root. The host updates this state from its own focus/tab events.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use autoinspect_watcher::ArtifactHandle;
use tracing::trace;

/// Shared view of which artifacts are visible to the user.
#[derive(Debug, Default)]
pub struct EditorState {
    /// Files currently open in an editor.
    open_files: RwLock<HashSet<PathBuf>>,

    /// Root under which scratch/virtual files live, if any.
    scratch_root: Option<PathBuf>,
}

impl EditorState {
    /// Create editor state with no open files and no scratch root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create editor state with a scratch root.
    pub fn with_scratch_root(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            open_files: RwLock::new(HashSet::new()),
            scratch_root: Some(scratch_root.into()),
        }
    }

    /// Mark a file as open in an editor.
    pub fn open_file(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        trace!("file opened: {}", path.display());
        if let Ok(mut open) = self.open_files.write() {
            open.insert(path);
        }
    }

    /// Mark a file as no longer open.
    pub fn close_file(&self, path: &Path) {
        trace!("file closed: {}", path.display());
        if let Ok(mut open) = self.open_files.write() {
            open.remove(path);
        }
    }

    /// Check whether a file is open. A poisoned lock degrades to "closed".
    pub fn is_open(&self, path: &Path) -> bool {
        self.open_files
            .read()
            .map(|open| open.contains(path))
            .unwrap_or(false)
    }

    /// Check whether a path is a scratch/virtual artifact.
    pub fn is_scratch(&self, path: &Path) -> bool {
        self.scratch_root
            .as_deref()
            .is_some_and(|root| path.starts_with(root))
    }

    /// The filter predicate applied on the watcher's intake path.
    ///
    /// Scratch artifacts are never tracked. Container artifacts pass (the
    /// consumer expands them later); file artifacts must be open.
    pub fn should_track(&self, artifact: &ArtifactHandle) -> bool {
        if self.is_scratch(artifact.path()) {
            return false;
        }

        artifact.is_directory() || self.is_open(artifact.path())
    }
}
