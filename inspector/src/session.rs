//! Host lifecycle shim.
//!
//! The host IDE's init/teardown hooks reduce to [`InspectionSession::start`]
//! and [`InspectionSession::shutdown`]. Starting a session loads the
//! persisted workspace settings, wires the editor-visibility filter and the
//! inspection runner to a fresh watcher, and activates it.

use std::path::Path;
use std::sync::Arc;

use autoinspect_watcher::{
    ChangeEvent, ChangeSource, FsChangeSource, InspectionsWatcher, Token, WatcherConfig,
};
use tracing::info;

use crate::editor::EditorState;
use crate::error::Result;
use crate::profile::ProfileRegistry;
use crate::runner::{InspectionContext, InspectionRunner};
use crate::settings::{SETTINGS_DIR, WorkspaceSettings};

/// A running auto-inspections session for one workspace.
pub struct InspectionSession {
    watcher: InspectionsWatcher,
    editor: Arc<EditorState>,
    settings: WorkspaceSettings,
}

impl InspectionSession {
    /// Start a session watching the workspace root on the file system.
    pub async fn start(
        root: &Path,
        registry: ProfileRegistry,
        context: Arc<dyn InspectionContext>,
    ) -> Result<Self> {
        let settings = WorkspaceSettings::load(root)?;
        let source = FsChangeSource::new(
            vec![root.to_path_buf()],
            WatcherConfig::new().with_delay_ms(settings.delay_ms),
        );

        Self::start_with_source(root, source, registry, context).await
    }

    /// Start a session with an injected change source. Hosts that have
    /// their own change stream subscribe a null source and feed events
    /// through [`InspectionSession::notify_change`].
    pub async fn start_with_source(
        root: &Path,
        source: impl ChangeSource + 'static,
        registry: ProfileRegistry,
        context: Arc<dyn InspectionContext>,
    ) -> Result<Self> {
        let settings = WorkspaceSettings::load(root)?;
        let editor = Arc::new(EditorState::with_scratch_root(
            root.join(SETTINGS_DIR).join("scratches"),
        ));

        let runner = Arc::new(InspectionRunner::new(
            registry,
            settings.profile.clone(),
            context,
        ));

        let filter_editor = Arc::clone(&editor);
        let listener_runner = Arc::clone(&runner);

        let mut watcher = InspectionsWatcher::new(
            &WatcherConfig::new().with_delay_ms(settings.delay_ms),
            source,
            move |artifact| filter_editor.should_track(artifact),
            move |token, batch| Arc::clone(&listener_runner).dispatch(token, batch),
        );

        runner.attach(watcher.handle());
        watcher.activate().await?;

        info!(
            "auto-inspections session started for {} (delay {}ms, profile {:?})",
            root.display(),
            settings.delay_ms,
            settings.profile
        );

        Ok(Self {
            watcher,
            editor,
            settings,
        })
    }

    /// Editor visibility state backing the filter predicate.
    pub fn editor(&self) -> &Arc<EditorState> {
        &self.editor
    }

    /// The settings this session was started with.
    pub fn settings(&self) -> &WorkspaceSettings {
        &self.settings
    }

    /// Feed one change notification into the session's watcher.
    pub async fn notify_change(&self, event: ChangeEvent) {
        self.watcher.notify_change(event).await;
    }

    /// Check whether `token` still identifies the freshest batch.
    pub async fn is_up_to_date(&self, token: Token) -> bool {
        self.watcher.is_up_to_date(token).await
    }

    /// Stop the session: deactivate the watcher and discard anything
    /// pending. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        self.watcher.deactivate().await;
        info!("auto-inspections session stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::InspectionProfile;
    use crate::scope::AnalysisScope;
    use autoinspect_watcher::{ArtifactHandle, NullChangeSource};
    use std::fs;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    struct CountingContext {
        runs: Arc<StdMutex<usize>>,
    }

    impl InspectionContext for CountingContext {
        fn run_inspections(&self, _: &InspectionProfile, _: &AnalysisScope) -> Result<()> {
            *self.runs.lock().unwrap() += 1;
            Ok(())
        }
    }

    async fn started_session(root: &Path) -> (InspectionSession, Arc<StdMutex<usize>>) {
        let runs = Arc::new(StdMutex::new(0));
        let context = Arc::new(CountingContext {
            runs: Arc::clone(&runs),
        });

        let session = InspectionSession::start_with_source(
            root,
            NullChangeSource::new(),
            ProfileRegistry::new(),
            context,
        )
        .await
        .unwrap();

        (session, runs)
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_file_edit_runs_inspections() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file = temp_dir.path().join("a.go");
        fs::write(&file, "package p\n").unwrap();

        let (session, runs) = started_session(temp_dir.path()).await;
        session.editor().open_file(&file);

        session
            .notify_change(ChangeEvent::new(ArtifactHandle::file(&file)))
            .await;
        tokio::time::sleep(Duration::from_millis(1100)).await;
        settle().await;

        assert_eq!(*runs.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_file_edit_is_ignored() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file = temp_dir.path().join("a.go");
        fs::write(&file, "package p\n").unwrap();

        let (session, runs) = started_session(temp_dir.path()).await;

        session
            .notify_change(ChangeEvent::new(ArtifactHandle::file(&file)))
            .await;
        tokio::time::sleep(Duration::from_millis(1100)).await;
        settle().await;

        assert_eq!(*runs.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_suppresses_pending_runs() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file = temp_dir.path().join("a.go");
        fs::write(&file, "package p\n").unwrap();

        let (mut session, runs) = started_session(temp_dir.path()).await;
        session.editor().open_file(&file);

        session
            .notify_change(ChangeEvent::new(ArtifactHandle::file(&file)))
            .await;
        session.shutdown().await;

        tokio::time::sleep(Duration::from_millis(1500)).await;
        settle().await;

        assert_eq!(*runs.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persisted_delay_is_honored() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file = temp_dir.path().join("a.go");
        fs::write(&file, "package p\n").unwrap();

        WorkspaceSettings {
            delay_ms: 100,
            profile: crate::profile::DEFAULT_PROFILE.to_string(),
        }
        .save(temp_dir.path())
        .unwrap();

        let (session, runs) = started_session(temp_dir.path()).await;
        assert_eq!(session.settings().delay_ms, 100);
        session.editor().open_file(&file);

        session
            .notify_change(ChangeEvent::new(ArtifactHandle::file(&file)))
            .await;
        // Well before the stock 1000ms default, past the 100ms override.
        tokio::time::sleep(Duration::from_millis(150)).await;
        settle().await;

        assert_eq!(*runs.lock().unwrap(), 1);
    }
}
