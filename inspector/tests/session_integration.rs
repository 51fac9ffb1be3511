//! End-to-end session behavior against the real file system.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use autoinspect_inspector::{
    AnalysisScope, InspectionContext, InspectionProfile, InspectionSession, ProfileRegistry,
    WorkspaceSettings,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

struct ChannelContext {
    tx: mpsc::UnboundedSender<(String, usize)>,
}

impl InspectionContext for ChannelContext {
    fn run_inspections(
        &self,
        profile: &InspectionProfile,
        scope: &AnalysisScope,
    ) -> autoinspect_inspector::Result<()> {
        let _ = self.tx.send((profile.name.clone(), scope.len()));
        Ok(())
    }
}

#[tokio::test]
async fn editing_an_open_file_triggers_an_inspection_run() -> Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let file = temp_dir.path().join("main.go");
    tokio::fs::write(&file, "package main\n").await?;

    WorkspaceSettings {
        delay_ms: 100,
        profile: "Go Only".to_string(),
    }
    .save(temp_dir.path())?;

    let mut registry = ProfileRegistry::new();
    registry.register(InspectionProfile::new("Go Only").with_inspection("go-vet"));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let context = Arc::new(ChannelContext { tx });

    let mut session = InspectionSession::start(temp_dir.path(), registry, context).await?;
    session.editor().open_file(&file);

    tokio::fs::write(&file, "package main // edited\n").await?;

    let Some((profile, scope_len)) = timeout(Duration::from_secs(5), rx.recv()).await? else {
        anyhow::bail!("no inspection run observed");
    };
    assert_eq!(profile, "Go Only");
    assert!(scope_len >= 1);

    session.shutdown().await;

    // Edits after shutdown stay silent.
    tokio::fs::write(&file, "package main // again\n").await?;
    assert!(timeout(Duration::from_millis(400), rx.recv()).await.is_err());

    Ok(())
}
