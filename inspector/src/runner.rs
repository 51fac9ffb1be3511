//! Listener dispatch: from a delivered batch to an inspection run.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use autoinspect_watcher::{ArtifactHandle, Token, WatcherHandle};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::profile::{InspectionProfile, ProfileRegistry};
use crate::scope::{self, AnalysisScope};

/// The inspection engine, out of scope here and modeled as a collaborator.
pub trait InspectionContext: Send + Sync {
    /// Run the profile's inspections over the scope.
    fn run_inspections(&self, profile: &InspectionProfile, scope: &AnalysisScope) -> Result<()>;
}

/// Consumes watcher deliveries and schedules inspection runs.
///
/// Delivery is two-phase: the batch arrives on the watcher's timer task and
/// is immediately handed off to a fresh task, which re-validates the token
/// before doing any expensive work. Batches superseded by newer edits while
/// the handoff was in flight are abandoned silently.
pub struct InspectionRunner {
    /// Staleness check, attached after the watcher is constructed.
    watcher: OnceLock<WatcherHandle>,

    /// Known inspection profiles.
    registry: ProfileRegistry,

    /// Profile to run, resolved with default fallback.
    profile_name: String,

    /// The inspection engine.
    context: Arc<dyn InspectionContext>,
}

impl InspectionRunner {
    /// Create a runner for the given profile and engine.
    pub fn new(
        registry: ProfileRegistry,
        profile_name: impl Into<String>,
        context: Arc<dyn InspectionContext>,
    ) -> Self {
        Self {
            watcher: OnceLock::new(),
            registry,
            profile_name: profile_name.into(),
            context,
        }
    }

    /// Attach the staleness check. Called once, right after the watcher
    /// owning this runner's dispatch callback is built.
    pub fn attach(&self, handle: WatcherHandle) {
        if self.watcher.set(handle).is_err() {
            warn!("watcher handle already attached");
        }
    }

    /// The watcher-facing listener entry point.
    ///
    /// Returns immediately; the actual work happens on a spawned task.
    pub fn dispatch(self: Arc<Self>, token: Token, batch: HashSet<ArtifactHandle>) {
        tokio::spawn(async move {
            self.run(token, batch).await;
        });
    }

    async fn run(&self, token: Token, batch: HashSet<ArtifactHandle>) {
        let Some(watcher) = self.watcher.get() else {
            debug!("dropping batch delivered before the watcher was attached");
            return;
        };

        // Newer edits may have arrived while this task sat in the queue.
        if !watcher.is_up_to_date(token).await {
            debug!("abandoning stale batch, token {token}");
            return;
        }

        let scope = scope::expand_batch(&batch);
        if scope.is_empty() {
            debug!("batch expanded to an empty scope, token {token}");
            return;
        }

        let profile = self.registry.get_or_default(&self.profile_name);
        info!(
            "running inspections: profile {:?}, {} file(s), token {token}",
            profile.name,
            scope.len()
        );

        if let Err(e) = self.context.run_inspections(profile, &scope) {
            error!("inspection run failed: {e}");
        }
    }
}
