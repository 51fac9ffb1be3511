//! The debounced inspections watcher.

use std::collections::HashSet;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::config::WatcherConfig;
use crate::error::Result;
use crate::event::{ArtifactHandle, ChangeEvent};
use crate::source::{ChangeSource, EventSink};

/// Identifier minted once per delivered batch.
///
/// Strictly increasing for the lifetime of the watcher, including across
/// deactivate/activate cycles.
pub type Token = u64;

/// Decides whether a changed artifact should be tracked at all.
///
/// Called synchronously on the intake path, outside the watcher's internal
/// lock. Expected to be a pure function of the handle.
pub type ChangeFilter = dyn Fn(&ArtifactHandle) -> bool + Send + Sync;

/// Receives `(token, batch)` once a quiescence gap has passed.
///
/// Called outside the watcher's internal lock, so it may call back into the
/// watcher. A listener that defers onto another execution context must
/// re-check [`WatcherHandle::is_up_to_date`] before doing expensive work.
pub type ChangeListener = dyn Fn(Token, HashSet<ArtifactHandle>) + Send + Sync;

/// Converts a noisy, high-frequency change stream into one coalesced
/// notification per burst of activity.
///
/// Events accepted by the filter accumulate in a pending batch (dedup by
/// artifact identity) and each acceptance re-arms a single delay timer for
/// the full configured delay. True debounce: a continuous stream of edits
/// defers delivery indefinitely until a quiet gap occurs. When the timer
/// fires, a fresh token is minted, the batch is captured and cleared, and
/// the listener is invoked with `(token, batch)`.
///
/// Lifecycle entry points must be called from within a Tokio runtime; event
/// intake may come from any thread.
pub struct InspectionsWatcher {
    /// Shared core, also held by timer tasks and [`WatcherHandle`]s.
    core: Arc<WatcherCore>,

    /// Upstream change source, subscribed while active.
    source: Box<dyn ChangeSource>,
}

impl InspectionsWatcher {
    /// Create a new watcher. Starts inactive.
    pub fn new(
        config: &WatcherConfig,
        source: impl ChangeSource + 'static,
        filter: impl Fn(&ArtifactHandle) -> bool + Send + Sync + 'static,
        listener: impl Fn(Token, HashSet<ArtifactHandle>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            core: Arc::new_cyclic(|weak| WatcherCore {
                delay: config.delay(),
                filter: Box::new(filter),
                listener: Box::new(listener),
                state: Mutex::new(WatcherState::default()),
                weak: weak.clone(),
            }),
            source: Box::new(source),
        }
    }

    /// Begin observation: subscribe to the upstream source and start
    /// accepting events.
    ///
    /// Idempotent: calling this while already active is a no-op and never
    /// duplicates the upstream subscription.
    pub async fn activate(&mut self) -> Result<()> {
        if self.core.mark_active().await {
            return Ok(()); // Already active
        }

        let core = Arc::clone(&self.core);
        let sink: EventSink = Box::new(move |event| core.accept_blocking(event));

        if let Err(e) = self.source.subscribe(sink) {
            self.core.mark_inactive().await;
            return Err(e);
        }

        info!("inspections watcher activated");
        Ok(())
    }

    /// Stop observation: unsubscribe from the upstream source, cancel any
    /// armed timer and discard the pending batch without delivery.
    ///
    /// Safe to call when never activated. A timer racing this call delivers
    /// nothing; cancellation wins. No token is minted for a discarded batch.
    pub async fn deactivate(&mut self) {
        if !self.core.mark_inactive().await {
            return; // Never activated
        }

        self.source.unsubscribe();
        info!("inspections watcher deactivated");
    }

    /// Check whether `token` still identifies the freshest delivered batch.
    ///
    /// Returns false once a newer token has been minted or a newer batch has
    /// started accumulating for delivery. Deferred consumers call this right
    /// before acting so superseded work can be abandoned cheaply.
    pub async fn is_up_to_date(&self, token: Token) -> bool {
        self.core.is_up_to_date(token).await
    }

    /// Feed one change notification directly into the intake path.
    ///
    /// Hosts with their own change stream (subscribed via
    /// [`NullChangeSource`](crate::source::NullChangeSource)) call this
    /// instead of going through a [`ChangeSource`]. Dropped silently while
    /// inactive.
    pub async fn notify_change(&self, event: ChangeEvent) {
        self.core.accept(event).await;
    }

    /// A cheap, cloneable handle exposing the staleness check to consumers
    /// that do not own the watcher.
    pub fn handle(&self) -> WatcherHandle {
        WatcherHandle {
            core: Arc::clone(&self.core),
        }
    }
}

impl Drop for InspectionsWatcher {
    fn drop(&mut self) {
        self.source.unsubscribe();

        // Best effort: a timer still armed at drop time must not deliver.
        if let Ok(mut state) = self.core.state.try_lock() {
            state.active = false;
            state.epoch += 1;
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
        }
    }
}

/// Cloneable view of a watcher used for staleness checks.
#[derive(Clone)]
pub struct WatcherHandle {
    core: Arc<WatcherCore>,
}

impl WatcherHandle {
    /// See [`InspectionsWatcher::is_up_to_date`].
    pub async fn is_up_to_date(&self, token: Token) -> bool {
        self.core.is_up_to_date(token).await
    }
}

/// Shared guts of the watcher.
struct WatcherCore {
    /// Quiescence gap required before delivery.
    delay: Duration,

    /// Intake filter, called outside the state lock.
    filter: Box<ChangeFilter>,

    /// Delivery callback, called outside the state lock.
    listener: Box<ChangeListener>,

    /// The single mutual-exclusion domain: pending batch, timer handle,
    /// epoch and token counter all live here.
    state: Mutex<WatcherState>,

    /// Back-reference for handing timer tasks an owned clone of the core.
    weak: Weak<WatcherCore>,
}

#[derive(Default)]
struct WatcherState {
    /// Whether events are currently accepted.
    active: bool,

    /// Artifacts accumulated since the last delivery.
    pending: HashSet<ArtifactHandle>,

    /// The armed debounce timer, if any.
    timer: Option<JoinHandle<()>>,

    /// Bumped on every re-arm and on deactivation. A timer task that wakes
    /// up with a stale epoch lost the race and delivers nothing.
    epoch: u64,

    /// Most recently minted token.
    token: Token,

    /// Runtime used to spawn timer tasks, captured at activation.
    runtime: Option<tokio::runtime::Handle>,
}

impl WatcherCore {
    /// Intake from the source's own delivery thread.
    fn accept_blocking(&self, event: ChangeEvent) {
        if !(self.filter)(&event.artifact) {
            trace!("filter rejected {}", event.artifact.path().display());
            return;
        }

        let state = self.state.blocking_lock();
        self.accept_locked(state, event);
    }

    /// Intake from within the runtime.
    async fn accept(&self, event: ChangeEvent) {
        if !(self.filter)(&event.artifact) {
            trace!("filter rejected {}", event.artifact.path().display());
            return;
        }

        let state = self.state.lock().await;
        self.accept_locked(state, event);
    }

    /// Insert into the pending batch and re-arm the debounce timer.
    fn accept_locked(&self, mut state: MutexGuard<'_, WatcherState>, event: ChangeEvent) {
        if !state.active {
            trace!("dropping event while inactive");
            return;
        }

        let Some(runtime) = state.runtime.clone() else {
            return;
        };

        // Upgrading cannot fail here: callers reach this method through the
        // owning Arc.
        let Some(core) = self.weak.upgrade() else {
            return;
        };

        state.pending.insert(event.artifact);

        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        state.epoch += 1;
        let epoch = state.epoch;

        state.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(core.delay).await;
            core.fire(epoch).await;
        }));
    }

    /// Timer expiry: capture the batch, mint a token, deliver.
    async fn fire(&self, epoch: u64) {
        let (token, batch) = {
            let mut state = self.state.lock().await;

            // A re-arm or deactivation got here first; that wins.
            if !state.active || state.epoch != epoch {
                return;
            }

            state.token += 1;
            state.timer = None;
            (state.token, std::mem::take(&mut state.pending))
        };

        debug!("delivering {} changed artifact(s), token {token}", batch.len());
        (self.listener)(token, batch);
    }

    async fn is_up_to_date(&self, token: Token) -> bool {
        let state = self.state.lock().await;
        token == state.token && state.pending.is_empty()
    }

    /// Flip to active. Returns whether the watcher was already active.
    async fn mark_active(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.active {
            return true;
        }

        state.active = true;
        state.runtime = Some(tokio::runtime::Handle::current());
        state.pending.clear();
        false
    }

    /// Flip to inactive, cancel the timer, discard the batch. Returns
    /// whether the watcher was active. The token counter is kept.
    async fn mark_inactive(&self) -> bool {
        let mut state = self.state.lock().await;
        if !state.active {
            return false;
        }

        state.active = false;
        state.runtime = None;
        state.epoch += 1;

        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        if !state.pending.is_empty() {
            debug!("discarding {} undelivered artifact(s)", state.pending.len());
            state.pending.clear();
        }

        true
    }
}
