//! Upstream change sources.
//!
//! The watcher does not care where change notifications come from. The
//! production source is the file system (via `notify`); hosts that already
//! have their own change stream (an editor, a test harness) subscribe a
//! [`NullChangeSource`] and feed events through
//! [`InspectionsWatcher::notify_change`](crate::watcher::InspectionsWatcher::notify_change).

use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, warn};

use crate::config::WatcherConfig;
use crate::error::{Result, WatcherError};
use crate::event::{ArtifactHandle, ChangeEvent};

/// Callback handed to a source at subscription time.
///
/// Called on the source's own delivery thread; must not block.
pub type EventSink = Box<dyn Fn(ChangeEvent) + Send + Sync>;

/// A stream of change notifications the watcher can subscribe to.
pub trait ChangeSource: Send {
    /// Start delivering events into `sink`.
    fn subscribe(&mut self, sink: EventSink) -> Result<()>;

    /// Stop delivering events. Safe to call when not subscribed.
    fn unsubscribe(&mut self);
}

/// File-system change source backed by `notify`.
pub struct FsChangeSource {
    /// Roots watched recursively.
    roots: Vec<PathBuf>,

    /// Source-level exclusion patterns.
    config: WatcherConfig,

    /// Internal notify watcher, present while subscribed.
    watcher: Option<RecommendedWatcher>,
}

impl FsChangeSource {
    /// Create a source over the given roots.
    pub fn new(roots: Vec<PathBuf>, config: WatcherConfig) -> Self {
        Self {
            roots,
            config,
            watcher: None,
        }
    }
}

impl ChangeSource for FsChangeSource {
    fn subscribe(&mut self, sink: EventSink) -> Result<()> {
        if self.watcher.is_some() {
            return Ok(()); // Already subscribed
        }

        for root in &self.roots {
            if !root.exists() {
                return Err(WatcherError::RootNotFound(root.display().to_string()));
            }
        }

        let config = self.config.clone();

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| {
                match res {
                    Ok(event) => {
                        // Pure reads never invalidate inspection results.
                        if matches!(event.kind, notify::EventKind::Access(_)) {
                            return;
                        }

                        for path in event.paths {
                            if config.should_exclude(&path) {
                                continue;
                            }

                            sink(ChangeEvent::new(ArtifactHandle::from_path(path)));
                        }
                    }
                    Err(e) => {
                        error!("watch error: {e}");
                    }
                }
            },
        )?;

        for root in &self.roots {
            match watcher.watch(root, RecursiveMode::Recursive) {
                Ok(_) => debug!("watching: {}", root.display()),
                Err(e) => warn!("failed to watch {}: {e}", root.display()),
            }
        }

        self.watcher = Some(watcher);
        Ok(())
    }

    fn unsubscribe(&mut self) {
        if let Some(ref mut watcher) = self.watcher {
            for root in &self.roots {
                let _ = watcher.unwatch(root);
            }
        }

        self.watcher = None;
    }
}

/// A source that never produces events on its own.
///
/// Used when the host delivers change notifications directly through the
/// watcher's intake instead of through a subscription.
#[derive(Debug, Default)]
pub struct NullChangeSource;

impl NullChangeSource {
    /// Create a new null source.
    pub fn new() -> Self {
        Self
    }
}

impl ChangeSource for NullChangeSource {
    fn subscribe(&mut self, _sink: EventSink) -> Result<()> {
        Ok(())
    }

    fn unsubscribe(&mut self) {}
}
