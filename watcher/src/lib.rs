//! # Inspections Watcher
//!
//! Debounced change watching for automatic code inspection runs. The
//! watcher observes a stream of change notifications, coalesces bursts of
//! edits into one batch, waits for a quiescence gap, and delivers a single
//! "run now" signal carrying the changed artifacts and a monotonically
//! increasing token identifying the burst.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      Inspections Watcher                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ChangeSource ──► ChangeFilter ──► PendingBatch ──► Listener     │
//! │       │                 │               │               │        │
//! │       ▼                 ▼               ▼               ▼        │
//! │  notify/host     accept/reject    debounce timer  (token, batch) │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Consumers re-validate the token via [`WatcherHandle::is_up_to_date`]
//! before acting, so work for superseded batches is abandoned cheaply.

pub mod config;
pub mod error;
pub mod event;
pub mod source;
pub mod watcher;

pub use config::{DEFAULT_DELAY_MS, WatcherConfig};
pub use error::{Result, WatcherError};
pub use event::{ArtifactHandle, ArtifactKind, ChangeEvent};
pub use source::{ChangeSource, EventSink, FsChangeSource, NullChangeSource};
pub use watcher::{InspectionsWatcher, Token, WatcherHandle};
