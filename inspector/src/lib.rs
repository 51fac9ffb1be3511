//! # Auto-inspections inspector
//!
//! Consumer side of the debounced change watcher: turns delivered batches
//! of changed artifacts into inspection runs. The watcher hands over
//! `(token, batch)`; this crate defers the work onto its own task,
//! re-validates the token, expands the batch into an analysis scope and
//! invokes the inspection engine with the configured profile.
//!
//! The engine itself is out of scope and modeled as the
//! [`InspectionContext`] trait; the host IDE's lifecycle hooks reduce to
//! [`InspectionSession::start`] and [`InspectionSession::shutdown`].

pub mod editor;
pub mod error;
pub mod profile;
pub mod runner;
pub mod scope;
pub mod session;
pub mod settings;

pub use editor::EditorState;
pub use error::{InspectorError, Result};
pub use profile::{DEFAULT_PROFILE, InspectionProfile, ProfileRegistry};
pub use runner::{InspectionContext, InspectionRunner};
pub use scope::{AnalysisScope, expand_batch};
pub use session::InspectionSession;
pub use settings::WorkspaceSettings;
