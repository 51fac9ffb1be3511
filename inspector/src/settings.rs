//! Persisted per-workspace settings.
//!
//! Stored as JSON under `.autoinspect/workspace.json` inside the workspace
//! root. A missing file means defaults; unknown fields are ignored so older
//! versions can read newer files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::profile::DEFAULT_PROFILE;

/// Directory under the workspace root holding inspector state.
pub const SETTINGS_DIR: &str = ".autoinspect";

/// File name of the persisted settings.
pub const SETTINGS_FILE: &str = "workspace.json";

/// Per-workspace settings for the auto-inspections session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSettings {
    /// Debounce delay override in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Name of the inspection profile to run.
    #[serde(default = "default_profile")]
    pub profile: String,
}

impl WorkspaceSettings {
    /// Load settings from a workspace root, falling back to defaults when
    /// no settings file exists yet.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path(root);

        if !path.exists() {
            debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Persist settings under a workspace root.
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = Self::path(root);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        debug!("saved settings to {}", path.display());
        Ok(())
    }

    /// Location of the settings file for a workspace root.
    pub fn path(root: &Path) -> PathBuf {
        root.join(SETTINGS_DIR).join(SETTINGS_FILE)
    }
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            profile: default_profile(),
        }
    }
}

fn default_delay_ms() -> u64 {
    autoinspect_watcher::DEFAULT_DELAY_MS
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}
