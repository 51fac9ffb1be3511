//! Configuration for the debounced watcher.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default quiescence delay before a batch is delivered, in milliseconds.
pub const DEFAULT_DELAY_MS: u64 = 1000;

/// Configuration for a debounced inspections watcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Debounce delay in milliseconds. Delivery happens only after this
    /// much quiet time has passed since the last accepted event.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Patterns excluded at the source, before events reach the filter
    /// predicate (glob patterns).
    #[serde(default = "default_excludes")]
    pub exclude_patterns: Vec<String>,
}

impl WatcherConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            exclude_patterns: default_excludes(),
        }
    }

    /// Set the debounce delay in milliseconds.
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// The debounce delay as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Check if a path is excluded at the source.
    pub fn should_exclude(&self, path: &std::path::Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.exclude_patterns {
            if let Ok(glob) = glob::Pattern::new(pattern) {
                if glob.matches(&path_str) {
                    return true;
                }
            }
        }

        false
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

/// Paths that never produce useful inspection work.
fn default_excludes() -> Vec<String> {
    vec![
        // Version control
        "**/.git/**".to_string(),
        "**/.svn/**".to_string(),
        "**/.hg/**".to_string(),
        // Dependencies and build output
        "**/node_modules/**".to_string(),
        "**/target/**".to_string(),
        "**/vendor/**".to_string(),
        "**/build/**".to_string(),
        "**/dist/**".to_string(),
        // Editor droppings
        "**/.idea/**".to_string(),
        "**/.vscode/**".to_string(),
        "**/*.swp".to_string(),
        "**/*~".to_string(),
        // System files
        "**/.DS_Store".to_string(),
        "**/Thumbs.db".to_string(),
    ]
}
