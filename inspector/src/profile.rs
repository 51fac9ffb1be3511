//! Inspection profiles and profile lookup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InspectorError, Result};

/// Name of the profile every registry starts with.
pub const DEFAULT_PROFILE: &str = "Project Default";

/// A named set of inspections to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionProfile {
    /// Profile name, unique within a registry.
    pub name: String,

    /// Identifiers of the inspections this profile enables. Empty means
    /// "everything the engine offers".
    pub enabled_inspections: Vec<String>,
}

impl InspectionProfile {
    /// Create a profile that enables everything.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled_inspections: Vec::new(),
        }
    }

    /// Enable a specific inspection.
    pub fn with_inspection(mut self, id: impl Into<String>) -> Self {
        self.enabled_inspections.push(id.into());
        self
    }
}

/// Registry of inspection profiles with a default fallback.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<String, InspectionProfile>,
}

impl ProfileRegistry {
    /// Create a registry containing only the default profile.
    pub fn new() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            DEFAULT_PROFILE.to_string(),
            InspectionProfile::new(DEFAULT_PROFILE),
        );

        Self { profiles }
    }

    /// Register a profile, replacing any previous one with the same name.
    pub fn register(&mut self, profile: InspectionProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Look up a profile by name.
    pub fn get(&self, name: &str) -> Result<&InspectionProfile> {
        self.profiles
            .get(name)
            .ok_or_else(|| InspectorError::ProfileNotFound(name.to_string()))
    }

    /// Look up a profile by name, falling back to the default.
    pub fn get_or_default(&self, name: &str) -> &InspectionProfile {
        if let Some(profile) = self.profiles.get(name) {
            return profile;
        }

        debug!("profile {name:?} not found, using {DEFAULT_PROFILE:?}");
        // The default is inserted at construction and never removed.
        self.profiles
            .get(DEFAULT_PROFILE)
            .unwrap_or_else(|| unreachable!("default profile always registered"))
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registry_starts_with_default() {
        let registry = ProfileRegistry::new();
        assert_eq!(registry.get(DEFAULT_PROFILE).unwrap().name, DEFAULT_PROFILE);
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ProfileRegistry::new();
        registry.register(InspectionProfile::new("Go Only").with_inspection("go-vet"));

        let profile = registry.get("Go Only").unwrap();
        assert_eq!(profile.enabled_inspections, vec!["go-vet".to_string()]);
    }

    #[test]
    fn test_unknown_profile_errors() {
        let registry = ProfileRegistry::new();
        assert!(matches!(
            registry.get("Nope"),
            Err(InspectorError::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_fallback_to_default() {
        let registry = ProfileRegistry::new();
        assert_eq!(registry.get_or_default("Nope").name, DEFAULT_PROFILE);
    }
}
