//! Run profiles
//!
//! Named presets of invocation options, e.g. `smoke` for `@smoke` tags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named preset applied on top of the configuration file.
///
/// Unset fields leave the underlying value alone. An empty `tags` string
/// clears any tag filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProfile {
    /// Profile name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Tag filter expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Runner output format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Dry-run mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    /// Worker count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<usize>,
}

impl RunProfile {
    /// Create an empty profile
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tags: None,
            format: None,
            dry_run: None,
            max_workers: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Only scenarios tagged `@smoke`
    pub fn smoke() -> Self {
        Self::new("smoke")
            .with_description("Quick smoke scenarios only")
            .with_tags("@smoke")
    }

    /// Every scenario, no tag filter
    pub fn all() -> Self {
        Self::new("all")
            .with_description("Run every scenario without a tag filter")
            .with_tags("")
    }

    /// Check step definitions without executing them
    pub fn dry_run() -> Self {
        let mut profile =
            Self::new("dry-run").with_description("Resolve steps without executing them");
        profile.dry_run = Some(true);
        profile
    }

    /// Compact output for CI logs
    pub fn ci() -> Self {
        Self::new("ci")
            .with_description("Compact progress output for CI logs")
            .with_format("progress")
    }

    /// Get all predefined profiles
    pub fn predefined() -> Vec<RunProfile> {
        vec![Self::smoke(), Self::all(), Self::dry_run(), Self::ci()]
    }

    /// Short description of what the profile changes
    pub fn overrides(&self) -> String {
        let mut parts = Vec::new();
        match self.tags.as_deref() {
            Some("") => parts.push("tags=<none>".to_string()),
            Some(tags) => parts.push(format!("tags={tags}")),
            None => {}
        }
        if let Some(format) = &self.format {
            parts.push(format!("format={format}"));
        }
        if let Some(dry_run) = self.dry_run {
            parts.push(format!("dry_run={dry_run}"));
        }
        if let Some(workers) = self.max_workers {
            parts.push(format!("max_workers={workers}"));
        }
        parts.join(", ")
    }
}

/// Registry of predefined and file-defined profiles
pub struct ProfileManager {
    profiles: BTreeMap<String, RunProfile>,
}

impl ProfileManager {
    /// Create a new profile manager with the predefined profiles
    pub fn new() -> Self {
        let mut manager = Self {
            profiles: BTreeMap::new(),
        };
        for profile in RunProfile::predefined() {
            manager.add(profile);
        }
        manager
    }

    /// Predefined profiles overlaid with `custom` (same names replace)
    pub fn with_custom(custom: &[RunProfile]) -> Self {
        let mut manager = Self::new();
        for profile in custom {
            manager.add(profile.clone());
        }
        manager
    }

    pub fn add(&mut self, profile: RunProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    pub fn get(&self, name: &str) -> Option<&RunProfile> {
        self.profiles.get(name)
    }

    /// Profiles sorted by name
    pub fn list(&self) -> Vec<&RunProfile> {
        self.profiles.values().collect()
    }
}

impl Default for ProfileManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoke_profile() {
        let profile = RunProfile::smoke();
        assert_eq!(profile.name, "smoke");
        assert_eq!(profile.tags.as_deref(), Some("@smoke"));
        assert_eq!(profile.dry_run, None);
    }

    #[test]
    fn test_all_profile_clears_tags() {
        assert_eq!(RunProfile::all().tags.as_deref(), Some(""));
        assert_eq!(RunProfile::all().overrides(), "tags=<none>");
    }

    #[test]
    fn test_profile_manager() {
        let manager = ProfileManager::new();
        assert!(manager.get("smoke").is_some());
        assert!(manager.get("dry-run").is_some());
        assert!(manager.get("nightly").is_none());

        let names: Vec<_> = manager.list().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["all", "ci", "dry-run", "smoke"]);
    }

    #[test]
    fn test_custom_profiles_replace_predefined() {
        let custom = vec![
            RunProfile::new("smoke").with_tags("@smoke and not @slow"),
            RunProfile::new("nightly").with_tags("@nightly"),
        ];
        let manager = ProfileManager::with_custom(&custom);

        assert_eq!(
            manager.get("smoke").and_then(|p| p.tags.as_deref()),
            Some("@smoke and not @slow")
        );
        assert!(manager.get("nightly").is_some());
        assert_eq!(manager.list().len(), 5);
    }

    #[test]
    fn test_profile_yaml_omits_unset_fields() {
        let yaml = serde_yaml::to_string(&RunProfile::ci()).unwrap();
        assert!(yaml.contains("format: progress"));
        assert!(!yaml.contains("dry_run"));

        let parsed: RunProfile = serde_yaml::from_str("name: quick\ntags: '@quick'\n").unwrap();
        assert_eq!(parsed.tags.as_deref(), Some("@quick"));
        assert!(parsed.description.is_empty());
    }
}
