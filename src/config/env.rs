//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "FEATURE_DISPATCH";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Runner command from FEATURE_DISPATCH_COMMAND
    pub command: Option<String>,
    /// Worker count from FEATURE_DISPATCH_MAX_WORKERS
    pub max_workers: Option<usize>,
    /// Per-item timeout from FEATURE_DISPATCH_TIMEOUT
    pub timeout: Option<u64>,
    /// Tag filter from FEATURE_DISPATCH_TAGS
    pub tags: Option<String>,
    /// Runner format from FEATURE_DISPATCH_FORMAT
    pub format: Option<String>,
    /// Dry-run from FEATURE_DISPATCH_DRY_RUN
    pub dry_run: Option<bool>,
    /// Profile name from FEATURE_DISPATCH_PROFILE
    pub profile: Option<String>,
    /// Config file from FEATURE_DISPATCH_CONFIG
    pub config_file: Option<String>,
    /// Log level or filter from FEATURE_DISPATCH_LOG
    pub log: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            command: get_env("COMMAND"),
            max_workers: get_env_parse("MAX_WORKERS"),
            timeout: get_env_parse("TIMEOUT"),
            tags: get_env("TAGS"),
            format: get_env("FORMAT"),
            dry_run: get_env_bool("DRY_RUN"),
            profile: get_env("PROFILE"),
            config_file: get_env("CONFIG"),
            log: get_env("LOG"),
        }
    }

    /// Check if any run-affecting variables are set
    pub fn has_any(&self) -> bool {
        self.command.is_some()
            || self.max_workers.is_some()
            || self.timeout.is_some()
            || self.tags.is_some()
            || self.format.is_some()
            || self.dry_run.is_some()
            || self.profile.is_some()
            || self.config_file.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_COMMAND:     {:?}", ENV_PREFIX, self.command);
        println!("  {}_MAX_WORKERS: {:?}", ENV_PREFIX, self.max_workers);
        println!("  {}_TIMEOUT:     {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_TAGS:        {:?}", ENV_PREFIX, self.tags);
        println!("  {}_FORMAT:      {:?}", ENV_PREFIX, self.format);
        println!("  {}_DRY_RUN:     {:?}", ENV_PREFIX, self.dry_run);
        println!("  {}_PROFILE:     {:?}", ENV_PREFIX, self.profile);
        println!("  {}_CONFIG:      {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_LOG:         {:?}", ENV_PREFIX, self.log);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.trim().parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all FEATURE_DISPATCH environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_COMMAND      Runner binary (default: behave)");
    println!("  {ENV_PREFIX}_MAX_WORKERS  Maximum concurrent runner processes");
    println!("  {ENV_PREFIX}_TIMEOUT      Per-feature timeout in seconds");
    println!("  {ENV_PREFIX}_TAGS         Tag filter expression");
    println!("  {ENV_PREFIX}_FORMAT       Runner output format (pretty, progress, json, ...)");
    println!("  {ENV_PREFIX}_DRY_RUN      Dry-run mode (true/false)");
    println!("  {ENV_PREFIX}_PROFILE      Run profile name");
    println!("  {ENV_PREFIX}_CONFIG       Path to configuration file");
    println!("  {ENV_PREFIX}_LOG          Log level or tracing filter directives");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_TAGS=@smoke");
    println!("  export {ENV_PREFIX}_MAX_WORKERS=2");
    println!("  feature-dispatch run features/");
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Builder for setting environment variables in tests
    pub struct EnvBuilder {
        vars: Vec<(String, String)>,
    }

    impl EnvBuilder {
        pub fn new() -> Self {
            Self { vars: Vec::new() }
        }

        pub fn set(mut self, name: &str, value: impl Into<String>) -> Self {
            self.vars.push((format!("{ENV_PREFIX}_{name}"), value.into()));
            self
        }

        /// Apply and return guard that restores on drop
        pub fn apply_scoped(self) -> EnvGuard {
            let previous: Vec<_> = self
                .vars
                .iter()
                .map(|(k, _)| (k.clone(), env::var(k).ok()))
                .collect();

            for (key, value) in self.vars {
                env::set_var(key, value);
            }

            EnvGuard { previous }
        }
    }

    /// Guard that restores environment variables on drop
    pub struct EnvGuard {
        previous: Vec<(String, Option<String>)>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.previous {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    /// Serializes tests that touch process-wide environment variables
    pub static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
}

#[cfg(test)]
mod tests {
    use super::test_support::{EnvBuilder, ENV_LOCK};
    use super::*;

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.command.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_builder() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = EnvBuilder::new()
            .set("COMMAND", "/opt/venv/bin/behave")
            .set("MAX_WORKERS", "6")
            .set("TIMEOUT", "120")
            .set("TAGS", "@smoke")
            .apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.command.as_deref(), Some("/opt/venv/bin/behave"));
        assert_eq!(config.max_workers, Some(6));
        assert_eq!(config.timeout, Some(120));
        assert_eq!(config.tags.as_deref(), Some("@smoke"));
        assert!(config.has_any());
    }

    #[test]
    fn test_invalid_numbers_are_ignored() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = EnvBuilder::new()
            .set("MAX_WORKERS", "many")
            .set("TIMEOUT", "-5")
            .apply_scoped();

        let config = EnvConfig::load();
        assert_eq!(config.max_workers, None);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_env_bool_parsing() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = EnvBuilder::new().set("DRY_RUN", "yes").apply_scoped();
        assert_eq!(EnvConfig::load().dry_run, Some(true));

        let _guard = EnvBuilder::new().set("DRY_RUN", "off").apply_scoped();
        assert_eq!(EnvConfig::load().dry_run, Some(false));
    }
}
