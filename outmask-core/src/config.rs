//! Configuration management for `outmask-core`.
//!
//! A [`RedactionConfig`] says where secret values come from (literals, environment
//! variables, files) and what replaces them. It is read from YAML, discovered in a
//! few well-known locations, and merged with command-line overrides.
//!
//! License: MIT OR Apache-2.0

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::{OutmaskError, Result};

/// Placeholder written in place of every redacted value unless configured otherwise.
pub const DEFAULT_REPLACEMENT: &str = "[REDACTED]";

/// File name looked up in the working directory by [`RedactionConfig::discover`].
pub const LOCAL_CONFIG_FILE: &str = "outmask.yaml";

/// Top-level configuration for a redaction run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Text substituted for every match. May be empty to delete matches.
    pub replacement: String,
    /// Literal secret values.
    pub secrets: Vec<String>,
    /// Names of environment variables whose values are secrets.
    pub secret_env: Vec<String>,
    /// Files whose (trimmed) contents are secrets.
    pub secret_files: Vec<PathBuf>,
    /// Values shorter than this are ignored.
    pub min_secret_length: usize,
    /// If true, an unset variable in `secret_env` is skipped with a warning
    /// instead of failing the run.
    pub allow_missing_env: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            replacement: DEFAULT_REPLACEMENT.to_string(),
            secrets: Vec::new(),
            secret_env: Vec::new(),
            secret_files: Vec::new(),
            min_secret_length: 1,
            allow_missing_env: false,
        }
    }
}

/// Command-line values layered on top of a loaded config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub replacement: Option<String>,
    pub secrets: Vec<String>,
    pub secret_env: Vec<String>,
    pub secret_files: Vec<PathBuf>,
}

impl RedactionConfig {
    /// Loads a configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading redaction config from: {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| OutmaskError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RedactionConfig =
            serde_yml::from_str(&text).map_err(|source| OutmaskError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            "Config {} lists {} literal secret(s), {} env var(s), {} file(s).",
            path.display(),
            config.secrets.len(),
            config.secret_env.len(),
            config.secret_files.len()
        );
        Ok(config)
    }

    /// Loads the first config found in [`config_candidate_paths`], or the default
    /// config when there is none.
    pub fn discover() -> Result<Self> {
        match config_candidate_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_file(path),
            None => {
                debug!("No config file found in candidate locations; using defaults.");
                Ok(Self::default())
            }
        }
    }

    /// Applies command-line overrides: lists are extended, the replacement replaced.
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(replacement) = overrides.replacement {
            debug!("Overriding replacement text from the command line.");
            self.replacement = replacement;
        }
        self.secrets.extend(overrides.secrets);
        self.secret_env.extend(overrides.secret_env);
        self.secret_files.extend(overrides.secret_files);
        self
    }
}

/// Locations searched by [`RedactionConfig::discover`], most specific first.
pub fn config_candidate_paths() -> Vec<PathBuf> {
    let candidates = vec![
        Some(PathBuf::from(LOCAL_CONFIG_FILE)),
        dirs::config_dir().map(|p| p.join("outmask").join("config.yaml")),
        dirs::home_dir().map(|p| p.join(".outmask").join("config.yaml")),
        Some(PathBuf::from("/etc/outmask/config.yaml")),
    ];
    candidates.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RedactionConfig::default();
        assert_eq!(config.replacement, "[REDACTED]");
        assert_eq!(config.min_secret_length, 1);
        assert!(config.secrets.is_empty());
        assert!(!config.allow_missing_env);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: RedactionConfig = serde_yml::from_str("secrets: [\"hunter2\"]\n").unwrap();
        assert_eq!(config.secrets, vec!["hunter2".to_string()]);
        assert_eq!(config.replacement, DEFAULT_REPLACEMENT);
        assert_eq!(config.min_secret_length, 1);
    }

    #[test]
    fn test_merge_extends_lists_and_overrides_replacement() {
        let base = RedactionConfig {
            secrets: vec!["a1".into()],
            secret_env: vec!["TOKEN".into()],
            ..Default::default()
        };
        let merged = base.merge(ConfigOverrides {
            replacement: Some("***".into()),
            secrets: vec!["b2".into()],
            secret_env: vec![],
            secret_files: vec![PathBuf::from("/run/secrets/key")],
        });
        assert_eq!(merged.replacement, "***");
        assert_eq!(merged.secrets, vec!["a1".to_string(), "b2".to_string()]);
        assert_eq!(merged.secret_env, vec!["TOKEN".to_string()]);
        assert_eq!(merged.secret_files, vec![PathBuf::from("/run/secrets/key")]);
    }

    #[test]
    fn test_merge_without_replacement_keeps_config_value() {
        let base = RedactionConfig {
            replacement: "<hidden>".into(),
            ..Default::default()
        };
        let merged = base.merge(ConfigOverrides::default());
        assert_eq!(merged.replacement, "<hidden>");
    }

    #[test]
    fn test_candidate_paths_start_with_local_file() {
        let paths = config_candidate_paths();
        assert_eq!(paths[0], PathBuf::from(LOCAL_CONFIG_FILE));
        assert!(paths.iter().all(|p| p.ends_with("config.yaml") || p.ends_with(LOCAL_CONFIG_FILE)));
    }
}
