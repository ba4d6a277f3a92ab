//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::workspace::Workspace;

/// Default look-ahead for upcoming deadlines, in days
pub const DEFAULT_DEADLINE_WINDOW_DAYS: i64 = 30;

/// Default number of upcoming deadlines shown
pub const DEFAULT_DEADLINE_LIMIT: usize = 5;

/// Default number of notifications shown
pub const DEFAULT_NOTIFICATION_LIMIT: usize = 6;

/// Valid configuration keys with a short description
pub const VALID_KEYS: &[(&str, &str)] = &[
    ("locale", "Interface language (ar, en)"),
    (
        "default_format",
        "Default output format (auto, table, json, csv, md, id)",
    ),
    (
        "deadline_window_days",
        "Phases ending within this many days appear as upcoming deadlines",
    ),
    ("deadline_limit", "Maximum upcoming deadlines shown"),
    ("notification_limit", "Maximum notifications shown"),
];

/// MPT configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interface language code
    pub locale: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Upcoming-deadline look-ahead window in days
    pub deadline_window_days: Option<i64>,

    /// Number of upcoming deadlines shown
    pub deadline_limit: Option<usize>,

    /// Number of notifications shown
    pub notification_limit: Option<usize>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(workspace: Option<&Workspace>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/mpt/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Workspace config (.mpt/config.yaml)
        if let Some(workspace) = workspace {
            if let Some(local) = Self::read_file(&workspace.config_path()) {
                config.merge(local);
            }
        }

        // 4. Environment variables
        if let Ok(locale) = std::env::var("MPT_LOCALE") {
            config.locale = Some(locale);
        }
        if let Ok(format) = std::env::var("MPT_FORMAT") {
            config.default_format = Some(format);
        }

        config
    }

    fn read_file(path: &std::path::Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yml::from_str::<Config>(&contents) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                    None
                }
            },
            Err(_) => None,
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mpt")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.locale.is_some() {
            self.locale = other.locale;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.deadline_window_days.is_some() {
            self.deadline_window_days = other.deadline_window_days;
        }
        if other.deadline_limit.is_some() {
            self.deadline_limit = other.deadline_limit;
        }
        if other.notification_limit.is_some() {
            self.notification_limit = other.notification_limit;
        }
    }

    pub fn deadline_window_days(&self) -> i64 {
        self.deadline_window_days
            .unwrap_or(DEFAULT_DEADLINE_WINDOW_DAYS)
    }

    pub fn deadline_limit(&self) -> usize {
        self.deadline_limit.unwrap_or(DEFAULT_DEADLINE_LIMIT)
    }

    pub fn notification_limit(&self) -> usize {
        self.notification_limit
            .unwrap_or(DEFAULT_NOTIFICATION_LIMIT)
    }

    /// Look up a key as a display string
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "locale" => self.locale.clone(),
            "default_format" => self.default_format.clone(),
            "deadline_window_days" => self.deadline_window_days.map(|v| v.to_string()),
            "deadline_limit" => self.deadline_limit.map(|v| v.to_string()),
            "notification_limit" => self.notification_limit.map(|v| v.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.deadline_window_days(), 30);
        assert_eq!(config.deadline_limit(), 5);
        assert_eq!(config.notification_limit(), 6);
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            locale: Some("ar".to_string()),
            deadline_limit: Some(3),
            ..Default::default()
        };
        base.merge(Config {
            locale: Some("en".to_string()),
            ..Default::default()
        });
        assert_eq!(base.locale.as_deref(), Some("en"));
        assert_eq!(base.deadline_limit(), 3);
    }

    #[test]
    fn test_parse_yaml() {
        let config: Config =
            serde_yml::from_str("locale: en\ndeadline_window_days: 14\n").unwrap();
        assert_eq!(config.get("locale").as_deref(), Some("en"));
        assert_eq!(config.deadline_window_days(), 14);
        assert!(config.get("unknown").is_none());
    }
}
