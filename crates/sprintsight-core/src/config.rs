//! TOML-based analysis configuration.
//!
//! Stores the status classification lists, capacity thresholds and tracker
//! connection settings. Every field has a default so a partial file works;
//! the status partition is validated on load.
//!
//! Configuration is stored at `~/.config/sprintsight/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::capacity::CapacityConfig;
use crate::error::ConfigError;
use crate::interval::StatusClassifier;

/// Status classification lists. The three sets must be pairwise disjoint;
/// a status in none of them counts as in-progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "default_open_statuses")]
    pub open: Vec<String>,
    #[serde(default = "default_in_progress_statuses")]
    pub in_progress: Vec<String>,
    #[serde(default = "default_closed_statuses")]
    pub closed: Vec<String>,
}

/// Tracker connection settings; only the REST adapter needs them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub token: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/sprintsight/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub statuses: StatusConfig,
    #[serde(default)]
    pub capacity: CapacityConfig,
    #[serde(default)]
    pub jira: JiraConfig,
}

fn default_open_statuses() -> Vec<String> {
    [
        "Open",
        "To Do",
        "Reopened",
        "Backlog",
        "Ready for Development",
        "In Analysis",
    ]
    .map(String::from)
    .to_vec()
}

fn default_in_progress_statuses() -> Vec<String> {
    [
        "In Progress",
        "In Development",
        "In Review",
        "For Testing",
        "In QA",
    ]
    .map(String::from)
    .to_vec()
}

fn default_closed_statuses() -> Vec<String> {
    [
        "Done",
        "Closed",
        "Verified",
        "Resolved",
        "Released",
        "Ready for Merge",
        "Merged",
    ]
    .map(String::from)
    .to_vec()
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            open: default_open_statuses(),
            in_progress: default_in_progress_statuses(),
            closed: default_closed_statuses(),
        }
    }
}

impl AnalysisConfig {
    /// Default location: `<config dir>/sprintsight/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("sprintsight").join("config.toml"))
    }

    /// Load from the default location; a missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from an explicit path; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let text = fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(e.to_string()))?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save to the default location, creating directories as needed.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let text =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        fs::write(path, text).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Check the status partition and thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.classifier()?;
        if self.capacity.min_tasks_for_stats == 0 {
            return Err(ConfigError::InvalidValue {
                key: "capacity.min_tasks_for_stats".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Build the status classifier from the configured lists.
    pub fn classifier(&self) -> Result<StatusClassifier, ConfigError> {
        StatusClassifier::new(
            self.statuses.open.clone(),
            self.statuses.in_progress.clone(),
            self.statuses.closed.clone(),
        )
    }
}
