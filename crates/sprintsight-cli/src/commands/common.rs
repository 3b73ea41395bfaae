//! Shared wiring for CLI commands.

use chrono::{NaiveDateTime, Utc};
use sprintsight_core::source::jira::JiraClient;
use sprintsight_core::{AnalysisConfig, StatusClassifier};

/// Load the configuration and build the status classifier from it.
pub fn load_config() -> Result<(AnalysisConfig, StatusClassifier), Box<dyn std::error::Error>> {
    let config = AnalysisConfig::load()?;
    let classifier = config.classifier()?;
    Ok((config, classifier))
}

/// Build the tracker client from the configured connection settings.
pub fn jira_client(config: &AnalysisConfig) -> Result<JiraClient, Box<dyn std::error::Error>> {
    if config.jira.base_url.is_empty() {
        return Err("jira.base_url is not configured; run `config init` and edit the file".into());
    }
    Ok(JiraClient::new(
        &config.jira.base_url,
        &config.jira.user,
        &config.jira.token,
    )?)
}

/// The analysis timestamp: current wall-clock time, UTC-naive.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
