//! Collaborator contracts for fetching raw tracker data.
//!
//! The core never talks to a tracker directly; it consumes these traits.
//! [`jira`] ships the production REST adapter, tests substitute in-memory
//! implementations.

pub mod jira;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::interval::StatusClassifier;
use crate::issue::Issue;

/// Upper bound passed to every search call.
pub const SEARCH_MAX_RESULTS: u32 = 10_000;

/// Searches issues by query string, changelog included.
pub trait IssueSource {
    fn search(&self, jql: &str, max_results: u32) -> Result<Vec<Issue>, SourceError>;
}

/// Lists boards and resolves their active sprint.
pub trait BoardSource {
    fn boards(&self) -> Result<Vec<Board>, SourceError>;
    fn active_sprint(&self, board_id: u64) -> Result<SprintInfo, SourceError>;
}

/// A scrum/kanban board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: u64,
    pub name: String,
    pub board_type: String,
}

/// Sprint metadata as returned by the board API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintInfo {
    pub id: u64,
    pub name: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub board_id: Option<u64>,
    pub goal: Option<String>,
}

fn quoted_list(statuses: &[String]) -> String {
    statuses
        .iter()
        .map(|s| format!("\"{s}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// JQL fragment matching Open-class statuses.
pub fn open_statuses_jql(statuses: &StatusClassifier) -> String {
    format!("status in ({})", quoted_list(statuses.open_statuses()))
}

/// JQL fragment matching Closed-class statuses.
pub fn closed_statuses_jql(statuses: &StatusClassifier) -> String {
    format!("status in ({})", quoted_list(statuses.closed_statuses()))
}

/// JQL fragment matching everything in neither the Open nor the Closed set.
pub fn in_progress_statuses_jql(statuses: &StatusClassifier) -> String {
    let mut all: Vec<String> = statuses.open_statuses().to_vec();
    all.extend_from_slice(statuses.closed_statuses());
    format!("status not in ({})", quoted_list(&all))
}

/// Query for all issues of one sprint.
pub fn sprint_issues_jql(sprint_id: u64) -> String {
    format!("Sprint = {sprint_id}")
}

/// Query for a project's recently completed, story-pointed tasks -- the
/// input set for velocity statistics.
pub fn done_tasks_with_points_jql(project: &str, lookback_days: u32) -> String {
    format!(
        "project = {project} AND \"Story Points\" is not empty \
         and statusCategory = done and created >= -{lookback_days}d"
    )
}

/// Browser URL for a query, for inclusion in reports.
pub fn browse_url(base_url: &str, jql: &str) -> String {
    format!(
        "{}/issues/?jql={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(jql)
    )
}
