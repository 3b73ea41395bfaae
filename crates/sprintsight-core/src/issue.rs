//! Immutable issue snapshots as delivered by the tracker.
//!
//! An [`Issue`] is a read-only value: it is fetched once, never mutated, and
//! every derived attribute lives in the [`crate::facts`] layer instead.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Which field a changelog entry touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionField {
    Status,
    Assignee,
}

/// One field change from the issue's changelog, in chronological order.
///
/// For status changes `from`/`to` carry status *names*; for assignee changes
/// they carry assignee identifiers. Either side may be absent (an issue
/// assigned for the first time has no `from`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub at: NaiveDateTime,
    pub field: TransitionField,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl StatusTransition {
    pub fn status_change(
        at: NaiveDateTime,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            at,
            field: TransitionField::Status,
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    pub fn assignee_change(
        at: NaiveDateTime,
        from: Option<String>,
        to: Option<String>,
    ) -> Self {
        Self {
            at,
            field: TransitionField::Assignee,
            from,
            to,
        }
    }
}

/// Direction of an issue link, as seen from the owning issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkDirection {
    Inward,
    Outward,
}

/// A typed link to another issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueLink {
    /// Relation label as seen from this issue (e.g. "relates to").
    pub label: String,
    pub direction: LinkDirection,
    /// Key of the linked issue.
    pub key: String,
}

/// An issue snapshot.
///
/// Optional fields are genuine "unknown" sentinels, not errors: downstream
/// arithmetic substitutes documented fallbacks instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub id: String,
    /// Current status name (e.g. "In Progress").
    pub status: String,
    /// Tracker-side status category name; informational only.
    pub status_category: String,
    pub assignee: Option<String>,
    pub story_points: Option<f64>,
    /// Original time estimate in seconds.
    pub original_estimate_seconds: Option<i64>,
    pub issue_type: String,
    pub project_key: String,
    pub project_name: String,
    pub summary: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub resolution_date: Option<NaiveDateTime>,
    pub subtask_keys: Vec<String>,
    pub links: Vec<IssueLink>,
    /// Changelog entries, chronological as delivered by the source.
    pub transitions: Vec<StatusTransition>,
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a tracker timestamp into a UTC-naive datetime.
///
/// Accepts `YYYY-MM-DD HH:MM:SS[.ffffff]` with an optional literal `T`
/// separator and an optional trailing `+0000` or `Z` marker, both of which
/// are stripped -- no timezone conversion happens anywhere in the core.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, SourceError> {
    let cleaned = value.replace('T', " ");
    let cleaned = cleaned.trim_end_matches("+0000").trim_end_matches('Z');
    NaiveDateTime::parse_from_str(cleaned, TIMESTAMP_FORMAT).map_err(|_| {
        SourceError::InvalidTimestamp {
            value: value.to_string(),
        }
    })
}

/// Parse a `YYYY-MM-DD` date field (due dates).
pub fn parse_date(value: &str) -> Result<NaiveDate, SourceError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| SourceError::InvalidDate {
        value: value.to_string(),
    })
}
