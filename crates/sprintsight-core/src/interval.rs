//! Status classification and active-work interval extraction.
//!
//! The temporal heart of the system: a single scan over an issue's status
//! changelog reconstructs the spans during which the issue was actually being
//! worked on, which everything downstream (capacity statistics, forecasts)
//! counts in working days.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::calendar::working_days_between;
use crate::error::ConfigError;
use crate::issue::{StatusTransition, TransitionField};

/// The three-way partition every status name falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusClass {
    Open,
    InProgress,
    Closed,
}

/// Classifies status names into [`StatusClass`]es from three configured,
/// pairwise-disjoint name sets.
///
/// A name found in none of the sets classifies as `InProgress` -- anything
/// that is neither Open nor Closed counts as active work. The partition
/// itself is validated at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusClassifier {
    open: Vec<String>,
    in_progress: Vec<String>,
    closed: Vec<String>,
}

impl StatusClassifier {
    /// Build a classifier, rejecting any status name that appears in more
    /// than one set.
    pub fn new(
        open: Vec<String>,
        in_progress: Vec<String>,
        closed: Vec<String>,
    ) -> Result<Self, ConfigError> {
        check_disjoint(&open, "open", &in_progress, "in_progress")?;
        check_disjoint(&open, "open", &closed, "closed")?;
        check_disjoint(&in_progress, "in_progress", &closed, "closed")?;
        Ok(Self {
            open,
            in_progress,
            closed,
        })
    }

    pub fn classify(&self, status: &str) -> StatusClass {
        if self.open.iter().any(|s| s == status) {
            StatusClass::Open
        } else if self.closed.iter().any(|s| s == status) {
            StatusClass::Closed
        } else {
            StatusClass::InProgress
        }
    }

    /// Configured Open-class names, in configuration order.
    pub fn open_statuses(&self) -> &[String] {
        &self.open
    }

    /// Configured Closed-class names, in configuration order.
    pub fn closed_statuses(&self) -> &[String] {
        &self.closed
    }

    fn class_of(&self, value: Option<&str>) -> StatusClass {
        self.classify(value.unwrap_or(""))
    }

    /// True when a status change crosses into active work: old class is not
    /// InProgress, new class is.
    pub fn is_start_progress(&self, transition: &StatusTransition) -> bool {
        transition.field == TransitionField::Status
            && self.class_of(transition.from.as_deref()) != StatusClass::InProgress
            && self.class_of(transition.to.as_deref()) == StatusClass::InProgress
    }

    /// True when a status change leaves active work: old class is InProgress,
    /// new class is not.
    pub fn is_end_progress(&self, transition: &StatusTransition) -> bool {
        transition.field == TransitionField::Status
            && self.class_of(transition.from.as_deref()) == StatusClass::InProgress
            && self.class_of(transition.to.as_deref()) != StatusClass::InProgress
    }

    /// Reconstruct active-work intervals from a chronological changelog.
    ///
    /// Tracks at most one open interval. The first start-progress transition
    /// opens it; later start-progress transitions while it is open are
    /// ignored (re-entering an in-progress state does not reset the span).
    /// An end-progress transition closes and emits it. An interval still
    /// open after the scan is emitted with `end: None`, meaning the issue is
    /// being worked on right now.
    pub fn extract_work_intervals(
        &self,
        issue_key: &str,
        transitions: &[StatusTransition],
    ) -> Vec<WorkInterval> {
        let mut intervals = Vec::new();
        let mut open_since: Option<NaiveDateTime> = None;
        for transition in transitions {
            match open_since {
                None => {
                    if self.is_start_progress(transition) {
                        open_since = Some(transition.at);
                    }
                }
                Some(start) => {
                    if self.is_end_progress(transition) {
                        intervals.push(WorkInterval {
                            issue_key: issue_key.to_string(),
                            start,
                            end: Some(transition.at),
                        });
                        open_since = None;
                    }
                }
            }
        }
        if let Some(start) = open_since {
            intervals.push(WorkInterval {
                issue_key: issue_key.to_string(),
                start,
                end: None,
            });
        }
        intervals
    }
}

fn check_disjoint(
    a: &[String],
    a_name: &'static str,
    b: &[String],
    b_name: &'static str,
) -> Result<(), ConfigError> {
    for status in a {
        if b.iter().any(|s| s == status) {
            return Err(ConfigError::OverlappingStatuses {
                status: status.clone(),
                first: a_name,
                second: b_name,
            });
        }
    }
    Ok(())
}

/// A span of active work on one issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkInterval {
    pub issue_key: String,
    pub start: NaiveDateTime,
    /// `None` while the issue still holds an InProgress-class status.
    pub end: Option<NaiveDateTime>,
}

impl WorkInterval {
    pub fn is_ongoing(&self) -> bool {
        self.end.is_none()
    }

    /// Concrete range, closing an ongoing interval at `now`.
    pub fn to_range(&self, now: NaiveDateTime) -> DateRange {
        DateRange {
            start: self.start,
            end: self.end.unwrap_or(now),
        }
    }

    /// Working days covered by this interval, ongoing spans counted to `now`.
    pub fn working_days(&self, now: NaiveDateTime) -> i64 {
        self.to_range(now).working_days()
    }
}

/// A concrete start/end pair used for merging and day counting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn working_days(&self) -> i64 {
        working_days_between(self.start, self.end)
    }
}

/// Collapse overlapping ranges into a non-overlapping, start-sorted list.
///
/// Two ranges merge when the running range's end reaches the next range's
/// start; the merged end is the later of the two. Idempotent: merging a
/// merged list returns it unchanged.
pub fn merge_ranges(mut ranges: Vec<DateRange>) -> Vec<DateRange> {
    ranges.sort_by_key(|r| r.start);
    let mut merged: Vec<DateRange> = Vec::new();
    for range in ranges {
        match merged.last_mut() {
            Some(current) if current.end >= range.start => {
                current.end = current.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Working days covered by a set of ranges, overlaps counted once.
pub fn working_days_from_ranges(ranges: Vec<DateRange>) -> i64 {
    merge_ranges(ranges).iter().map(DateRange::working_days).sum()
}
