//! Derived, read-only view over an issue snapshot.
//!
//! [`IssueFacts`] computes every temporal and business attribute the engines
//! need -- work start/end dates, gapped and ungapped working-day counts, the
//! assignee an issue had when work began -- without ever touching the
//! snapshot itself.

use chrono::NaiveDateTime;

use crate::calendar::working_days_between;
use crate::interval::{DateRange, StatusClass, StatusClassifier, WorkInterval};
use crate::issue::{Issue, LinkDirection, TransitionField};

/// Issue types that are expected to carry a story-point estimate.
const ESTIMABLE_TYPES: [&str; 2] = ["Story", "Task"];

const SECONDS_PER_WORKING_DAY: f64 = 8.0 * 3600.0;

/// A borrowed derivation layer over one issue.
#[derive(Debug, Clone, Copy)]
pub struct IssueFacts<'a> {
    issue: &'a Issue,
    statuses: &'a StatusClassifier,
}

impl<'a> IssueFacts<'a> {
    pub fn new(issue: &'a Issue, statuses: &'a StatusClassifier) -> Self {
        Self { issue, statuses }
    }

    pub fn issue(&self) -> &'a Issue {
        self.issue
    }

    pub fn is_done(&self) -> bool {
        self.statuses.classify(&self.issue.status) == StatusClass::Closed
    }

    pub fn is_open(&self) -> bool {
        self.statuses.classify(&self.issue.status) == StatusClass::Open
    }

    /// False only for Story/Task issues with unset story points; other issue
    /// types are not expected to carry points and count as estimated.
    pub fn is_estimated(&self) -> bool {
        !(ESTIMABLE_TYPES.contains(&self.issue.issue_type.as_str())
            && self.issue.story_points.is_none())
    }

    /// Original estimate converted to 8-hour working days.
    pub fn estimate_days(&self) -> Option<f64> {
        self.issue
            .original_estimate_seconds
            .map(|seconds| seconds as f64 / SECONDS_PER_WORKING_DAY)
    }

    /// Timestamp of the first transition out of an Open-class status,
    /// whatever the destination -- the moment work first left the backlog.
    pub fn work_start_date(&self) -> Option<NaiveDateTime> {
        self.issue
            .transitions
            .iter()
            .find(|t| {
                t.field == TransitionField::Status
                    && self.statuses.classify(t.from.as_deref().unwrap_or("")) == StatusClass::Open
            })
            .map(|t| t.at)
    }

    /// Timestamp of the first transition into a Closed-class status.
    ///
    /// `None` unless the issue currently holds a Closed-class status: a
    /// reopened issue has no end date even if it once passed through one.
    pub fn work_end_date(&self) -> Option<NaiveDateTime> {
        if !self.is_done() {
            return None;
        }
        self.issue
            .transitions
            .iter()
            .find(|t| {
                t.field == TransitionField::Status
                    && self.statuses.classify(t.to.as_deref().unwrap_or("")) == StatusClass::Closed
            })
            .map(|t| t.at)
    }

    /// Active-work intervals extracted from the changelog.
    pub fn work_intervals(&self) -> Vec<WorkInterval> {
        self.statuses
            .extract_work_intervals(&self.issue.key, &self.issue.transitions)
    }

    /// Working days spent actively working: the sum over every InProgress
    /// interval, excluding time parked back in Open between spans. Ongoing
    /// intervals are counted up to `now`.
    pub fn actual_working_days_with_gaps(&self, now: NaiveDateTime) -> i64 {
        self.work_intervals()
            .iter()
            .map(|interval| interval.working_days(now))
            .sum()
    }

    /// Working days from first leaving Open to closing (or `now` while
    /// unresolved); 0 when work never started. Always >= the gapped measure.
    pub fn actual_working_days_without_gaps(&self, now: NaiveDateTime) -> i64 {
        let Some(start) = self.work_start_date() else {
            return 0;
        };
        let end = self.work_end_date().unwrap_or(now);
        working_days_between(start, end)
    }

    /// The span from work start to work end, when both are known.
    pub fn work_range(&self) -> Option<DateRange> {
        match (self.work_start_date(), self.work_end_date()) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        }
    }

    /// The assignee who picked the issue up.
    ///
    /// A still-open issue reports its current assignee. Otherwise assignee
    /// changes are replayed up to (not including) the first transition out of
    /// Open, falling back to the snapshot's assignee when none occurred
    /// before that point.
    pub fn open_issue_assignee_name(&self) -> Option<String> {
        if self.is_open() {
            return self.issue.assignee.clone();
        }
        let mut assignee = self.issue.assignee.clone();
        for transition in &self.issue.transitions {
            match transition.field {
                TransitionField::Assignee => {
                    if transition.to.is_some() {
                        assignee = transition.to.clone();
                    }
                }
                TransitionField::Status => {
                    let from_class =
                        self.statuses.classify(transition.from.as_deref().unwrap_or(""));
                    if from_class == StatusClass::Open {
                        return assignee;
                    }
                }
            }
        }
        assignee
    }

    /// Keys of linked issues matching a relation label and direction.
    pub fn linked_keys(&self, direction: LinkDirection, label: &str) -> Vec<String> {
        self.issue
            .links
            .iter()
            .filter(|link| link.direction == direction && link.label == label)
            .map(|link| link.key.clone())
            .collect()
    }
}
