//! Sprint snapshots and the sprint health rule table.
//!
//! A [`SprintSnapshot`] aggregates one sprint's issues into story-point
//! partitions and working-day progress, then runs a fixed, ordered table of
//! health rules over the result. Every rule is checked independently; each
//! match produces one alert.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::calendar::working_days_between;
use crate::facts::IssueFacts;
use crate::interval::StatusClassifier;
use crate::issue::Issue;
use crate::source::SprintInfo;

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Major,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::Major => write!(f, "Major"),
        }
    }
}

/// One fired sprint health alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// Aggregated view of one sprint at a point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SprintSnapshot {
    pub id: u64,
    pub name: String,
    pub board_name: String,
    pub goal: String,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    /// Working days elapsed since the sprint started.
    pub days_passed: i64,
    /// Working days until the sprint ends; negative once it is overdue.
    pub days_remaining: i64,
    pub open_issues: Vec<Issue>,
    pub in_progress_issues: Vec<Issue>,
    pub done_issues: Vec<Issue>,
    /// Keys of non-done issues missing an estimate.
    pub unestimated_keys: Vec<String>,
    pub open_sp: f64,
    pub in_progress_sp: f64,
    pub done_sp: f64,
    pub alerts: Vec<Alert>,
}

impl SprintSnapshot {
    /// Build a snapshot from a sprint's issues and evaluate the rule table.
    pub fn from_issues(
        info: &SprintInfo,
        board_name: &str,
        issues: Vec<Issue>,
        statuses: &StatusClassifier,
        now: NaiveDateTime,
    ) -> Self {
        let mut snapshot = SprintSnapshot {
            id: info.id,
            name: info.name.clone(),
            board_name: board_name.to_string(),
            goal: info.goal.clone().unwrap_or_default(),
            start_date: Some(info.start_date),
            end_date: Some(info.end_date),
            days_passed: working_days_between(info.start_date, now),
            days_remaining: working_days_between(now, info.end_date),
            ..SprintSnapshot::default()
        };

        for issue in issues {
            let facts = IssueFacts::new(&issue, statuses);
            let points = issue.story_points.unwrap_or(0.0);
            if !facts.is_done() && !facts.is_estimated() {
                snapshot.unestimated_keys.push(issue.key.clone());
            }
            if facts.is_done() {
                snapshot.done_sp += points;
                snapshot.done_issues.push(issue);
            } else if facts.is_open() {
                snapshot.open_sp += points;
                snapshot.open_issues.push(issue);
            } else {
                snapshot.in_progress_sp += points;
                snapshot.in_progress_issues.push(issue);
            }
        }

        snapshot.alerts = evaluate_rules(&snapshot);
        snapshot
    }

    pub fn total_sp(&self) -> f64 {
        self.open_sp + self.in_progress_sp + self.done_sp
    }

    fn total_days(&self) -> i64 {
        self.days_passed + self.days_remaining
    }

    /// At least a quarter of the sprint window has elapsed.
    pub fn early_sprint(&self) -> bool {
        self.total_days() as f64 * 0.25 <= self.days_passed as f64
    }

    /// At least half of the sprint window has elapsed.
    pub fn mid_sprint(&self) -> bool {
        self.total_days() as f64 * 0.50 <= self.days_passed as f64
    }

    /// At least three quarters of the sprint window have elapsed.
    ///
    /// The phase flags are cumulative, not mutually exclusive: a sprint at
    /// 80% elapsed is early, mid and frozen at once.
    pub fn feature_freeze(&self) -> bool {
        self.total_days() as f64 * 0.75 <= self.days_passed as f64
    }

    /// Is any open issue estimated at `min_points` or more?
    pub fn has_open_with_points(&self, min_points: f64) -> bool {
        self.open_issues
            .iter()
            .any(|issue| issue.story_points.unwrap_or(0.0) >= min_points)
    }

    pub fn done_sp_percent(&self) -> f64 {
        if self.total_sp() == 0.0 {
            return 100.0;
        }
        self.done_sp * 100.0 / self.total_sp()
    }

    pub fn in_progress_sp_percent(&self) -> f64 {
        if self.total_sp() == 0.0 {
            return 0.0;
        }
        self.in_progress_sp * 100.0 / self.total_sp()
    }

    pub fn open_sp_percent(&self) -> f64 {
        if self.total_sp() == 0.0 {
            return 0.0;
        }
        self.open_sp * 100.0 / self.total_sp()
    }
}

/// One entry of the health rule table.
pub struct RiskRule {
    pub message: &'static str,
    pub severity: Severity,
    check: fn(&SprintSnapshot) -> bool,
}

impl RiskRule {
    pub fn matches(&self, snapshot: &SprintSnapshot) -> bool {
        (self.check)(snapshot)
    }
}

fn sprint_past_end(s: &SprintSnapshot) -> bool {
    s.days_remaining < 0
}

fn unfinished_scope_in_completed_sprint(s: &SprintSnapshot) -> bool {
    s.total_sp() > s.done_sp && s.days_remaining <= 0
}

fn has_unestimated_tasks(s: &SprintSnapshot) -> bool {
    !s.unestimated_keys.is_empty()
}

fn half_scope_not_started_early(s: &SprintSnapshot) -> bool {
    s.early_sprint() && s.open_sp > s.total_sp() * 0.50
}

fn big_task_not_started_early(s: &SprintSnapshot) -> bool {
    s.early_sprint() && s.has_open_with_points(8.0)
}

fn quarter_scope_not_started_mid(s: &SprintSnapshot) -> bool {
    s.mid_sprint() && s.open_sp > s.total_sp() * 0.25
}

fn medium_task_not_started_mid(s: &SprintSnapshot) -> bool {
    s.mid_sprint() && s.has_open_with_points(5.0)
}

fn open_tasks_at_freeze(s: &SprintSnapshot) -> bool {
    s.feature_freeze() && s.open_sp > 0.0
}

fn half_scope_unfinished_at_freeze(s: &SprintSnapshot) -> bool {
    s.feature_freeze() && s.done_sp < s.total_sp() * 0.50
}

/// The sprint health rules, evaluated in this order.
pub const RISK_RULES: [RiskRule; 9] = [
    RiskRule {
        message: "Current sprint should be closed",
        severity: Severity::Critical,
        check: sprint_past_end,
    },
    RiskRule {
        message: "All tasks must be finished in completed sprint",
        severity: Severity::Major,
        check: unfinished_scope_in_completed_sprint,
    },
    RiskRule {
        message: "Active sprint contains not estimated tasks",
        severity: Severity::Major,
        check: has_unestimated_tasks,
    },
    RiskRule {
        message: "More than 50% of tasks are still not started",
        severity: Severity::Major,
        check: half_scope_not_started_early,
    },
    RiskRule {
        message: "Some big tasks (8+ story points) are not yet started",
        severity: Severity::Major,
        check: big_task_not_started_early,
    },
    RiskRule {
        message: "More than 25% of tasks are still not started",
        severity: Severity::Major,
        check: quarter_scope_not_started_mid,
    },
    RiskRule {
        message: "Some medium-to-big tasks (5+ story points) are not yet started",
        severity: Severity::Major,
        check: medium_task_not_started_mid,
    },
    RiskRule {
        message: "Feature freeze has started, but open tasks remain",
        severity: Severity::Critical,
        check: open_tasks_at_freeze,
    },
    RiskRule {
        message: "Feature freeze has started, but more than 50% of scope is still in work",
        severity: Severity::Critical,
        check: half_scope_unfinished_at_freeze,
    },
];

/// Evaluate every rule; no short-circuiting between rules.
pub fn evaluate_rules(snapshot: &SprintSnapshot) -> Vec<Alert> {
    RISK_RULES
        .iter()
        .filter(|rule| rule.matches(snapshot))
        .map(|rule| Alert {
            severity: rule.severity,
            message: rule.message.to_string(),
        })
        .collect()
}

/// Plain-text board report for one sprint.
pub fn render_summary(snapshot: &SprintSnapshot) -> String {
    let mut output = String::new();
    output.push_str(&format!("Board: {}\n", snapshot.board_name));
    output.push_str(&format!("Sprint: {}\n", snapshot.name));
    if !snapshot.goal.is_empty() {
        output.push_str(&format!("Goal: {}\n", snapshot.goal));
    }
    output.push_str(&"-".repeat(40));
    output.push('\n');
    if let (Some(start), Some(end)) = (snapshot.start_date, snapshot.end_date) {
        output.push_str(&format!("Start date: {start}\n"));
        output.push_str(&format!("End date: {end}\n"));
    }
    output.push_str(&format!(
        "{} of {} days passed, {} days remaining\n",
        snapshot.days_passed,
        snapshot.days_passed + snapshot.days_remaining,
        snapshot.days_remaining
    ));
    output.push_str(&"-".repeat(40));
    output.push('\n');
    output.push_str(&format!("Story points in sprint: {}\n", snapshot.total_sp()));
    output.push_str(&format!(
        "Open: {} ({:.0}%)\n",
        snapshot.open_sp,
        snapshot.open_sp_percent()
    ));
    output.push_str(&format!(
        "In progress: {} ({:.0}%)\n",
        snapshot.in_progress_sp,
        snapshot.in_progress_sp_percent()
    ));
    output.push_str(&format!(
        "Done: {} ({:.0}%)\n",
        snapshot.done_sp,
        snapshot.done_sp_percent()
    ));
    if !snapshot.alerts.is_empty() {
        output.push_str(&"-".repeat(40));
        output.push('\n');
        for alert in &snapshot.alerts {
            output.push_str(&format!("{alert}\n"));
        }
    }
    output
}
