//! Capacity estimation from historical throughput.
//!
//! Completed, story-pointed tasks are grouped by the employee who picked
//! them up; each group yields a velocity statistic (days of work per story
//! point, under three day measures), which in turn prices the remaining
//! effort of open and in-progress work.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::calendar::working_days_between;
use crate::error::CoreError;
use crate::facts::IssueFacts;
use crate::interval::{working_days_from_ranges, StatusClassifier};
use crate::issue::Issue;
use crate::source::{done_tasks_with_points_jql, IssueSource, SEARCH_MAX_RESULTS};

/// Employee id used for the aggregate fallback bucket.
pub const FALLBACK_EMPLOYEE: &str = "-";

/// Capacity-estimation thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityConfig {
    /// Minimum completed tasks before an employee gets a dedicated statistic.
    #[serde(default = "default_min_tasks_for_stats")]
    pub min_tasks_for_stats: usize,
    /// How far back to look for completed tasks, in calendar days.
    #[serde(default = "default_done_lookback_days")]
    pub done_lookback_days: u32,
}

fn default_min_tasks_for_stats() -> usize {
    10
}

fn default_done_lookback_days() -> u32 {
    90
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            min_tasks_for_stats: default_min_tasks_for_stats(),
            done_lookback_days: default_done_lookback_days(),
        }
    }
}

/// Historical velocity of one employee (or of the fallback bucket).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeVelocityStat {
    pub employee: String,
    pub story_points_done: f64,
    pub estimate_days_done: f64,
    /// Summed gapped working days across tasks.
    pub raw_working_days: i64,
    /// Working days spanning the earliest work start to the latest work end.
    pub calendar_working_days: i64,
    /// Working days over merged task spans, overlaps counted once.
    pub effective_working_days: i64,
    pub task_count: usize,
    pub raw_days_per_point: f64,
    pub calendar_days_per_point: f64,
    pub effective_days_per_point: f64,
    pub raw_days_per_estimate_day: f64,
    pub calendar_days_per_estimate_day: f64,
    pub effective_days_per_estimate_day: f64,
}

impl EmployeeVelocityStat {
    /// Average story points per completed task.
    pub fn median_points(&self) -> f64 {
        if self.task_count == 0 {
            0.0
        } else {
            self.story_points_done / self.task_count as f64
        }
    }

    /// Average estimate days per completed task.
    pub fn median_estimate_days(&self) -> f64 {
        if self.task_count == 0 {
            0.0
        } else {
            self.estimate_days_done / self.task_count as f64
        }
    }
}

/// Velocity statistics for one project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectStats {
    /// Employees with enough completed tasks for a dedicated statistic.
    pub per_employee: HashMap<String, EmployeeVelocityStat>,
    /// Aggregate bucket over every collected task; the estimate of last
    /// resort for employees without their own statistic.
    pub fallback: Option<EmployeeVelocityStat>,
}

impl ProjectStats {
    /// The statistic to price an employee's task with: their own, else the
    /// fallback bucket.
    pub fn stat_for(&self, employee: Option<&str>) -> Option<&EmployeeVelocityStat> {
        employee
            .and_then(|name| self.per_employee.get(name))
            .or(self.fallback.as_ref())
    }

    /// All statistics, employees sorted by name, fallback bucket last.
    pub fn ordered(&self) -> Vec<EmployeeVelocityStat> {
        let mut stats: Vec<EmployeeVelocityStat> = self.per_employee.values().cloned().collect();
        stats.sort_by(|a, b| a.employee.cmp(&b.employee));
        stats.extend(self.fallback.clone());
        stats
    }
}

/// Compute per-employee velocity statistics from completed tasks.
///
/// Tasks are grouped by [`IssueFacts::open_issue_assignee_name`]; tasks with
/// no resolvable assignee are skipped. Groups below
/// `config.min_tasks_for_stats` are dropped from the per-employee map; the
/// fallback bucket aggregates every collected task (dropped groups included)
/// with `group_count` = number of distinct employees, so its ratios read as
/// an average-per-employee rate rather than a pooled team rate.
pub fn build_project_stats(
    config: &CapacityConfig,
    statuses: &StatusClassifier,
    done_issues: &[Issue],
    now: NaiveDateTime,
) -> ProjectStats {
    let mut groups: HashMap<String, Vec<&Issue>> = HashMap::new();
    for issue in done_issues {
        let facts = IssueFacts::new(issue, statuses);
        if let Some(assignee) = facts.open_issue_assignee_name() {
            groups.entry(assignee).or_default().push(issue);
        }
    }

    let all_tasks: Vec<&Issue> = groups.values().flat_map(|tasks| tasks.iter().copied()).collect();
    let distinct_employees = groups.len();

    let mut per_employee = HashMap::new();
    for (employee, tasks) in &groups {
        if tasks.len() < config.min_tasks_for_stats {
            continue;
        }
        per_employee.insert(
            employee.clone(),
            aggregate_stats(employee, tasks, 1, statuses, now),
        );
    }

    let fallback = if all_tasks.is_empty() {
        None
    } else {
        Some(aggregate_stats(
            FALLBACK_EMPLOYEE,
            &all_tasks,
            distinct_employees.max(1),
            statuses,
            now,
        ))
    };

    ProjectStats {
        per_employee,
        fallback,
    }
}

fn aggregate_stats(
    employee: &str,
    tasks: &[&Issue],
    group_count: usize,
    statuses: &StatusClassifier,
    now: NaiveDateTime,
) -> EmployeeVelocityStat {
    let mut story_points_done = 0.0;
    let mut estimate_days_done = 0.0;
    let mut raw_working_days = 0;
    let mut span_start: Option<NaiveDateTime> = None;
    let mut span_end: Option<NaiveDateTime> = None;
    let mut ranges = Vec::new();

    for task in tasks {
        let facts = IssueFacts::new(task, statuses);
        story_points_done += facts.issue().story_points.unwrap_or(0.0);
        estimate_days_done += facts.estimate_days().unwrap_or(0.0);
        raw_working_days += facts.actual_working_days_with_gaps(now);
        if let Some(start) = facts.work_start_date() {
            span_start = Some(span_start.map_or(start, |s| s.min(start)));
        }
        if let Some(end) = facts.work_end_date() {
            span_end = Some(span_end.map_or(end, |e| e.max(end)));
        }
        if let Some(range) = facts.work_range() {
            ranges.push(range);
        }
    }

    let calendar_working_days = match (span_start, span_end) {
        (Some(start), Some(end)) => working_days_between(start, end),
        _ => 0,
    };
    let effective_working_days = working_days_from_ranges(ranges);

    let mut stat = EmployeeVelocityStat {
        employee: employee.to_string(),
        story_points_done,
        estimate_days_done,
        raw_working_days,
        calendar_working_days,
        effective_working_days,
        task_count: tasks.len(),
        raw_days_per_point: 0.0,
        calendar_days_per_point: 0.0,
        effective_days_per_point: 0.0,
        raw_days_per_estimate_day: 0.0,
        calendar_days_per_estimate_day: 0.0,
        effective_days_per_estimate_day: 0.0,
    };

    let scale = group_count as f64;
    if story_points_done > 0.0 {
        stat.raw_days_per_point = raw_working_days as f64 * scale / story_points_done;
        stat.calendar_days_per_point = calendar_working_days as f64 * scale / story_points_done;
        stat.effective_days_per_point = effective_working_days as f64 * scale / story_points_done;
    }
    if estimate_days_done > 0.0 {
        stat.raw_days_per_estimate_day = raw_working_days as f64 * scale / estimate_days_done;
        stat.calendar_days_per_estimate_day =
            calendar_working_days as f64 * scale / estimate_days_done;
        stat.effective_days_per_estimate_day =
            effective_working_days as f64 * scale / estimate_days_done;
    }
    stat
}

/// Price a task at its full size in working days.
///
/// Prefers story points scaled by the statistic's effective velocity, then
/// the original estimate scaled likewise, then the task's own raw fields
/// (points, estimate days, or 1 as the floor for a task with neither).
/// Missing task fields substitute the statistic's per-task average.
pub fn full_estimate(facts: &IssueFacts<'_>, stat: Option<&EmployeeVelocityStat>) -> f64 {
    let Some(stat) = stat else {
        return facts
            .issue()
            .story_points
            .or_else(|| facts.estimate_days())
            .unwrap_or(1.0);
    };
    if stat.calendar_days_per_point > 0.0 {
        return facts
            .issue()
            .story_points
            .unwrap_or_else(|| stat.median_points())
            * stat.effective_days_per_point;
    }
    if stat.calendar_days_per_estimate_day > 0.0 {
        return facts
            .estimate_days()
            .unwrap_or_else(|| stat.median_estimate_days())
            * stat.effective_days_per_estimate_day;
    }
    facts
        .issue()
        .story_points
        .or_else(|| facts.estimate_days())
        .unwrap_or(1.0)
}

/// Forecast the working days left on a task.
///
/// Closed tasks are fully earned (0). Open tasks report their full estimate.
/// In-progress tasks report the estimate minus days already worked, floored
/// at 1: a started task is never fully earned until it closes.
pub fn forecast_remaining_days(
    facts: &IssueFacts<'_>,
    stat: Option<&EmployeeVelocityStat>,
    fallback: Option<&EmployeeVelocityStat>,
    now: NaiveDateTime,
) -> f64 {
    if facts.is_done() {
        return 0.0;
    }
    let chosen = stat.or(fallback);
    let estimate = full_estimate(facts, chosen);
    if facts.is_open() {
        return estimate;
    }
    let actual = facts.actual_working_days_with_gaps(now) as f64;
    (estimate - actual).max(1.0)
}

/// Uncertainty band around a base estimate: `base -/+ sqrt(base)`.
pub fn estimate_bounds(base: f64) -> (f64, f64) {
    let spread = base.max(0.0).sqrt();
    (base - spread, base + spread)
}

/// Earned-value attributes derived for one task.
///
/// Produced by [`derive`]; the issue snapshot itself is never touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedFacts {
    /// Forecast working days left.
    pub remaining_days: f64,
    /// Full size of the task in working days.
    pub full_estimate_days: f64,
    /// Value earned: the full estimate once the task closed, else 0.
    pub earned_days: f64,
    /// Days actually spent on closed tasks (ungapped span).
    pub spent_days: f64,
    /// Value not yet earned: the full estimate while the task is not closed.
    pub not_earned_days: f64,
    /// Effective days per story point of the statistic used, 1 when unknown.
    pub velocity: f64,
}

/// Derive earned-value attributes for one task from velocity statistics.
pub fn derive(
    facts: &IssueFacts<'_>,
    stat: Option<&EmployeeVelocityStat>,
    fallback: Option<&EmployeeVelocityStat>,
    now: NaiveDateTime,
) -> DerivedFacts {
    let chosen = stat.or(fallback);
    let full = full_estimate(facts, chosen);
    let remaining = forecast_remaining_days(facts, stat, fallback, now);
    let done = facts.is_done();
    DerivedFacts {
        remaining_days: remaining,
        full_estimate_days: full,
        earned_days: if done { full } else { 0.0 },
        spent_days: if done {
            facts.actual_working_days_without_gaps(now) as f64
        } else {
            0.0
        },
        not_earned_days: if done { 0.0 } else { full },
        velocity: chosen
            .map(|s| s.effective_days_per_point)
            .filter(|v| *v > 0.0)
            .unwrap_or(1.0),
    }
}

/// Lazily computed, memoized velocity statistics per project.
///
/// Statistics are fetched and computed at most once per project key per run;
/// later lookups reuse the cached value.
pub struct CapacityEngine {
    config: CapacityConfig,
    statuses: StatusClassifier,
    projects: HashMap<String, ProjectStats>,
}

impl CapacityEngine {
    pub fn new(config: CapacityConfig, statuses: StatusClassifier) -> Self {
        Self {
            config,
            statuses,
            projects: HashMap::new(),
        }
    }

    pub fn statuses(&self) -> &StatusClassifier {
        &self.statuses
    }

    /// Velocity statistics for a project, computed on first use.
    pub fn project_stats(
        &mut self,
        project: &str,
        source: &dyn IssueSource,
        now: NaiveDateTime,
    ) -> Result<&ProjectStats, CoreError> {
        self.ensure_project(project, source, now)?;
        Ok(&self.projects[project])
    }

    /// Derive earned-value attributes for a task, lazily computing its
    /// project's statistics.
    pub fn derive_for(
        &mut self,
        issue: &Issue,
        source: &dyn IssueSource,
        now: NaiveDateTime,
    ) -> Result<DerivedFacts, CoreError> {
        self.ensure_project(&issue.project_key, source, now)?;
        let stats = &self.projects[&issue.project_key];
        let facts = IssueFacts::new(issue, &self.statuses);
        let assignee = facts.open_issue_assignee_name();
        let stat = assignee.as_deref().and_then(|name| stats.per_employee.get(name));
        Ok(derive(&facts, stat, stats.fallback.as_ref(), now))
    }

    fn ensure_project(
        &mut self,
        project: &str,
        source: &dyn IssueSource,
        now: NaiveDateTime,
    ) -> Result<(), CoreError> {
        if self.projects.contains_key(project) {
            return Ok(());
        }
        let jql = done_tasks_with_points_jql(project, self.config.done_lookback_days);
        let issues = source.search(&jql, SEARCH_MAX_RESULTS)?;
        tracing::debug!(project, tasks = issues.len(), "computing velocity statistics");
        let stats = build_project_stats(&self.config, &self.statuses, &issues, now);
        self.projects.insert(project.to_string(), stats);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::StatusTransition;
    use chrono::NaiveDate;

    fn classifier() -> StatusClassifier {
        StatusClassifier::new(
            vec!["Open".into()],
            vec!["In Progress".into()],
            vec!["Done".into()],
        )
        .unwrap()
    }

    fn ts(day: u32, hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    /// A task worked start..end (June days), closed, with points.
    fn done_task(key: &str, assignee: &str, points: f64, start: u32, end: u32) -> Issue {
        Issue {
            key: key.into(),
            status: "Done".into(),
            issue_type: "Story".into(),
            assignee: Some(assignee.into()),
            story_points: Some(points),
            transitions: vec![
                StatusTransition::status_change(ts(start, 9), "Open", "In Progress"),
                StatusTransition::status_change(ts(end, 17), "In Progress", "Done"),
            ],
            ..Issue::default()
        }
    }

    fn small_config() -> CapacityConfig {
        CapacityConfig {
            min_tasks_for_stats: 2,
            ..CapacityConfig::default()
        }
    }

    #[test]
    fn groups_by_assignee_and_derives_ratios() {
        let statuses = classifier();
        // alice: 2 tasks, 2+3=5 sp, Mon..Tue (2d) and Wed..Fri (3d)
        let issues = vec![
            done_task("AB-1", "alice", 2.0, 1, 2),
            done_task("AB-2", "alice", 3.0, 3, 5),
        ];
        let stats = build_project_stats(&small_config(), &statuses, &issues, ts(8, 9));
        let alice = &stats.per_employee["alice"];
        assert_eq!(alice.task_count, 2);
        assert_eq!(alice.story_points_done, 5.0);
        assert_eq!(alice.raw_working_days, 5);
        assert_eq!(alice.calendar_working_days, 5);
        assert_eq!(alice.effective_working_days, 5);
        assert_eq!(alice.effective_days_per_point, 1.0);
        assert_eq!(alice.median_points(), 2.5);
    }

    #[test]
    fn overlapping_tasks_shrink_effective_days() {
        let statuses = classifier();
        // Both tasks span the same Mon..Fri week
        let issues = vec![
            done_task("AB-1", "alice", 2.0, 1, 5),
            done_task("AB-2", "alice", 2.0, 1, 5),
        ];
        let stats = build_project_stats(&small_config(), &statuses, &issues, ts(8, 9));
        let alice = &stats.per_employee["alice"];
        assert_eq!(alice.raw_working_days, 10);
        assert_eq!(alice.effective_working_days, 5);
        assert!(alice.effective_working_days <= alice.raw_working_days);
    }

    #[test]
    fn small_groups_fold_into_fallback_only() {
        let statuses = classifier();
        let issues = vec![
            done_task("AB-1", "alice", 2.0, 1, 2),
            done_task("AB-2", "alice", 3.0, 3, 5),
            done_task("AB-3", "bob", 1.0, 1, 1),
        ];
        let stats = build_project_stats(&small_config(), &statuses, &issues, ts(8, 9));
        assert!(stats.per_employee.contains_key("alice"));
        assert!(!stats.per_employee.contains_key("bob"));
        let fallback = stats.fallback.as_ref().unwrap();
        assert_eq!(fallback.employee, FALLBACK_EMPLOYEE);
        // Fallback pools every task, bob's included
        assert_eq!(fallback.task_count, 3);
        assert_eq!(fallback.story_points_done, 6.0);
    }

    #[test]
    fn fallback_ratios_average_per_employee() {
        let statuses = classifier();
        // Two employees, one week each, 5 sp each
        let issues = vec![
            done_task("AB-1", "alice", 5.0, 1, 5),
            done_task("AB-2", "bob", 5.0, 1, 5),
        ];
        let config = CapacityConfig {
            min_tasks_for_stats: 1,
            ..CapacityConfig::default()
        };
        let stats = build_project_stats(&config, &statuses, &issues, ts(8, 9));
        let fallback = stats.fallback.as_ref().unwrap();
        // Pooled: 10 raw days / 10 sp, scaled by 2 employees => 2.0 per point
        assert_eq!(fallback.raw_days_per_point, 2.0);
        // Individuals are unscaled
        assert_eq!(stats.per_employee["alice"].raw_days_per_point, 1.0);
    }

    #[test]
    fn zero_points_leave_ratios_neutral() {
        let statuses = classifier();
        let mut task = done_task("AB-1", "alice", 1.0, 1, 2);
        task.story_points = Some(0.0);
        let config = CapacityConfig {
            min_tasks_for_stats: 1,
            ..CapacityConfig::default()
        };
        let stats = build_project_stats(&config, &statuses, &[task], ts(8, 9));
        let alice = &stats.per_employee["alice"];
        assert_eq!(alice.effective_days_per_point, 0.0);
        assert_eq!(alice.raw_days_per_estimate_day, 0.0);
    }

    #[test]
    fn unassigned_tasks_are_skipped() {
        let statuses = classifier();
        let mut task = done_task("AB-1", "alice", 1.0, 1, 2);
        task.assignee = None;
        let stats = build_project_stats(&small_config(), &statuses, &[task], ts(8, 9));
        assert!(stats.per_employee.is_empty());
        assert!(stats.fallback.is_none());
    }

    fn stat_with_velocity(effective_per_point: f64) -> EmployeeVelocityStat {
        EmployeeVelocityStat {
            employee: "alice".into(),
            story_points_done: 10.0,
            estimate_days_done: 0.0,
            raw_working_days: 10,
            calendar_working_days: 12,
            effective_working_days: 10,
            task_count: 4,
            raw_days_per_point: 1.0,
            calendar_days_per_point: 1.2,
            effective_days_per_point: effective_per_point,
            raw_days_per_estimate_day: 0.0,
            calendar_days_per_estimate_day: 0.0,
            effective_days_per_estimate_day: 0.0,
        }
    }

    #[test]
    fn full_estimate_prefers_story_points() {
        let statuses = classifier();
        let issue = Issue {
            status: "Open".into(),
            story_points: Some(4.0),
            ..Issue::default()
        };
        let facts = IssueFacts::new(&issue, &statuses);
        let stat = stat_with_velocity(1.5);
        assert_eq!(full_estimate(&facts, Some(&stat)), 6.0);
    }

    #[test]
    fn full_estimate_substitutes_median_points() {
        let statuses = classifier();
        let issue = Issue {
            status: "Open".into(),
            ..Issue::default()
        };
        let facts = IssueFacts::new(&issue, &statuses);
        let stat = stat_with_velocity(2.0);
        // median 10/4 = 2.5 points at 2.0 days each
        assert_eq!(full_estimate(&facts, Some(&stat)), 5.0);
    }

    #[test]
    fn full_estimate_without_stats_uses_raw_fields() {
        let statuses = classifier();
        let issue = Issue {
            status: "Open".into(),
            story_points: Some(3.0),
            ..Issue::default()
        };
        let facts = IssueFacts::new(&issue, &statuses);
        assert_eq!(full_estimate(&facts, None), 3.0);

        let bare = Issue {
            status: "Open".into(),
            ..Issue::default()
        };
        let bare_facts = IssueFacts::new(&bare, &statuses);
        assert_eq!(full_estimate(&bare_facts, None), 1.0);
    }

    #[test]
    fn full_estimate_falls_back_to_estimate_days() {
        let statuses = classifier();
        let issue = Issue {
            status: "Open".into(),
            original_estimate_seconds: Some(3 * 8 * 3600),
            ..Issue::default()
        };
        let facts = IssueFacts::new(&issue, &statuses);
        let mut stat = stat_with_velocity(0.0);
        stat.calendar_days_per_point = 0.0;
        stat.estimate_days_done = 8.0;
        stat.calendar_days_per_estimate_day = 1.5;
        stat.effective_days_per_estimate_day = 1.25;
        assert_eq!(full_estimate(&facts, Some(&stat)), 3.75);
    }

    #[test]
    fn forecast_is_zero_for_done_tasks() {
        let statuses = classifier();
        let issue = done_task("AB-1", "alice", 5.0, 1, 5);
        let facts = IssueFacts::new(&issue, &statuses);
        let stat = stat_with_velocity(1.5);
        assert_eq!(
            forecast_remaining_days(&facts, Some(&stat), None, ts(8, 9)),
            0.0
        );
        assert_eq!(forecast_remaining_days(&facts, None, None, ts(8, 9)), 0.0);
    }

    #[test]
    fn forecast_for_open_task_is_full_estimate() {
        let statuses = classifier();
        let issue = Issue {
            status: "Open".into(),
            story_points: Some(4.0),
            ..Issue::default()
        };
        let facts = IssueFacts::new(&issue, &statuses);
        let stat = stat_with_velocity(1.5);
        assert_eq!(
            forecast_remaining_days(&facts, Some(&stat), None, ts(8, 9)),
            6.0
        );
    }

    #[test]
    fn forecast_for_in_progress_task_never_drops_below_one() {
        let statuses = classifier();
        // 2 points at 1.0 day each, but already 5 days in
        let issue = Issue {
            status: "In Progress".into(),
            story_points: Some(2.0),
            transitions: vec![StatusTransition::status_change(ts(1, 9), "Open", "In Progress")],
            ..Issue::default()
        };
        let facts = IssueFacts::new(&issue, &statuses);
        let stat = stat_with_velocity(1.0);
        assert_eq!(
            forecast_remaining_days(&facts, Some(&stat), None, ts(5, 17)),
            1.0
        );
        // With no stats at all the floor still holds
        assert!(forecast_remaining_days(&facts, None, None, ts(5, 17)) >= 1.0);
    }

    #[test]
    fn derive_splits_earned_and_not_earned() {
        let statuses = classifier();
        let stat = stat_with_velocity(1.0);

        let done = done_task("AB-1", "alice", 3.0, 1, 3);
        let done_facts = IssueFacts::new(&done, &statuses);
        let derived = derive(&done_facts, Some(&stat), None, ts(8, 9));
        assert_eq!(derived.remaining_days, 0.0);
        assert_eq!(derived.earned_days, 3.0);
        assert_eq!(derived.spent_days, 3.0);
        assert_eq!(derived.not_earned_days, 0.0);
        assert_eq!(derived.velocity, 1.0);

        let open = Issue {
            status: "Open".into(),
            story_points: Some(3.0),
            ..Issue::default()
        };
        let open_facts = IssueFacts::new(&open, &statuses);
        let derived = derive(&open_facts, Some(&stat), None, ts(8, 9));
        assert_eq!(derived.earned_days, 0.0);
        assert_eq!(derived.spent_days, 0.0);
        assert_eq!(derived.not_earned_days, 3.0);
    }

    #[test]
    fn derive_velocity_defaults_to_one() {
        let statuses = classifier();
        let issue = Issue {
            status: "Open".into(),
            ..Issue::default()
        };
        let facts = IssueFacts::new(&issue, &statuses);
        assert_eq!(derive(&facts, None, None, ts(8, 9)).velocity, 1.0);
        let zero_stat = stat_with_velocity(0.0);
        assert_eq!(
            derive(&facts, Some(&zero_stat), None, ts(8, 9)).velocity,
            1.0
        );
    }

    #[test]
    fn estimate_bounds_spread_by_square_root() {
        let (low, high) = estimate_bounds(9.0);
        assert_eq!(low, 6.0);
        assert_eq!(high, 12.0);
    }

    struct CountingSource {
        issues: Vec<Issue>,
        calls: std::cell::Cell<usize>,
    }

    impl IssueSource for CountingSource {
        fn search(&self, _jql: &str, _max: u32) -> Result<Vec<Issue>, crate::error::SourceError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.issues.clone())
        }
    }

    #[test]
    fn engine_computes_project_stats_at_most_once() {
        let source = CountingSource {
            issues: vec![
                done_task("AB-1", "alice", 2.0, 1, 2),
                done_task("AB-2", "alice", 3.0, 3, 5),
            ],
            calls: std::cell::Cell::new(0),
        };
        let mut engine = CapacityEngine::new(small_config(), classifier());
        engine.project_stats("AB", &source, ts(8, 9)).unwrap();
        engine.project_stats("AB", &source, ts(8, 9)).unwrap();
        let mut task = done_task("AB-9", "alice", 1.0, 1, 1);
        task.project_key = "AB".into();
        engine.derive_for(&task, &source, ts(8, 9)).unwrap();
        assert_eq!(source.calls.get(), 1);
    }
}
