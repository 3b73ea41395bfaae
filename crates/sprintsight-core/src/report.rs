//! CSV report generation with an explicit column registry.
//!
//! Output columns are declared once, as name + typed extraction function
//! pairs; callers select columns by name and unknown names fail fast. Files
//! are UTF-8, comma-separated, minimally quoted, header row first.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::capacity::{CapacityEngine, DerivedFacts, EmployeeVelocityStat};
use crate::error::{CoreError, ReportError};
use crate::facts::IssueFacts;
use crate::interval::StatusClassifier;
use crate::issue::Issue;
use crate::source::{IssueSource, SEARCH_MAX_RESULTS};

/// One output column: a name and how to extract its value from a row.
#[derive(Debug)]
pub struct Column<R> {
    pub name: &'static str,
    pub extract: fn(&R) -> String,
}

/// A task row ready for export: snapshot fields flattened next to the
/// derived earned-value attributes.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: String,
    pub story_points: Option<f64>,
    pub actual_working_days_with_gaps: i64,
    pub actual_working_days_without_gaps: i64,
    pub derived: DerivedFacts,
}

/// Flatten one issue plus its derived facts into a report row.
pub fn task_record(
    issue: &Issue,
    statuses: &StatusClassifier,
    derived: DerivedFacts,
    now: NaiveDateTime,
) -> TaskRecord {
    let facts = IssueFacts::new(issue, statuses);
    TaskRecord {
        key: issue.key.clone(),
        summary: issue.summary.clone(),
        status: issue.status.clone(),
        assignee: facts.open_issue_assignee_name().unwrap_or_default(),
        story_points: issue.story_points,
        actual_working_days_with_gaps: facts.actual_working_days_with_gaps(now),
        actual_working_days_without_gaps: facts.actual_working_days_without_gaps(now),
        derived,
    }
}

fn opt_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// The full task column registry, in default output order.
pub fn task_columns() -> Vec<Column<TaskRecord>> {
    vec![
        Column { name: "key", extract: |r| r.key.clone() },
        Column { name: "assignee_name", extract: |r| r.assignee.clone() },
        Column { name: "status", extract: |r| r.status.clone() },
        Column {
            name: "actual_working_days_with_gaps",
            extract: |r| r.actual_working_days_with_gaps.to_string(),
        },
        Column {
            name: "actual_working_days_without_gaps",
            extract: |r| r.actual_working_days_without_gaps.to_string(),
        },
        Column { name: "story_points", extract: |r| opt_number(r.story_points) },
        Column { name: "sp_velocity", extract: |r| r.derived.velocity.to_string() },
        Column {
            name: "remaining_days",
            extract: |r| r.derived.remaining_days.to_string(),
        },
        Column {
            name: "full_estimate_days",
            extract: |r| r.derived.full_estimate_days.to_string(),
        },
        Column { name: "earned_days", extract: |r| r.derived.earned_days.to_string() },
        Column { name: "spent_days", extract: |r| r.derived.spent_days.to_string() },
        Column {
            name: "not_earned_days",
            extract: |r| r.derived.not_earned_days.to_string(),
        },
        Column { name: "summary", extract: |r| r.summary.clone() },
    ]
}

/// The velocity-statistics column registry.
pub fn capacity_columns() -> Vec<Column<EmployeeVelocityStat>> {
    vec![
        Column { name: "name", extract: |s| s.employee.clone() },
        Column { name: "sp_done", extract: |s| s.story_points_done.to_string() },
        Column { name: "estimate_days_done", extract: |s| s.estimate_days_done.to_string() },
        Column { name: "raw_working_days", extract: |s| s.raw_working_days.to_string() },
        Column {
            name: "calendar_working_days",
            extract: |s| s.calendar_working_days.to_string(),
        },
        Column {
            name: "effective_working_days",
            extract: |s| s.effective_working_days.to_string(),
        },
        Column { name: "task_count", extract: |s| s.task_count.to_string() },
        Column { name: "raw_days_per_point", extract: |s| s.raw_days_per_point.to_string() },
        Column {
            name: "calendar_days_per_point",
            extract: |s| s.calendar_days_per_point.to_string(),
        },
        Column {
            name: "effective_days_per_point",
            extract: |s| s.effective_days_per_point.to_string(),
        },
        Column {
            name: "raw_days_per_estimate_day",
            extract: |s| s.raw_days_per_estimate_day.to_string(),
        },
        Column {
            name: "calendar_days_per_estimate_day",
            extract: |s| s.calendar_days_per_estimate_day.to_string(),
        },
        Column {
            name: "effective_days_per_estimate_day",
            extract: |s| s.effective_days_per_estimate_day.to_string(),
        },
    ]
}

/// Pick columns from a registry by name, preserving the requested order.
pub fn select_columns<R>(
    registry: Vec<Column<R>>,
    names: &[&str],
) -> Result<Vec<Column<R>>, ReportError> {
    let mut registry: Vec<Option<Column<R>>> = registry.into_iter().map(Some).collect();
    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        let found = registry
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|c| c.name == *name))
            .and_then(Option::take)
            .ok_or_else(|| ReportError::UnknownColumn(name.to_string()))?;
        selected.push(found);
    }
    Ok(selected)
}

/// Write rows to a CSV file, creating parent directories as needed.
pub fn write_report<R>(
    path: &Path,
    columns: &[Column<R>],
    rows: &[R],
) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(columns.iter().map(|c| c.name))?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| (c.extract)(row)))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a CSV report back as header + string-valued records.
pub fn read_report(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), ReportError> {
    let mut reader = csv::Reader::from_path(path)?;
    let header = reader
        .headers()?
        .iter()
        .map(|field| field.to_string())
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(|field| field.to_string()).collect());
    }
    Ok((header, rows))
}

/// Search tasks, derive earned-value facts for each and write the report.
///
/// Velocity statistics are computed lazily, once per project encountered.
/// Returns the number of rows written.
pub fn export_tasks(
    source: &dyn IssueSource,
    engine: &mut CapacityEngine,
    query: &str,
    columns: &[Column<TaskRecord>],
    path: &Path,
    now: NaiveDateTime,
) -> Result<usize, CoreError> {
    let issues = source.search(query, SEARCH_MAX_RESULTS)?;
    let mut rows = Vec::with_capacity(issues.len());
    for issue in &issues {
        let derived = engine.derive_for(issue, source, now)?;
        rows.push(task_record(issue, engine.statuses(), derived, now));
    }
    write_report(path, columns, &rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote task report");
    Ok(rows.len())
}

/// Compute a project's velocity statistics and write them as CSV.
pub fn export_capacity(
    source: &dyn IssueSource,
    engine: &mut CapacityEngine,
    project: &str,
    path: &Path,
    now: NaiveDateTime,
) -> Result<usize, CoreError> {
    let stats = engine.project_stats(project, source, now)?.ordered();
    write_report(path, &capacity_columns(), &stats)?;
    tracing::info!(path = %path.display(), rows = stats.len(), "wrote capacity report");
    Ok(stats.len())
}
