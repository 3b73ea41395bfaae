//! Integration tests for the capacity engine and task export pipeline.

use chrono::{NaiveDate, NaiveDateTime};
use sprintsight_core::capacity::CapacityConfig;
use sprintsight_core::issue::StatusTransition;
use sprintsight_core::report::{export_tasks, read_report, task_columns};
use sprintsight_core::source::{done_tasks_with_points_jql, IssueSource};
use sprintsight_core::{CapacityEngine, Issue, SourceError, StatusClassifier};

fn classifier() -> StatusClassifier {
    StatusClassifier::new(
        vec!["Open".into(), "To Do".into()],
        vec!["In Progress".into()],
        vec!["Done".into(), "Closed".into()],
    )
    .unwrap()
}

fn ts(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 6, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn done_task(key: &str, assignee: &str, points: f64, start: u32, end: u32) -> Issue {
    Issue {
        key: key.into(),
        status: "Done".into(),
        issue_type: "Story".into(),
        project_key: "AB".into(),
        assignee: Some(assignee.into()),
        story_points: Some(points),
        transitions: vec![
            StatusTransition::status_change(ts(start, 9), "Open", "In Progress"),
            StatusTransition::status_change(ts(end, 17), "In Progress", "Done"),
        ],
        ..Issue::default()
    }
}

/// Serves the history query from a canned set and any other query from a
/// second set, mimicking the two calls the export pipeline makes.
struct SplitSource {
    history: Vec<Issue>,
    current: Vec<Issue>,
}

impl IssueSource for SplitSource {
    fn search(&self, jql: &str, _max: u32) -> Result<Vec<Issue>, SourceError> {
        if jql == done_tasks_with_points_jql("AB", 90) {
            Ok(self.history.clone())
        } else {
            Ok(self.current.clone())
        }
    }
}

fn history() -> Vec<Issue> {
    // alice closed one pointed task per day across two weeks: 10 tasks,
    // 10 points, one working day each
    (0..10)
        .map(|i| {
            let day = 1 + i + (i / 5) * 2; // skip weekends
            done_task(&format!("AB-{}", i + 1), "alice", 1.0, day, day)
        })
        .collect()
}

#[test]
fn forecasts_price_open_work_with_historical_velocity() {
    let source = SplitSource {
        history: history(),
        current: Vec::new(),
    };
    let mut engine = CapacityEngine::new(CapacityConfig::default(), classifier());
    let now = ts(15, 9);

    let stats = engine.project_stats("AB", &source, now).unwrap();
    let alice = &stats.per_employee["alice"];
    assert_eq!(alice.task_count, 10);
    assert_eq!(alice.story_points_done, 10.0);
    assert_eq!(alice.raw_working_days, 10);
    assert_eq!(alice.effective_days_per_point, 1.0);
    let fallback = stats.fallback.clone().unwrap();
    assert_eq!(fallback.task_count, 10);

    // An open 3-point task for alice prices at 3 days
    let open_task = Issue {
        key: "AB-100".into(),
        status: "Open".into(),
        issue_type: "Story".into(),
        project_key: "AB".into(),
        assignee: Some("alice".into()),
        story_points: Some(3.0),
        ..Issue::default()
    };
    let derived = engine.derive_for(&open_task, &source, now).unwrap();
    assert_eq!(derived.full_estimate_days, 3.0);
    assert_eq!(derived.remaining_days, 3.0);
    assert_eq!(derived.not_earned_days, 3.0);
    assert_eq!(derived.velocity, 1.0);

    // An unknown assignee falls back to the aggregate bucket
    let stranger_task = Issue {
        assignee: Some("mallory".into()),
        ..open_task.clone()
    };
    let derived = engine.derive_for(&stranger_task, &source, now).unwrap();
    assert!(derived.full_estimate_days > 0.0);

    // A done task is fully earned
    let closed = done_task("AB-101", "alice", 2.0, 1, 2);
    let derived = engine.derive_for(&closed, &source, now).unwrap();
    assert_eq!(derived.remaining_days, 0.0);
    assert_eq!(derived.earned_days, derived.full_estimate_days);
}

#[test]
fn export_writes_one_row_per_task_and_round_trips() {
    let current = vec![
        done_task("AB-50", "alice", 2.0, 1, 2),
        Issue {
            key: "AB-51".into(),
            status: "In Progress".into(),
            issue_type: "Story".into(),
            project_key: "AB".into(),
            assignee: Some("alice".into()),
            story_points: Some(5.0),
            summary: "Refactor, carefully".into(),
            transitions: vec![StatusTransition::status_change(ts(10, 9), "Open", "In Progress")],
            ..Issue::default()
        },
    ];
    let source = SplitSource {
        history: history(),
        current,
    };
    let mut engine = CapacityEngine::new(CapacityConfig::default(), classifier());
    let now = ts(11, 9);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("tasks.csv");
    let columns = task_columns();
    let written = export_tasks(
        &source,
        &mut engine,
        "project = AB and Sprint in openSprints()",
        &columns,
        &path,
        now,
    )
    .unwrap();
    assert_eq!(written, 2);

    let (header, rows) = read_report(&path).unwrap();
    assert_eq!(header[0], "key");
    assert_eq!(rows.len(), 2);
    let key_idx = header.iter().position(|h| h == "key").unwrap();
    let remaining_idx = header.iter().position(|h| h == "remaining_days").unwrap();
    assert_eq!(rows[0][key_idx], "AB-50");
    assert_eq!(rows[0][remaining_idx], "0");
    // In-progress task keeps a non-zero forecast
    assert_eq!(rows[1][key_idx], "AB-51");
    assert_ne!(rows[1][remaining_idx], "0");
    // A comma inside the summary survives the round trip
    let summary_idx = header.iter().position(|h| h == "summary").unwrap();
    assert_eq!(rows[1][summary_idx], "Refactor, carefully");
}
