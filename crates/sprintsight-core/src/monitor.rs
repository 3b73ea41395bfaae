//! Board monitoring orchestration.
//!
//! Walks a set of boards, resolves each one's active sprint and builds a
//! [`SprintSnapshot`] for it. A failing board is logged and skipped -- one
//! board's lookup error must never abort the remaining boards.

use chrono::NaiveDateTime;

use crate::error::CoreError;
use crate::interval::StatusClassifier;
use crate::source::{sprint_issues_jql, Board, BoardSource, IssueSource, SEARCH_MAX_RESULTS};
use crate::sprint::SprintSnapshot;

/// One board's active-sprint snapshot.
#[derive(Debug, Clone)]
pub struct BoardReport {
    pub board: Board,
    pub snapshot: SprintSnapshot,
}

/// Build a snapshot for every requested board; an empty `board_ids` means
/// every board the source lists.
///
/// Failures are per-board: each is logged with `tracing::warn!` and skipped.
pub fn monitor_boards(
    issues: &dyn IssueSource,
    boards: &dyn BoardSource,
    board_ids: &[u64],
    statuses: &StatusClassifier,
    now: NaiveDateTime,
) -> Vec<BoardReport> {
    let all_boards = match boards.boards() {
        Ok(listed) => listed,
        Err(error) => {
            tracing::warn!(%error, "failed to list boards");
            return Vec::new();
        }
    };

    let selected: Vec<Board> = if board_ids.is_empty() {
        all_boards
    } else {
        board_ids
            .iter()
            .map(|id| {
                all_boards
                    .iter()
                    .find(|b| b.id == *id)
                    .cloned()
                    .unwrap_or_else(|| Board {
                        id: *id,
                        name: format!("Board {id}"),
                        board_type: String::new(),
                    })
            })
            .collect()
    };

    let mut reports = Vec::new();
    for board in selected {
        match board_report(issues, boards, &board, statuses, now) {
            Ok(report) => reports.push(report),
            Err(error) => {
                tracing::warn!(board_id = board.id, board = %board.name, %error, "skipping board");
            }
        }
    }
    reports
}

fn board_report(
    issues: &dyn IssueSource,
    boards: &dyn BoardSource,
    board: &Board,
    statuses: &StatusClassifier,
    now: NaiveDateTime,
) -> Result<BoardReport, CoreError> {
    let info = boards.active_sprint(board.id)?;
    let sprint_issues = issues.search(&sprint_issues_jql(info.id), SEARCH_MAX_RESULTS)?;
    let snapshot = SprintSnapshot::from_issues(&info, &board.name, sprint_issues, statuses, now);
    Ok(BoardReport {
        board: board.clone(),
        snapshot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::issue::Issue;
    use crate::source::SprintInfo;
    use chrono::NaiveDate;

    fn classifier() -> StatusClassifier {
        StatusClassifier::new(
            vec!["Open".into()],
            vec!["In Progress".into()],
            vec!["Done".into()],
        )
        .unwrap()
    }

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 6, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    struct StaticIssues(Vec<Issue>);

    impl IssueSource for StaticIssues {
        fn search(&self, _jql: &str, _max: u32) -> Result<Vec<Issue>, SourceError> {
            Ok(self.0.clone())
        }
    }

    /// Boards 1 and 2 exist; board 2's sprint lookup always fails.
    struct FlakyBoards;

    impl BoardSource for FlakyBoards {
        fn boards(&self) -> Result<Vec<Board>, SourceError> {
            Ok(vec![
                Board {
                    id: 1,
                    name: "Alpha".into(),
                    board_type: "scrum".into(),
                },
                Board {
                    id: 2,
                    name: "Beta".into(),
                    board_type: "scrum".into(),
                },
            ])
        }

        fn active_sprint(&self, board_id: u64) -> Result<SprintInfo, SourceError> {
            if board_id == 2 {
                return Err(SourceError::NoActiveSprint { board_id });
            }
            Ok(SprintInfo {
                id: 77,
                name: "Sprint 7".into(),
                start_date: ts(1),
                end_date: ts(12),
                board_id: Some(board_id),
                goal: None,
            })
        }
    }

    #[test]
    fn failing_board_does_not_abort_the_rest() {
        let issues = StaticIssues(vec![Issue {
            key: "AB-1".into(),
            status: "Open".into(),
            story_points: Some(3.0),
            ..Issue::default()
        }]);
        let reports = monitor_boards(&issues, &FlakyBoards, &[], &classifier(), ts(3));
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].board.name, "Alpha");
        assert_eq!(reports[0].snapshot.open_sp, 3.0);
    }

    #[test]
    fn explicit_board_selection_is_honored() {
        let issues = StaticIssues(Vec::new());
        let reports = monitor_boards(&issues, &FlakyBoards, &[1], &classifier(), ts(3));
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].board.id, 1);

        let none = monitor_boards(&issues, &FlakyBoards, &[2], &classifier(), ts(3));
        assert!(none.is_empty());
    }
}
