//! # Sprintsight Core Library
//!
//! Delivery analytics over issue-tracker history: this library reconstructs
//! "active work" intervals from status changelogs, turns historical
//! throughput into per-employee velocity statistics and remaining-effort
//! forecasts, computes earned-value figures, and runs a declarative health
//! rule table over sprint snapshots. The CLI binary is a thin wiring layer
//! over this crate.
//!
//! ## Architecture
//!
//! - **Calendar**: weekday-only business-day arithmetic; UTC-naive throughout
//! - **Interval**: status classification and single-scan interval extraction
//! - **Facts**: derived, read-only attributes over immutable issue snapshots
//! - **Capacity**: memoized per-project velocity statistics and forecasts
//! - **EVM**: stateless earned-value formulas
//! - **Sprint**: snapshot aggregation plus the ordered nine-rule health table
//! - **Report**: column registry and CSV output
//! - **Source**: collaborator traits and the Jira REST adapter
//!
//! ## Key Components
//!
//! - [`StatusClassifier`]: the Open/InProgress/Closed partition
//! - [`IssueFacts`]: temporal and business attributes of one issue
//! - [`CapacityEngine`]: velocity statistics, computed once per project
//! - [`SprintSnapshot`]: sprint aggregates and fired alerts

pub mod calendar;
pub mod capacity;
pub mod config;
pub mod error;
pub mod evm;
pub mod facts;
pub mod interval;
pub mod issue;
pub mod monitor;
pub mod report;
pub mod source;
pub mod sprint;

pub use capacity::{CapacityConfig, CapacityEngine, DerivedFacts, EmployeeVelocityStat, ProjectStats};
pub use config::AnalysisConfig;
pub use error::{ConfigError, CoreError, ReportError, Result, SourceError};
pub use facts::IssueFacts;
pub use interval::{DateRange, StatusClass, StatusClassifier, WorkInterval};
pub use issue::{Issue, IssueLink, LinkDirection, StatusTransition, TransitionField};
pub use monitor::BoardReport;
pub use report::{Column, TaskRecord};
pub use source::{Board, BoardSource, IssueSource, SprintInfo};
pub use sprint::{Alert, Severity, SprintSnapshot};
