//! Jira REST adapter.
//!
//! A blocking HTTP client implementing [`IssueSource`] and [`BoardSource`]
//! against the Jira server REST API. Raw payloads are decoded into private
//! serde DTOs mirroring the wire shape, then flattened into the core's
//! [`Issue`] snapshots; the rest of the crate never sees tracker JSON.

use base64::Engine as _;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use url::Url;

use crate::error::SourceError;
use crate::issue::{
    parse_date, parse_timestamp, Issue, IssueLink, LinkDirection, StatusTransition,
    TransitionField,
};
use crate::source::{Board, BoardSource, IssueSource, SprintInfo};

/// Basic-auth Jira REST client.
pub struct JiraClient {
    base_url: String,
    client: Client,
}

impl JiraClient {
    pub fn new(base_url: &str, user: &str, token: &str) -> Result<Self, SourceError> {
        Url::parse(base_url).map_err(|_| SourceError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;
        let credentials =
            base64::engine::general_purpose::STANDARD.encode(format!("{user}:{token}"));
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Basic {credentials}")).map_err(|_| {
            SourceError::InvalidBaseUrl {
                url: base_url.to_string(),
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        let client = Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self.client.get(url).query(query).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Api {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(response.json()?)
    }
}

impl IssueSource for JiraClient {
    fn search(&self, jql: &str, max_results: u32) -> Result<Vec<Issue>, SourceError> {
        let response: SearchResponse = self.get(
            "rest/api/2/search",
            &[
                ("jql", jql.to_string()),
                ("expand", "changelog".to_string()),
                ("maxResults", max_results.to_string()),
            ],
        )?;
        response.issues.into_iter().map(RawIssue::into_issue).collect()
    }
}

impl BoardSource for JiraClient {
    fn boards(&self) -> Result<Vec<Board>, SourceError> {
        let response: PagedValues<RawBoard> = self.get(
            "rest/agile/1.0/board",
            &[
                ("type", "scrum".to_string()),
                ("maxResults", "1000".to_string()),
            ],
        )?;
        Ok(response
            .values
            .into_iter()
            .map(|raw| Board {
                id: raw.id,
                name: raw.name,
                board_type: raw.board_type,
            })
            .collect())
    }

    fn active_sprint(&self, board_id: u64) -> Result<SprintInfo, SourceError> {
        let response: PagedValues<RawSprint> = self.get(
            &format!("rest/agile/1.0/board/{board_id}/sprint"),
            &[
                ("state", "active".to_string()),
                ("maxResults", "50".to_string()),
            ],
        )?;
        let raw = response
            .values
            .into_iter()
            .next()
            .ok_or(SourceError::NoActiveSprint { board_id })?;
        raw.into_info()
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<RawIssue>,
}

#[derive(Deserialize)]
struct PagedValues<T> {
    #[serde(default = "Vec::new")]
    values: Vec<T>,
}

#[derive(Deserialize)]
struct RawBoard {
    id: u64,
    name: String,
    #[serde(rename = "type", default)]
    board_type: String,
}

#[derive(Deserialize)]
struct RawSprint {
    id: u64,
    name: String,
    #[serde(rename = "startDate")]
    start_date: Option<String>,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
    #[serde(rename = "originBoardId", default)]
    origin_board_id: Option<u64>,
    #[serde(default)]
    goal: Option<String>,
}

impl RawSprint {
    fn into_info(self) -> Result<SprintInfo, SourceError> {
        let start = self
            .start_date
            .ok_or(SourceError::MissingField { field: "startDate" })?;
        let end = self
            .end_date
            .ok_or(SourceError::MissingField { field: "endDate" })?;
        Ok(SprintInfo {
            id: self.id,
            name: self.name,
            start_date: parse_timestamp(&start)?,
            end_date: parse_timestamp(&end)?,
            board_id: self.origin_board_id,
            goal: self.goal,
        })
    }
}

#[derive(Deserialize)]
struct RawIssue {
    key: String,
    id: String,
    fields: RawFields,
    #[serde(default)]
    changelog: Option<RawChangelog>,
}

#[derive(Deserialize)]
struct RawFields {
    status: RawStatus,
    #[serde(default)]
    assignee: Option<RawUser>,
    /// Story points live in a tracker-configured custom field.
    #[serde(rename = "customfield_10002", default)]
    story_points: Option<f64>,
    #[serde(default)]
    aggregatetimeoriginalestimate: Option<i64>,
    issuetype: RawNamed,
    project: RawProject,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    duedate: Option<String>,
    #[serde(default)]
    resolutiondate: Option<String>,
    #[serde(default)]
    subtasks: Vec<RawKeyed>,
    #[serde(default)]
    issuelinks: Vec<RawIssueLink>,
}

#[derive(Deserialize)]
struct RawStatus {
    name: String,
    #[serde(rename = "statusCategory", default)]
    status_category: Option<RawNamed>,
}

#[derive(Deserialize)]
struct RawNamed {
    name: String,
}

#[derive(Deserialize)]
struct RawUser {
    name: String,
}

#[derive(Deserialize)]
struct RawProject {
    key: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct RawKeyed {
    key: String,
}

#[derive(Deserialize)]
struct RawIssueLink {
    #[serde(rename = "type")]
    link_type: RawLinkType,
    #[serde(rename = "inwardIssue", default)]
    inward_issue: Option<RawKeyed>,
    #[serde(rename = "outwardIssue", default)]
    outward_issue: Option<RawKeyed>,
}

#[derive(Deserialize)]
struct RawLinkType {
    inward: String,
    outward: String,
}

#[derive(Deserialize)]
struct RawChangelog {
    #[serde(default)]
    histories: Vec<RawHistory>,
}

#[derive(Deserialize)]
struct RawHistory {
    created: String,
    #[serde(default)]
    items: Vec<RawHistoryItem>,
}

#[derive(Deserialize)]
struct RawHistoryItem {
    field: String,
    #[serde(rename = "fromString", default)]
    from_name: Option<String>,
    #[serde(rename = "toString", default)]
    to_name: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
}

impl RawIssue {
    fn into_issue(self) -> Result<Issue, SourceError> {
        let fields = self.fields;
        let mut links = Vec::new();
        for link in fields.issuelinks {
            if let Some(inward) = link.inward_issue {
                links.push(IssueLink {
                    label: link.link_type.inward.clone(),
                    direction: LinkDirection::Inward,
                    key: inward.key,
                });
            }
            if let Some(outward) = link.outward_issue {
                links.push(IssueLink {
                    label: link.link_type.outward.clone(),
                    direction: LinkDirection::Outward,
                    key: outward.key,
                });
            }
        }
        Ok(Issue {
            key: self.key,
            id: self.id,
            status: fields.status.name,
            status_category: fields
                .status
                .status_category
                .map(|c| c.name)
                .unwrap_or_default(),
            assignee: fields.assignee.map(|user| user.name),
            story_points: fields.story_points,
            original_estimate_seconds: fields.aggregatetimeoriginalestimate,
            issue_type: fields.issuetype.name,
            project_key: fields.project.key,
            project_name: fields.project.name,
            summary: fields.summary,
            description: fields.description,
            due_date: fields.duedate.as_deref().map(parse_date).transpose()?,
            resolution_date: fields
                .resolutiondate
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            subtask_keys: fields.subtasks.into_iter().map(|s| s.key).collect(),
            links,
            transitions: self
                .changelog
                .map(flatten_changelog)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

/// Flatten changelog histories into a chronological transition list.
///
/// Assignee items of a history are emitted before its status items: an
/// assignee change recorded together with a status change must be visible
/// to the assignee replay at that status boundary.
fn flatten_changelog(changelog: RawChangelog) -> Result<Vec<StatusTransition>, SourceError> {
    let mut transitions = Vec::new();
    for history in changelog.histories {
        let at = parse_timestamp(&history.created)?;
        for item in history.items.iter().filter(|i| i.field == "assignee") {
            transitions.push(StatusTransition {
                at,
                field: TransitionField::Assignee,
                from: item.from.clone(),
                to: item.to.clone(),
            });
        }
        for item in history.items.iter().filter(|i| i.field == "status") {
            transitions.push(StatusTransition {
                at,
                field: TransitionField::Status,
                from: item.from_name.clone(),
                to: item.to_name.clone(),
            });
        }
    }
    Ok(transitions)
}
