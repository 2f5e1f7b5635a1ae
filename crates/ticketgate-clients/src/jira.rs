//! Jira issue tracker provider
//!
//! Fetches issues from `<base>/rest/api/latest/issue/<id>` with HTTP Basic
//! authentication built from a user email and an API token.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use ticketgate_core::{FixVersion, IssueTracker, Ticket, TicketId, TransportError};
use tracing::{info, warn};

use crate::http::{build_client, decode, fetch_body};

const SERVICE: &str = "jira";

pub const JIRA_API_PATH: &str = "/rest/api/latest/issue/";

/// Jira connection settings.
#[derive(Clone)]
pub struct JiraConfig {
    /// Instance root, e.g. `https://company.atlassian.net`
    pub base_url: String,
    pub user_email: String,
    pub api_token: String,
}

impl JiraConfig {
    /// A base URL given without a scheme is assumed to be `https://`.
    pub fn new(base_url: &str, user_email: &str, api_token: &str) -> Self {
        JiraConfig {
            base_url: normalize_base_url(base_url),
            user_email: user_email.to_string(),
            api_token: api_token.to_string(),
        }
    }

    pub fn issue_url(&self, id: &TicketId) -> String {
        format!("{}{}{}", self.base_url, JIRA_API_PATH, id)
    }
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("user_email", &self.user_email)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Jira REST client.
pub struct JiraClient {
    config: JiraConfig,
    http_client: reqwest::Client,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self, TransportError> {
        Ok(JiraClient {
            config,
            http_client: build_client(SERVICE)?,
        })
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn get_ticket(&self, id: &TicketId) -> Result<Ticket, TransportError> {
        let url = self.config.issue_url(id);
        info!("Fetching Jira issue {}", id);

        let request = self
            .http_client
            .get(&url)
            .basic_auth(&self.config.user_email, Some(&self.config.api_token))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        let body = fetch_body(SERVICE, id.as_str(), request).await?;
        decode_issue(id, &body)
    }
}

#[derive(Deserialize)]
struct IssuePayload {
    fields: IssueFields,
}

#[derive(Deserialize)]
struct IssueFields {
    issuetype: Option<NamedField>,
    status: Option<NamedField>,
    created: Option<String>,
    #[serde(rename = "fixVersions", default)]
    fix_versions: Option<Vec<FixVersionPayload>>,
}

#[derive(Deserialize)]
struct NamedField {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct FixVersionPayload {
    #[serde(rename = "releaseDate")]
    release_date: Option<String>,
    #[serde(default)]
    released: bool,
}

/// Decode an issue response body into a [`Ticket`] carrying `id`.
pub fn decode_issue(id: &TicketId, body: &str) -> Result<Ticket, TransportError> {
    let payload: IssuePayload = decode(SERVICE, body)?;
    let fields = payload.fields;

    let fix_versions = fields
        .fix_versions
        .unwrap_or_default()
        .into_iter()
        .map(|fv| FixVersion {
            release_date: fv.release_date.as_deref().and_then(parse_date_prefix),
            released: fv.released,
        })
        .collect();

    Ok(Ticket {
        id: id.clone(),
        issue_type: fields.issuetype.map(|f| f.name).unwrap_or_default(),
        status: fields.status.map(|f| f.name).unwrap_or_default(),
        created: fields.created.as_deref().and_then(parse_date_prefix),
        fix_versions,
    })
}

/// `2024-03-01T10:00:00.000-0700` and `2024-03-01` both yield 2024-03-01.
fn parse_date_prefix(raw: &str) -> Option<NaiveDate> {
    let date = raw.split('T').next().unwrap_or(raw).trim();
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(err) => {
            warn!("Ignoring unparseable Jira date {:?}: {}", raw, err);
            None
        }
    }
}
