//! GitHub pull request provider
//!
//! Reads pull request metadata from the GitHub REST API using a bearer
//! token, the way the Actions runtime hands it to workflow steps.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use ticketgate_core::{PullRequest, PullRequestProvider, RepoRef, TransportError};
use tracing::info;

use crate::http::{build_client, decode, fetch_body};

const SERVICE: &str = "github";

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub connection settings.
#[derive(Clone)]
pub struct GithubConfig {
    /// REST API root, e.g. `https://api.github.com`
    pub api_url: String,
    /// Bearer token (`GITHUB_TOKEN`)
    pub token: String,
}

impl GithubConfig {
    pub fn new(token: &str) -> Self {
        GithubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn pull_request_url(&self, repo: &RepoRef, number: u64) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url, repo.owner, repo.repo, number
        )
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// GitHub REST client.
pub struct GithubClient {
    config: GithubConfig,
    http_client: reqwest::Client,
}

impl GithubClient {
    pub fn new(config: GithubConfig) -> Result<Self, TransportError> {
        Ok(GithubClient {
            config,
            http_client: build_client(SERVICE)?,
        })
    }
}

#[async_trait]
impl PullRequestProvider for GithubClient {
    async fn get_pull_request(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<PullRequest, TransportError> {
        let url = self.config.pull_request_url(repo, number);
        info!("Fetching pull request {}#{}", repo, number);

        let request = self
            .http_client
            .get(&url)
            .bearer_auth(&self.config.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        let body = fetch_body(SERVICE, &format!("{}#{}", repo, number), request).await?;
        decode_pull_request(&body)
    }
}

#[derive(Deserialize)]
struct PullRequestPayload {
    number: u64,
    title: String,
    head: BranchRef,
    base: BranchRef,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    name: String,
}

/// Decode a `GET /repos/{owner}/{repo}/pulls/{number}` response body.
pub fn decode_pull_request(body: &str) -> Result<PullRequest, TransportError> {
    let payload: PullRequestPayload = decode(SERVICE, body)?;
    Ok(PullRequest {
        number: payload.number,
        title: payload.title,
        head_branch: payload.head.name,
        base_branch: payload.base.name,
        created_at: payload.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PULL_FIXTURE: &str = r#"{
        "url": "https://api.github.com/repos/stevedores-org/storefront/pulls/318",
        "number": 318,
        "state": "open",
        "title": "DPBUG-1234 Fix cart rounding",
        "user": { "login": "octocat" },
        "created_at": "2024-03-01T22:15:09Z",
        "head": { "ref": "feature/DPBUG-1234-cart", "sha": "6dcb09b" },
        "base": { "ref": "release/2024.1", "sha": "e5bd391" }
    }"#;

    #[test]
    fn test_decode_pull_request() {
        let pr = decode_pull_request(PULL_FIXTURE).unwrap();
        assert_eq!(pr.number, 318);
        assert_eq!(pr.title, "DPBUG-1234 Fix cart rounding");
        assert_eq!(pr.head_branch, "feature/DPBUG-1234-cart");
        assert_eq!(pr.base_branch, "release/2024.1");
        assert_eq!(
            pr.created_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 22, 15, 9).unwrap()
        );
    }

    #[test]
    fn test_decode_rejects_missing_head() {
        let err = decode_pull_request(r#"{"number": 1, "title": "x"}"#).unwrap_err();
        assert!(matches!(err, TransportError::Decode { service: "github", .. }));
    }

    #[test]
    fn test_pull_request_url() {
        let config = GithubConfig::new("t").with_api_url("https://ghe.example.com/api/v3/");
        let url = config.pull_request_url(&RepoRef::new("org", "shop"), 12);
        assert_eq!(url, "https://ghe.example.com/api/v3/repos/org/shop/pulls/12");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = GithubConfig::new("ghp_secret");
        assert!(!format!("{config:?}").contains("ghp_secret"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let config = GithubConfig::new("t").with_api_url("http://127.0.0.1:9");
        let client = GithubClient::new(config).unwrap();
        let err = client
            .get_pull_request(&RepoRef::new("o", "r"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request { service: "github", .. }));
    }
}
