//! Pull request snapshot and repository coordinates.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::GateError;

/// Immutable snapshot of a pull request as reported by the VCS provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub head_branch: String,
    pub base_branch: String,
    pub created_at: DateTime<Utc>,
}

impl PullRequest {
    /// Creation date with the time of day dropped.
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

/// `owner/repo` coordinates of the repository hosting the pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl FromStr for RepoRef {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(Self::new(owner, repo))
            }
            _ => Err(GateError::Config(format!(
                "repository must be given as owner/repo, got '{}'",
                s
            ))),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_repo_ref_parses_owner_and_repo() {
        let repo: RepoRef = "stevedores-org/storefront".parse().unwrap();
        assert_eq!(repo.owner, "stevedores-org");
        assert_eq!(repo.repo, "storefront");
        assert_eq!(repo.to_string(), "stevedores-org/storefront");
    }

    #[test]
    fn test_repo_ref_rejects_malformed() {
        for raw in ["", "storefront", "/storefront", "owner/", "a/b/c"] {
            assert!(raw.parse::<RepoRef>().is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_created_on_drops_time() {
        let pr = PullRequest {
            number: 7,
            title: "DPBUG-1 fix".to_string(),
            head_branch: "feature/DPBUG-1".to_string(),
            base_branch: "main".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap(),
        };
        assert_eq!(pr.created_on(), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }
}
