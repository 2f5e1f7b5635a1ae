//! TicketGate Clients: HTTP providers for the validation gate
//!
//! Implements the `ticketgate-core` provider traits over reqwest:
//! - [`GithubClient`] for pull request metadata
//! - [`JiraClient`] for ticket lookup
//!
//! Timeouts are applied by the gate around each call, not here.

mod http;

pub mod github;
pub mod jira;

pub use github::{decode_pull_request, GithubClient, GithubConfig, DEFAULT_API_URL};
pub use jira::{decode_issue, JiraClient, JiraConfig, JIRA_API_PATH};
