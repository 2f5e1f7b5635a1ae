//! Remote collaborator traits.
//!
//! - `PullRequestProvider`: current PR metadata from the VCS host
//! - `IssueTracker`: ticket lookup by id
//!
//! HTTP implementations live in `ticketgate-clients`; in-memory fakes for
//! testing are in the `fakes` module.

use async_trait::async_trait;

use crate::domain::{PullRequest, RepoRef, Ticket, TicketId, TransportError};

/// Source of pull request metadata.
#[async_trait]
pub trait PullRequestProvider: Send + Sync {
    /// Fetch the current state of pull request `number` in `repo`.
    async fn get_pull_request(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<PullRequest, TransportError>;
}

/// Source of ticket data.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch ticket `id`. The returned ticket carries `id` unchanged.
    async fn get_ticket(&self, id: &TicketId) -> Result<Ticket, TransportError>;
}
