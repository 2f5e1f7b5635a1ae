//! In-memory fakes for the provider traits (testing only)
//!
//! `MemoryPullRequests` and `MemoryIssueTracker` answer from fixed maps,
//! count their calls, and can be told to stall so timeouts are observable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{PullRequest, RepoRef, Ticket, TicketId, TransportError};
use crate::providers::{IssueTracker, PullRequestProvider};

// ---------------------------------------------------------------------------
// MemoryPullRequests
// ---------------------------------------------------------------------------

/// Pull request provider backed by a `HashMap<number, PullRequest>`.
#[derive(Debug, Default)]
pub struct MemoryPullRequests {
    pulls: HashMap<u64, PullRequest>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MemoryPullRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pull_request(mut self, pr: PullRequest) -> Self {
        self.pulls.insert(pr.number, pr);
        self
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PullRequestProvider for MemoryPullRequests {
    async fn get_pull_request(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> Result<PullRequest, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.pulls
            .get(&number)
            .cloned()
            .ok_or_else(|| TransportError::NotFound {
                service: "github",
                resource: format!("{}#{}", repo, number),
            })
    }
}

// ---------------------------------------------------------------------------
// MemoryIssueTracker
// ---------------------------------------------------------------------------

/// Issue tracker backed by a `HashMap<ticket id, Ticket>`.
#[derive(Debug, Default)]
pub struct MemoryIssueTracker {
    tickets: HashMap<TicketId, Ticket>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MemoryIssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticket(mut self, ticket: Ticket) -> Self {
        self.tickets.insert(ticket.id.clone(), ticket);
        self
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IssueTracker for MemoryIssueTracker {
    async fn get_ticket(&self, id: &TicketId) -> Result<Ticket, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.tickets
            .get(id)
            .cloned()
            .ok_or_else(|| TransportError::NotFound {
                service: "jira",
                resource: id.to_string(),
            })
    }
}
