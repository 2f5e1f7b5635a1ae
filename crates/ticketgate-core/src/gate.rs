//! Gate orchestration.
//!
//! A run is a straight pipeline over an explicit context value:
//!
//! ```text
//! refresh PR ─▶ extract ticket id ─▶ local rules ─▶ fetch ticket ─▶ remote rules
//! ```
//!
//! Each stage returns its result; the first violation ends the run before any
//! further network call is made. Both network calls are bounded by
//! [`GateConfig::call_timeout`] and never retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::Instrument;

use crate::domain::{GateError, PullRequest, RepoRef, Result, Ticket, TicketId, TransportError};
use crate::extractor::extract_ticket_id;
use crate::obs;
use crate::outcome::{ValidationOutcome, Violation};
use crate::providers::{IssueTracker, PullRequestProvider};
use crate::rules::{evaluate_phase, RuleInput, RuleSet, RuleSubject};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Static configuration for a gate.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub call_timeout: Duration,
    pub rule_set: RuleSet,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            rule_set: RuleSet::standard(),
        }
    }
}

impl GateConfig {
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_rule_set(mut self, rule_set: RuleSet) -> Self {
        self.rule_set = rule_set;
        self
    }
}

/// Context that survived the local phase.
#[derive(Debug, Clone)]
pub struct GateContext {
    pub pull_request: PullRequest,
    pub ticket_id: TicketId,
}

/// The validation gate, wired to its remote collaborators.
///
/// The pull request provider is only needed by [`TicketGate::run`]; direct
/// ticket checks work with the tracker alone.
pub struct TicketGate {
    pulls: Option<Arc<dyn PullRequestProvider>>,
    tracker: Arc<dyn IssueTracker>,
    config: GateConfig,
}

impl TicketGate {
    pub fn new(tracker: Arc<dyn IssueTracker>, config: GateConfig) -> Self {
        Self {
            pulls: None,
            tracker,
            config,
        }
    }

    pub fn with_pull_requests(mut self, pulls: Arc<dyn PullRequestProvider>) -> Self {
        self.pulls = Some(pulls);
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Validate pull request `pr_number` of `repo` end to end.
    ///
    /// Rule failures come back as a failed [`ValidationOutcome`]; transport
    /// failures are reported as [`GateError::ContextRefreshFailed`].
    pub async fn run(&self, repo: &RepoRef, pr_number: u64) -> Result<ValidationOutcome> {
        let pulls = self.pulls.as_ref().ok_or_else(|| {
            GateError::Config("pull request validation needs a pull request provider".to_string())
        })?;
        let span = tracing::info_span!("gate.run", repo = %repo, pr_number = pr_number);
        async move {
            obs::emit_gate_started(pr_number);
            let refresh_failed = |source: TransportError| GateError::ContextRefreshFailed {
                pr_number,
                source,
            };

            let pull_request = self
                .bounded("github", pulls.get_pull_request(repo, pr_number))
                .await
                .map_err(refresh_failed)?;
            obs::emit_context_refreshed(&pull_request.head_branch, &pull_request.base_branch);

            let context = match self.validate_local(pull_request) {
                Ok(context) => context,
                Err(violation) => return Ok(self.finish_failed(violation)),
            };

            let ticket = self
                .fetch_ticket(&context.ticket_id)
                .await
                .map_err(refresh_failed)?;

            let outcome = self.validate_remote(
                &context.ticket_id,
                &ticket,
                &context.pull_request.base_branch,
                context.pull_request.created_on(),
            );
            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    /// Check ticket `ticket_id` directly against the remote rules for a PR
    /// targeting `base_branch`.
    ///
    /// With no PR in play, fix versions are compared against the ticket's own
    /// creation date, falling back to today when the tracker omits it.
    pub async fn check_ticket(
        &self,
        ticket_id: &str,
        base_branch: &str,
    ) -> Result<ValidationOutcome> {
        let ticket_id = TicketId::new(ticket_id);
        let span = tracing::info_span!("gate.check_ticket", ticket_id = %ticket_id);
        async move {
            let ticket = self.fetch_ticket(&ticket_id).await.map_err(|source| {
                GateError::TicketFetchFailed {
                    ticket_id: ticket_id.to_string(),
                    source,
                }
            })?;
            let reference_date = ticket.created.unwrap_or_else(|| Utc::now().date_naive());
            Ok(self.validate_remote(&ticket_id, &ticket, base_branch, reference_date))
        }
        .instrument(span)
        .await
    }

    /// Extract the ticket id from the head branch and run the local rules.
    pub fn validate_local(
        &self,
        pull_request: PullRequest,
    ) -> std::result::Result<GateContext, Violation> {
        let ticket_id = extract_ticket_id(&pull_request.head_branch)?;
        evaluate_phase(
            &self.config.rule_set,
            &RuleInput {
                ticket_id: &ticket_id,
                base_branch: &pull_request.base_branch,
                subject: RuleSubject::Title(&pull_request.title),
            },
        )?;
        Ok(GateContext {
            pull_request,
            ticket_id,
        })
    }

    /// Run the remote rules and produce the final outcome.
    pub fn validate_remote(
        &self,
        ticket_id: &TicketId,
        ticket: &Ticket,
        base_branch: &str,
        reference_date: NaiveDate,
    ) -> ValidationOutcome {
        let verdict = evaluate_phase(
            &self.config.rule_set,
            &RuleInput {
                ticket_id,
                base_branch,
                subject: RuleSubject::Ticket {
                    ticket,
                    reference_date,
                },
            },
        );
        match verdict {
            Ok(()) => {
                let outcome = ValidationOutcome::pass();
                obs::emit_gate_finished(&outcome);
                outcome
            }
            Err(violation) => self.finish_failed(violation),
        }
    }

    fn finish_failed(&self, violation: Violation) -> ValidationOutcome {
        obs::emit_rule_failed(&violation);
        let outcome = ValidationOutcome::fail(violation);
        obs::emit_gate_finished(&outcome);
        outcome
    }

    async fn fetch_ticket(&self, id: &TicketId) -> std::result::Result<Ticket, TransportError> {
        let ticket = self.bounded("jira", self.tracker.get_ticket(id)).await?;
        obs::emit_ticket_fetched(id.as_str(), &ticket.issue_type, &ticket.status);
        Ok(ticket)
    }

    async fn bounded<T, F>(
        &self,
        service: &'static str,
        call: F,
    ) -> std::result::Result<T, TransportError>
    where
        F: Future<Output = std::result::Result<T, TransportError>>,
    {
        let result = match tokio::time::timeout(self.config.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(timeout_error(service, self.config.call_timeout)),
        };
        if let Err(err) = &result {
            obs::emit_transport_failed(service, err);
        }
        result
    }
}

/// Millisecond counts past `u64::MAX` saturate.
fn timeout_error(service: &'static str, timeout: Duration) -> TransportError {
    TransportError::Timeout {
        service,
        timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_error_reports_millis() {
        let err = timeout_error("jira", Duration::from_millis(1500));
        assert!(matches!(
            err,
            TransportError::Timeout {
                service: "jira",
                timeout_ms: 1500
            }
        ));
    }

    #[test]
    fn test_timeout_error_saturates_huge_durations() {
        let err = timeout_error("github", Duration::MAX);
        assert!(matches!(
            err,
            TransportError::Timeout {
                timeout_ms: u64::MAX,
                ..
            }
        ));
    }
}
