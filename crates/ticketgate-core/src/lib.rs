//! TicketGate Core - pull request / ticket validation gate
//!
//! Decides whether a pull request may proceed by checking its branch name and
//! title against an issue tracker ticket:
//! - Extracts the ticket id from the head branch
//! - Runs an ordered, short-circuiting rule chain over the title and ticket
//! - Applies release readiness rules to `release*` and `hotfix*` targets
//! - Reports a single boolean `validation` flag to the CI host

pub mod domain;
pub mod extractor;
pub mod fakes;
pub mod gate;
pub mod obs;
pub mod outcome;
pub mod providers;
pub mod reporter;
pub mod rules;
pub mod telemetry;

pub use domain::{
    FixVersion, GateError, PullRequest, RepoRef, Result, Ticket, TicketId, TransportError,
};
pub use extractor::{extract_ticket_id, find_ticket_id, PROJECT_KEYS};
pub use gate::{GateConfig, GateContext, TicketGate, DEFAULT_CALL_TIMEOUT};
pub use outcome::{format_multiline, ValidationOutcome, Violation, ViolationKind};
pub use providers::{IssueTracker, PullRequestProvider};
pub use reporter::{
    report, report_aborted, GithubOutputReporter, MemoryReporter, OutcomeReporter,
};
pub use rules::{evaluate_phase, RulePhase, RuleInput, RuleSet, RuleSubject, TicketRule};
pub use telemetry::init_tracing;
