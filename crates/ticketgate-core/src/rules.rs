//! Ticket gate rules engine.
//!
//! A [`RuleSet`] is an ordered list of [`TicketRule`]s. Each rule is plain
//! data: the phrase, accepted values, or branch prefixes it checks against
//! live on the variant, so rules can be tested alone and appended without
//! touching the orchestrator. Rules belong to one of two phases: local rules
//! only need the pull request title, remote rules need the fetched ticket.
//! Evaluation stops at the first violation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::{Ticket, TicketId};
use crate::outcome::{Violation, ViolationKind};

/// Marker that blocks a merge when present in the PR title.
pub const MERGE_BLOCK_MARKER: &str = "do not merge";

/// Issue types a pull request may be filed against.
pub const ACCEPTED_ISSUE_TYPES: &[&str] = &[
    "A360",
    "Bug",
    "DPBug",
    "QA Bug",
    "Story",
    "[System] Incident",
    "Task",
    "Sub-task",
];

/// Status a ticket must reach before it may ship on a release branch.
pub const READY_FOR_DEPLOYMENT: &str = "Ready For Deployment";

/// Base branch prefixes that mark a production-bound merge.
pub const RELEASE_BRANCH_PREFIXES: &[&str] = &["release", "hotfix"];

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// When a rule can be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePhase {
    /// Needs only the pull request and the extracted ticket id.
    Local,
    /// Needs the ticket fetched from the tracker.
    Remote,
}

/// A single gate rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TicketRule {
    /// The title must contain the ticket id verbatim.
    TitleContainsTicket,
    /// The title must not contain `marker`, compared case-insensitively.
    NoMergeBlock { marker: String },
    /// The issue type must match one of `accepted`, case-insensitively.
    AcceptedIssueType { accepted: Vec<String> },
    /// On matching base branches, the status must equal `required_status`.
    ReleaseReadiness {
        required_status: String,
        branch_prefixes: Vec<String>,
    },
    /// On matching base branches, some fix version must still be usable.
    FixVersionAssigned { branch_prefixes: Vec<String> },
}

impl TicketRule {
    pub fn phase(&self) -> RulePhase {
        match self {
            TicketRule::TitleContainsTicket | TicketRule::NoMergeBlock { .. } => RulePhase::Local,
            TicketRule::AcceptedIssueType { .. }
            | TicketRule::ReleaseReadiness { .. }
            | TicketRule::FixVersionAssigned { .. } => RulePhase::Remote,
        }
    }

    /// Whether the rule runs at all for a PR targeting `base_branch`.
    ///
    /// Rules that do not apply are skipped, not downgraded.
    pub fn applies_to(&self, base_branch: &str) -> bool {
        match self {
            TicketRule::ReleaseReadiness {
                branch_prefixes, ..
            }
            | TicketRule::FixVersionAssigned { branch_prefixes } => branch_prefixes
                .iter()
                .any(|prefix| base_branch.starts_with(prefix.as_str())),
            _ => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TicketRule::TitleContainsTicket => "title_contains_ticket",
            TicketRule::NoMergeBlock { .. } => "no_merge_block",
            TicketRule::AcceptedIssueType { .. } => "accepted_issue_type",
            TicketRule::ReleaseReadiness { .. } => "release_readiness",
            TicketRule::FixVersionAssigned { .. } => "fix_version_assigned",
        }
    }
}

/// Ordered rule list. Order is evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<TicketRule>,
}

impl RuleSet {
    /// The five standard rules, in order.
    pub fn standard() -> Self {
        let release_prefixes: Vec<String> = RELEASE_BRANCH_PREFIXES
            .iter()
            .map(|p| p.to_string())
            .collect();
        Self {
            rules: vec![
                TicketRule::TitleContainsTicket,
                TicketRule::NoMergeBlock {
                    marker: MERGE_BLOCK_MARKER.to_string(),
                },
                TicketRule::AcceptedIssueType {
                    accepted: ACCEPTED_ISSUE_TYPES.iter().map(|t| t.to_string()).collect(),
                },
                TicketRule::ReleaseReadiness {
                    required_status: READY_FOR_DEPLOYMENT.to_string(),
                    branch_prefixes: release_prefixes.clone(),
                },
                TicketRule::FixVersionAssigned {
                    branch_prefixes: release_prefixes,
                },
            ],
        }
    }

    /// Append a rule.
    pub fn with_rule(mut self, rule: TicketRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rules of one phase, in order.
    pub fn phase(&self, phase: RulePhase) -> impl Iterator<Item = &TicketRule> {
        self.rules.iter().filter(move |rule| rule.phase() == phase)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// What a phase is evaluated against.
#[derive(Debug, Clone, Copy)]
pub enum RuleSubject<'a> {
    Title(&'a str),
    Ticket {
        ticket: &'a Ticket,
        /// Date fix versions are compared against.
        reference_date: NaiveDate,
    },
}

impl RuleSubject<'_> {
    pub fn phase(&self) -> RulePhase {
        match self {
            RuleSubject::Title(_) => RulePhase::Local,
            RuleSubject::Ticket { .. } => RulePhase::Remote,
        }
    }
}

/// Input for one evaluation phase.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub ticket_id: &'a TicketId,
    pub base_branch: &'a str,
    pub subject: RuleSubject<'a>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Run every applicable rule of the input's phase, stopping at the first violation.
pub fn evaluate_phase(rule_set: &RuleSet, input: &RuleInput<'_>) -> Result<(), Violation> {
    let phase = input.subject.phase();
    for rule in rule_set.phase(phase) {
        if !rule.applies_to(input.base_branch) {
            debug!(rule = rule.name(), base_branch = %input.base_branch, "rule skipped");
            continue;
        }
        if let Some(violation) = check_rule(rule, input) {
            return Err(violation);
        }
        debug!(rule = rule.name(), "rule passed");
    }
    Ok(())
}

fn check_rule(rule: &TicketRule, input: &RuleInput<'_>) -> Option<Violation> {
    match (rule, input.subject) {
        (TicketRule::TitleContainsTicket, RuleSubject::Title(title)) => {
            if title.contains(input.ticket_id.as_str()) {
                None
            } else {
                Some(Violation::new(
                    ViolationKind::TitleTicketMismatch,
                    &format!(
                        "The title message
                        \"{title}\"
                        must include an existing JIRA ticket ID.
                        Rename the Pull Request title to reference the relevant ticket.
                        "
                    ),
                ))
            }
        }

        (TicketRule::NoMergeBlock { marker }, RuleSubject::Title(title)) => {
            if title.to_lowercase().contains(&marker.to_lowercase()) {
                Some(Violation::new(
                    ViolationKind::MergeBlocked,
                    &format!(
                        "The title message
                        \"{title}\"
                        instructs this Pull Request should not be merged. Remove \"{}\"
                        text from title before proceeding.
                        ",
                        marker.to_uppercase()
                    ),
                ))
            } else {
                None
            }
        }

        (TicketRule::AcceptedIssueType { accepted }, RuleSubject::Ticket { ticket, .. }) => {
            if accepted
                .iter()
                .any(|t| t.to_lowercase() == ticket.issue_type.to_lowercase())
            {
                None
            } else {
                Some(Violation::new(
                    ViolationKind::IssueTypeRejected,
                    &format!(
                        "The issue type for {}
                        is \"{}\". The accepted issue types are:
                        {}
                        ",
                        input.ticket_id,
                        ticket.issue_type,
                        accepted.join("\n")
                    ),
                ))
            }
        }

        (
            TicketRule::ReleaseReadiness {
                required_status, ..
            },
            RuleSubject::Ticket { ticket, .. },
        ) => {
            if ticket.status.to_lowercase() == required_status.to_lowercase() {
                None
            } else {
                Some(Violation::new(
                    ViolationKind::StatusNotReady,
                    &format!(
                        "The ticket {} has status \"{}\".
                        Please move to \"{}\" and try again.
                        ",
                        input.ticket_id, ticket.status, required_status
                    ),
                ))
            }
        }

        (
            TicketRule::FixVersionAssigned { .. },
            RuleSubject::Ticket {
                ticket,
                reference_date,
            },
        ) => {
            if ticket
                .fix_versions
                .iter()
                .any(|fv| fv.qualifies(reference_date))
            {
                None
            } else {
                Some(Violation::new(
                    ViolationKind::NoValidFixVersion,
                    &format!(
                        "The ticket {} hasn't been assigned a valid fixVersion.
                        Please assign under Release Checklist tab and try again. It could also be the case
                        that the assigned fix versions do not have an assigned release date. Please check
                        with DigiOps team to confirm.
                        ",
                        input.ticket_id
                    ),
                ))
            }
        }

        (
            TicketRule::TitleContainsTicket | TicketRule::NoMergeBlock { .. },
            RuleSubject::Ticket { .. },
        )
        | (
            TicketRule::AcceptedIssueType { .. }
            | TicketRule::ReleaseReadiness { .. }
            | TicketRule::FixVersionAssigned { .. },
            RuleSubject::Title(_),
        ) => {
            error!(
                rule = rule.name(),
                rule_phase = ?rule.phase(),
                subject_phase = ?input.subject.phase(),
                "rule evaluated against the wrong phase"
            );
            debug_assert!(
                false,
                "rule {} evaluated against a {:?} subject",
                rule.name(),
                input.subject.phase()
            );
            None
        }
    }
}
