//! Structured log events for the gate lifecycle.
//!
//! Every event carries an `event` field so log pipelines can filter on it.

use tracing::{info, warn};

use crate::outcome::{ValidationOutcome, Violation};

/// Emit event: a gate run started for a pull request.
pub fn emit_gate_started(pr_number: u64) {
    info!(event = "gate.started", pr_number = pr_number);
}

/// Emit event: the PR context was refreshed from the VCS provider.
pub fn emit_context_refreshed(head_branch: &str, base_branch: &str) {
    info!(
        event = "gate.context_refreshed",
        head_branch = %head_branch,
        base_branch = %base_branch,
    );
}

/// Emit event: a ticket was fetched from the tracker.
pub fn emit_ticket_fetched(ticket_id: &str, issue_type: &str, status: &str) {
    info!(
        event = "gate.ticket_fetched",
        ticket_id = %ticket_id,
        issue_type = %issue_type,
        status = %status,
    );
}

/// Emit event: a rule rejected the pull request.
pub fn emit_rule_failed(violation: &Violation) {
    warn!(event = "gate.rule_failed", kind = %violation.kind);
}

/// Emit event: a remote call failed (warning level).
pub fn emit_transport_failed(service: &str, error: &dyn std::fmt::Display) {
    warn!(event = "gate.transport_failed", service = %service, error = %error);
}

/// Emit event: the gate reached a verdict.
pub fn emit_gate_finished(outcome: &ValidationOutcome) {
    info!(
        event = "gate.finished",
        passed = outcome.passed,
        kind = outcome.violation_kind().map(|k| k.as_str()).unwrap_or("none"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ViolationKind;

    #[test]
    fn test_emitters_do_not_panic_without_subscriber() {
        let violation = Violation::new(ViolationKind::StatusNotReady, "not ready");
        emit_gate_started(1);
        emit_context_refreshed("feature/DPBUG-1", "main");
        emit_ticket_fetched("DPBUG-1", "Bug", "Open");
        emit_rule_failed(&violation);
        emit_transport_failed("jira", &"connection reset");
        emit_gate_finished(&ValidationOutcome::fail(violation));
    }
}
