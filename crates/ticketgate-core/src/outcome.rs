//! Validation outcome and rule violation types.

use serde::{Deserialize, Serialize};

/// Which check rejected the pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    BranchTicketMissing,
    TitleTicketMismatch,
    MergeBlocked,
    IssueTypeRejected,
    StatusNotReady,
    NoValidFixVersion,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::BranchTicketMissing => "branch_ticket_missing",
            ViolationKind::TitleTicketMismatch => "title_ticket_mismatch",
            ViolationKind::MergeBlocked => "merge_blocked",
            ViolationKind::IssueTypeRejected => "issue_type_rejected",
            ViolationKind::StatusNotReady => "status_not_ready",
            ViolationKind::NoValidFixVersion => "no_valid_fix_version",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed rule together with its user-facing explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Multi-line message, already normalized by [`format_multiline`].
    pub message: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, message: &str) -> Self {
        Self {
            kind,
            message: format_multiline(message),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// The single result of one gate invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub passed: bool,
    pub failure_reason: Option<String>,
    pub violation: Option<Violation>,
}

impl ValidationOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            failure_reason: None,
            violation: None,
        }
    }

    pub fn fail(violation: Violation) -> Self {
        Self {
            passed: false,
            failure_reason: Some(violation.message.clone()),
            violation: Some(violation),
        }
    }

    pub fn violation_kind(&self) -> Option<ViolationKind> {
        self.violation.as_ref().map(|v| v.kind)
    }
}

/// Strip indentation from continuation lines, drop blank lines, and trim the end.
///
/// The first line keeps its leading whitespace.
pub fn format_multiline(text: &str) -> String {
    let mut lines = text.lines();
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        let line = line.trim_start();
        if line.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(line);
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_multiline_strips_indentation() {
        let raw = "The branch
            \"fix-something\"
            must include an existing JIRA ticket ID.
        ";
        assert_eq!(
            format_multiline(raw),
            "The branch\n\"fix-something\"\nmust include an existing JIRA ticket ID."
        );
    }

    #[test]
    fn test_format_multiline_drops_blank_lines() {
        assert_eq!(format_multiline("a\n\n   \n  b  \n"), "a\nb");
    }

    #[test]
    fn test_format_multiline_keeps_first_line_indent() {
        assert_eq!(format_multiline("  lead\n  next"), "  lead\nnext");
    }

    #[test]
    fn test_fail_outcome_carries_reason() {
        let outcome = ValidationOutcome::fail(Violation::new(
            ViolationKind::MergeBlocked,
            "do not\n   merge",
        ));
        assert!(!outcome.passed);
        assert_eq!(outcome.failure_reason.as_deref(), Some("do not\nmerge"));
        assert_eq!(outcome.violation_kind(), Some(ViolationKind::MergeBlocked));
    }

    #[test]
    fn test_pass_outcome_has_no_reason() {
        let outcome = ValidationOutcome::pass();
        assert!(outcome.passed);
        assert!(outcome.failure_reason.is_none());
        assert!(outcome.violation_kind().is_none());
    }
}
