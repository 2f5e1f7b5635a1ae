//! Ticket id extraction from branch names.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use crate::domain::TicketId;
use crate::outcome::{Violation, ViolationKind};

/// Project keys whose tickets may back a pull request.
pub const PROJECT_KEYS: &[&str] = &[
    "DPBUG",
    "DPDEV",
    "DPDO",
    "DPDX",
    "DPEN",
    "DPEPAM",
    "DPMC",
    "DPOPS",
    "DPOSF",
    "DPSM",
    "DPSOW",
    "DPSUPPORT",
    "EMEAX",
    "EPP",
    "RMS",
    "BRC",
];

fn ticket_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let keys = PROJECT_KEYS.join("|");
        RegexBuilder::new(&format!(r"(?:{})-\d+", keys))
            .case_insensitive(true)
            .build()
            .expect("project key pattern is a valid regex")
    })
}

/// Find the first recognized ticket id in `branch`, uppercased.
///
/// Surrounding text is ignored, so `feature/dpbug-12-cart` yields `DPBUG-12`.
pub fn find_ticket_id(branch: &str) -> Option<TicketId> {
    ticket_pattern()
        .find(branch)
        .map(|m| TicketId::new(m.as_str()))
}

/// Like [`find_ticket_id`], but a missing id is a `BranchTicketMissing` violation.
pub fn extract_ticket_id(branch: &str) -> Result<TicketId, Violation> {
    find_ticket_id(branch).ok_or_else(|| {
        Violation::new(
            ViolationKind::BranchTicketMissing,
            &format!(
                "The branch
                \"{branch}\"
                must include an existing JIRA ticket ID.
                Rename the branch to reference the relevant ticket.
                "
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_known_key_any_case() {
        for branch in [
            "feature/DPBUG-1234-cart",
            "feature/dpbug-1234-cart",
            "bugfix/DpBuG-1234",
            "DPBUG-1234",
        ] {
            assert_eq!(
                find_ticket_id(branch).unwrap().as_str(),
                "DPBUG-1234",
                "branch {branch}"
            );
        }
    }

    #[test]
    fn test_every_project_key_is_recognized() {
        for key in PROJECT_KEYS {
            let branch = format!("feature/{}-77-work", key.to_lowercase());
            let id = find_ticket_id(&branch).unwrap();
            assert_eq!(id.as_str(), format!("{key}-77"));
        }
    }

    #[test]
    fn test_first_match_wins() {
        let id = find_ticket_id("rms-1/brc-2").unwrap();
        assert_eq!(id.as_str(), "RMS-1");
    }

    #[test]
    fn test_unknown_key_is_not_a_ticket() {
        assert!(find_ticket_id("feature/ABC-123").is_none());
        assert!(find_ticket_id("feature/DPBUG-").is_none());
    }

    #[test]
    fn test_missing_ticket_names_branch() {
        let violation = extract_ticket_id("fix-something").unwrap_err();
        assert_eq!(violation.kind, ViolationKind::BranchTicketMissing);
        assert!(violation.message.contains("\"fix-something\""));
        assert!(violation.message.starts_with("The branch\n"));
    }
}
