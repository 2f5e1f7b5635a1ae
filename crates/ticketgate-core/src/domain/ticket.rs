//! Issue-tracker ticket model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ticket identifier such as `DPBUG-1234`. Always uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct TicketId(String);

impl TicketId {
    pub fn new(raw: &str) -> Self {
        TicketId(raw.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TicketId {
    fn from(raw: String) -> Self {
        TicketId::new(&raw)
    }
}

impl From<TicketId> for String {
    fn from(id: TicketId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tracker-side release record attached to a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixVersion {
    pub release_date: Option<NaiveDate>,
    pub released: bool,
}

impl FixVersion {
    /// A fix version is usable when it releases on or after `reference`,
    /// or when it has not been released yet.
    pub fn qualifies(&self, reference: NaiveDate) -> bool {
        self.release_date.is_some_and(|date| date >= reference) || !self.released
    }
}

/// Ticket as fetched from the issue tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub issue_type: String,
    pub status: String,
    /// Date portion of the ticket's creation timestamp.
    pub created: Option<NaiveDate>,
    pub fix_versions: Vec<FixVersion>,
}
