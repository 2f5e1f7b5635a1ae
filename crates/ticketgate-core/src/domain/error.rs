//! Error taxonomy for gate infrastructure failures.
//!
//! Rule failures are not errors; they are [`crate::Violation`] values carried
//! by a [`crate::ValidationOutcome`]. The types here cover the remote
//! collaborators and the orchestration around them.

/// Failures talking to either remote provider.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{service} returned HTTP {status} for {url}")]
    Http {
        service: &'static str,
        status: u16,
        url: String,
    },

    #[error("{service} request failed: {message}")]
    Request {
        service: &'static str,
        message: String,
    },

    #[error("failed to decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service} call timed out after {timeout_ms} ms")]
    Timeout {
        service: &'static str,
        timeout_ms: u64,
    },

    #[error("{service} has no record of {resource}")]
    NotFound {
        service: &'static str,
        resource: String,
    },
}

/// Gate-level errors surfaced to the invocation surface.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Any transport failure while re-fetching the PR or its ticket.
    ///
    /// The display text stays generic; the cause is kept as the error source.
    #[error("Unable to refresh context for Pull Request {pr_number}.")]
    ContextRefreshFailed {
        pr_number: u64,
        #[source]
        source: TransportError,
    },

    /// Transport failure in direct ticket-check mode, where no PR is involved.
    #[error("Unable to fetch ticket {ticket_id}.")]
    TicketFetchFailed {
        ticket_id: String,
        #[source]
        source: TransportError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for gate operations.
pub type Result<T> = std::result::Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_context_refresh_message_is_generic() {
        let err = GateError::ContextRefreshFailed {
            pr_number: 42,
            source: TransportError::Http {
                service: "jira",
                status: 401,
                url: "https://jira.example.com/rest/api/latest/issue/DPBUG-1".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "Unable to refresh context for Pull Request 42."
        );
        let source = err.source().expect("source is kept");
        assert!(source.to_string().contains("HTTP 401"));
    }

    #[test]
    fn test_timeout_display() {
        let err = TransportError::Timeout {
            service: "github",
            timeout_ms: 30_000,
        };
        assert_eq!(err.to_string(), "github call timed out after 30000 ms");
    }
}
