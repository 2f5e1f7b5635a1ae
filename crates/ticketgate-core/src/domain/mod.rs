//! Domain types for the validation gate.

pub mod error;
pub mod pull_request;
pub mod ticket;

pub use error::{GateError, Result, TransportError};
pub use pull_request::{PullRequest, RepoRef};
pub use ticket::{FixVersion, Ticket, TicketId};
