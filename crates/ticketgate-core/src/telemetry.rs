//! Log setup for the `ticketgate` binary.
//!
//! Everything goes to stderr. Stdout is reserved for the `validation=` line
//! when the CI host gives no output file, so the two never interleave.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// HTTP internals stay at `warn` unless `RUST_LOG` asks for more.
const QUIET_DEPENDENCIES: &[&str] = &[
    "hyper=warn",
    "hyper_util=warn",
    "reqwest=warn",
    "rustls=warn",
];

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(level: Level) -> String {
    std::iter::once(level.as_str().to_lowercase())
        .chain(QUIET_DEPENDENCIES.iter().map(|d| d.to_string()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber, as text or as JSON lines when `json` is set.
///
/// A subscriber installed earlier wins; this call is then a no-op.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    let text = (!json).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));
    let lines = json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(lines)
        .try_init()
        .ok();
}
