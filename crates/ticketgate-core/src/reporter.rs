//! Outcome reporting to the CI host.
//!
//! The host reads one boolean, `validation`. [`report`] writes it exactly once
//! and only then turns a failure into the error that terminates the process,
//! so pipelines that look only at the flag never have to parse error text.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;

use crate::domain::GateError;
use crate::outcome::ValidationOutcome;

/// Name of the boolean output consumed by the calling pipeline.
pub const VALIDATION_OUTPUT: &str = "validation";

/// Sink for the gate's pass/fail flag.
pub trait OutcomeReporter {
    fn record(&self, passed: bool) -> std::io::Result<()>;
}

/// Writes `validation=<bool>` to the GitHub Actions output file.
///
/// Without an output file the line goes to stdout.
#[derive(Debug, Clone, Default)]
pub struct GithubOutputReporter {
    output_path: Option<PathBuf>,
}

impl GithubOutputReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    /// Use the file named by `GITHUB_OUTPUT`, if set.
    pub fn from_env() -> Self {
        Self::new(std::env::var_os("GITHUB_OUTPUT").map(PathBuf::from))
    }
}

impl OutcomeReporter for GithubOutputReporter {
    fn record(&self, passed: bool) -> std::io::Result<()> {
        match &self.output_path {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                writeln!(file, "{}={}", VALIDATION_OUTPUT, passed)
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}={}", VALIDATION_OUTPUT, passed)
            }
        }
    }
}

/// Keeps every recorded flag in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    writes: Mutex<Vec<bool>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<bool> {
        self.writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }
}

impl OutcomeReporter for MemoryReporter {
    fn record(&self, passed: bool) -> std::io::Result<()> {
        self.writes
            .lock()
            .map_err(|_| std::io::Error::other("memory reporter lock poisoned"))?
            .push(passed);
        Ok(())
    }
}

/// Record the flag for `result`, then surface any failure as an error.
///
/// A failed outcome becomes an error whose message is the formatted
/// failure reason; a gate error is passed through with its source chain.
pub fn report(
    result: Result<ValidationOutcome, GateError>,
    reporter: &dyn OutcomeReporter,
) -> anyhow::Result<()> {
    let passed = matches!(&result, Ok(outcome) if outcome.passed);
    reporter
        .record(passed)
        .context("failed to record validation output")?;

    match result {
        Ok(outcome) if outcome.passed => Ok(()),
        Ok(outcome) => Err(anyhow::anyhow!(outcome
            .failure_reason
            .unwrap_or_else(|| "validation failed".to_string()))),
        Err(err) => Err(err.into()),
    }
}

/// Record a failed run for an error raised before the gate could run,
/// then hand the error back.
pub fn report_aborted(err: anyhow::Error, reporter: &dyn OutcomeReporter) -> anyhow::Result<()> {
    if let Err(io) = reporter.record(false) {
        return Err(err.context(format!("failed to record validation output: {io}")));
    }
    Err(err)
}
