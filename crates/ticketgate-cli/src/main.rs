//! TicketGate CLI - pull request / ticket validation gate
//!
//! The `ticketgate` command runs as a CI step on pull request events.
//!
//! ## Commands
//!
//! - `validate-pr`: refresh the PR from GitHub and validate it against Jira
//! - `check-ticket`: validate a single Jira ticket against a base branch
//!
//! Both commands write `validation=<bool>` to `$GITHUB_OUTPUT` (or stdout)
//! before exiting; a failed validation exits non-zero with the reason.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use tracing::{info, Level};

use ticketgate_clients::{GithubClient, GithubConfig, JiraClient, JiraConfig, DEFAULT_API_URL};
use ticketgate_core::{
    init_tracing, report, report_aborted, GateConfig, GithubOutputReporter, OutcomeReporter,
    RepoRef, TicketGate,
};

#[derive(Parser)]
#[command(name = "ticketgate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Gate pull requests on their Jira tickets", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Timeout for each network call, in seconds
    #[arg(
        long,
        global = true,
        env = "TICKETGATE_TIMEOUT_SECS",
        default_value_t = 30
    )]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct JiraArgs {
    /// Jira instance root, with or without scheme
    #[arg(long, env = "JIRA_BASE_URL")]
    jira_base_url: String,

    /// Jira user email for basic auth
    #[arg(long, env = "JIRA_USER_EMAIL")]
    jira_user_email: String,

    /// Jira API token for basic auth
    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    jira_api_token: String,
}

impl JiraArgs {
    fn config(&self) -> JiraConfig {
        JiraConfig::new(
            &self.jira_base_url,
            &self.jira_user_email,
            &self.jira_api_token,
        )
    }
}

#[derive(Args)]
struct ValidatePrArgs {
    /// GitHub token used to re-fetch the pull request
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: String,

    /// Repository as owner/repo
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: String,

    /// Pull request number (read from the event payload if omitted)
    #[arg(long)]
    pr_number: Option<u64>,

    /// Path to the triggering event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// GitHub REST API root
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    github_api_url: String,

    #[command(flatten)]
    jira: JiraArgs,
}

#[derive(Args)]
struct CheckTicketArgs {
    /// Ticket id, e.g. DPBUG-1234
    #[arg(long, env = "TICKET_ID")]
    ticket_id: String,

    /// Destination branch the ticket would merge into
    #[arg(long, env = "GITHUB_BASE_REF")]
    base_branch: String,

    #[command(flatten)]
    jira: JiraArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a pull request's branch, title and ticket
    ValidatePr(ValidatePrArgs),

    /// Validate one ticket against the release rules of a base branch
    CheckTicket(CheckTicketArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let gate_config =
        GateConfig::default().with_call_timeout(Duration::from_secs(cli.timeout_secs));
    execute(cli.command, gate_config, &GithubOutputReporter::from_env()).await
}

/// Run one command and record its flag, including for setup failures.
async fn execute(
    command: Commands,
    gate_config: GateConfig,
    reporter: &dyn OutcomeReporter,
) -> Result<()> {
    match command {
        Commands::ValidatePr(args) => {
            let (gate, repo, pr_number) = match prepare_validate_pr(&args, gate_config) {
                Ok(prepared) => prepared,
                Err(err) => return report_aborted(err, reporter),
            };
            info!("Validating pull request {}#{}", repo, pr_number);
            report(gate.run(&repo, pr_number).await, reporter)
        }
        Commands::CheckTicket(args) => {
            let gate = match jira_client(&args.jira) {
                Ok(tracker) => TicketGate::new(Arc::new(tracker), gate_config),
                Err(err) => return report_aborted(err, reporter),
            };
            info!("Checking ticket {} against {}", args.ticket_id, args.base_branch);
            report(
                gate.check_ticket(&args.ticket_id, &args.base_branch).await,
                reporter,
            )
        }
    }
}

fn prepare_validate_pr(
    args: &ValidatePrArgs,
    gate_config: GateConfig,
) -> Result<(TicketGate, RepoRef, u64)> {
    let repo: RepoRef = args.repository.parse()?;
    let pr_number = resolve_pr_number(args.pr_number, args.event_path.as_deref())?;
    let github = GithubClient::new(
        GithubConfig::new(&args.github_token).with_api_url(&args.github_api_url),
    )
    .context("Failed to create GitHub client")?;
    let tracker = jira_client(&args.jira)?;

    let gate = TicketGate::new(Arc::new(tracker), gate_config).with_pull_requests(Arc::new(github));
    Ok((gate, repo, pr_number))
}

fn jira_client(args: &JiraArgs) -> Result<JiraClient> {
    JiraClient::new(args.config()).context("Failed to create Jira client")
}

#[derive(Deserialize)]
struct EventPayload {
    pull_request: Option<EventPullRequest>,
    number: Option<u64>,
}

#[derive(Deserialize)]
struct EventPullRequest {
    number: u64,
}

/// An explicit `--pr-number` wins over the event payload.
fn resolve_pr_number(explicit: Option<u64>, event_path: Option<&Path>) -> Result<u64> {
    if let Some(number) = explicit {
        return Ok(number);
    }
    let path = event_path
        .context("No pull request number: pass --pr-number or set GITHUB_EVENT_PATH")?;
    pr_number_from_event(path)
}

fn pr_number_from_event(path: &Path) -> Result<u64> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event payload {:?}", path))?;
    let event: EventPayload = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse event payload {:?}", path))?;
    event
        .pull_request
        .map(|pr| pr.number)
        .or(event.number)
        .with_context(|| format!("Event payload {:?} has no pull request number", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use ticketgate_core::MemoryReporter;

    fn write_event(body: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, body).unwrap();
        (dir, path)
    }

    #[test]
    fn test_pr_number_from_pull_request_event() {
        let (_dir, path) = write_event(
            r#"{"action": "synchronize", "number": 318, "pull_request": {"number": 318, "title": "x"}}"#,
        );
        assert_eq!(pr_number_from_event(&path).unwrap(), 318);
    }

    #[test]
    fn test_pr_number_falls_back_to_top_level_number() {
        let (_dir, path) = write_event(r#"{"number": 7}"#);
        assert_eq!(pr_number_from_event(&path).unwrap(), 7);
    }

    #[test]
    fn test_push_event_has_no_pr_number() {
        let (_dir, path) = write_event(r#"{"ref": "refs/heads/main"}"#);
        let err = pr_number_from_event(&path).unwrap_err();
        assert!(err.to_string().contains("no pull request number"));
    }

    #[test]
    fn test_explicit_pr_number_wins() {
        let (_dir, path) = write_event(r#"{"number": 7}"#);
        assert_eq!(resolve_pr_number(Some(12), Some(&path)).unwrap(), 12);
        assert!(resolve_pr_number(None, None).is_err());
    }

    #[test]
    fn test_parse_check_ticket_args() {
        let cli = Cli::try_parse_from([
            "ticketgate",
            "--timeout-secs",
            "5",
            "check-ticket",
            "--ticket-id",
            "DPBUG-1",
            "--base-branch",
            "release/1",
            "--jira-base-url",
            "jira.example.com",
            "--jira-user-email",
            "me@example.com",
            "--jira-api-token",
            "tok",
        ])
        .unwrap();
        assert_eq!(cli.timeout_secs, 5);
        match cli.command {
            Commands::CheckTicket(args) => {
                assert_eq!(args.ticket_id, "DPBUG-1");
                assert_eq!(args.base_branch, "release/1");
                assert_eq!(args.jira.config().base_url, "https://jira.example.com");
            }
            Commands::ValidatePr(_) => panic!("expected check-ticket"),
        }
    }

    fn validate_pr_command(extra: &[&str]) -> Commands {
        let mut argv = vec![
            "ticketgate",
            "validate-pr",
            "--github-token",
            "t",
            "--jira-base-url",
            "jira.example.com",
            "--jira-user-email",
            "me@example.com",
            "--jira-api-token",
            "tok",
        ];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[tokio::test]
    async fn test_bad_repository_records_false() {
        let command = validate_pr_command(&["--repository", "not-a-repo", "--pr-number", "3"]);
        let reporter = MemoryReporter::new();

        let err = execute(command, GateConfig::default(), &reporter)
            .await
            .unwrap_err();
        assert_eq!(reporter.writes(), vec![false]);
        assert!(err.to_string().contains("owner/repo"));
    }

    #[tokio::test]
    async fn test_missing_pr_number_records_false() {
        let (_dir, path) = write_event(r#"{"ref": "refs/heads/main"}"#);
        let event_path = path.to_string_lossy().into_owned();
        let command = validate_pr_command(&[
            "--repository",
            "stevedores-org/storefront",
            "--event-path",
            event_path.as_str(),
        ]);
        let reporter = MemoryReporter::new();

        let err = execute(command, GateConfig::default(), &reporter)
            .await
            .unwrap_err();
        assert_eq!(reporter.writes(), vec![false]);
        assert!(err.to_string().contains("no pull request number"));
    }

    #[tokio::test]
    async fn test_unreachable_jira_records_false_once() {
        let cli = Cli::try_parse_from([
            "ticketgate",
            "check-ticket",
            "--ticket-id",
            "DPBUG-1",
            "--base-branch",
            "main",
            "--jira-base-url",
            "http://127.0.0.1:9",
            "--jira-user-email",
            "me@example.com",
            "--jira-api-token",
            "tok",
        ])
        .unwrap();
        let reporter = MemoryReporter::new();

        let err = execute(cli.command, GateConfig::default(), &reporter)
            .await
            .unwrap_err();
        assert_eq!(reporter.writes(), vec![false]);
        assert_eq!(err.to_string(), "Unable to fetch ticket DPBUG-1.");
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
