//! Triage router entry point.
//!
//! This binary is the composition root. It:
//!
//! 1. **Parses configuration** from the TOML file named by `--config` and
//!    validates the routing table before any network call is made.
//! 2. **Wires observability**: a `tracing-subscriber` text or JSON layer on
//!    stderr, plus an OTLP span exporter when `[telemetry] otlp_endpoint` is set.
//! 3. **Constructs infrastructure**: the Linear HTTP tracker and the in-memory
//!    account cache, injected into [`triage::TriageService`].
//! 4. **Dispatches** one subcommand and prints its result as JSON on stdout.

mod commands;
mod config;
mod telemetry;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "triage-router", version, about = "Route support reports into Linear")]
struct Cli {
    /// Configuration file.
    #[arg(long, env = "TRIAGE_CONFIG", default_value = "config/triage.toml", global = true)]
    config: PathBuf,

    /// Linear API token.
    #[arg(long, env = "LINEAR_API_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// File a report as a Linear issue.
    Submit {
        /// JSON report file, or `-` for stdin.
        #[arg(long, default_value = "-")]
        report: PathBuf,
    },
    /// Show where a report would be filed without contacting Linear.
    Route {
        #[arg(long = "app")]
        application: String,
        #[arg(long)]
        bridge: Option<String>,
        /// Problem category as shown on the report form.
        #[arg(long)]
        problem: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Resolve a reporter email to a Linear account.
    Resolve { email: String },
    /// Print log search links for a user.
    Logs { user: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    let _telemetry = telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Submit { report } => commands::submit(config, cli.token, &report).await,
        Command::Route {
            application,
            bridge,
            problem,
            priority,
        } => commands::route(
            config,
            &application,
            bridge.as_deref(),
            problem.as_deref(),
            priority.as_deref(),
        ),
        Command::Resolve { email } => commands::resolve(config, cli.token, &email).await,
        Command::Logs { user } => commands::logs(config, &user),
    }
}
