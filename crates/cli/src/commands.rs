//! Subcommand implementations.
//!
//! Each command prints a single JSON document on stdout; logs go to stderr.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use linear::{ApiToken, LinearTracker};
use serde::Serialize;
use tracing::{info, warn};
use triage::{
    canonical_email, IdentityResolver, InMemoryAccountCache, ProblemCategory, Report,
    RoutingTable, Timestamp, TriageService, UserPriority,
};

use crate::config::AppConfig;

/// Files the report read from `source` (`-` for stdin).
pub async fn submit(config: AppConfig, token: Option<String>, source: &Path) -> anyhow::Result<()> {
    let report = read_report(source)?;
    let routing = Arc::new(RoutingTable::new(config.routing.clone())?);
    let tracker = Arc::new(tracker(&config, token)?);
    let identity = resolver(&config, tracker.clone()).await;

    let service = TriageService::new(routing, identity, tracker, config.grafana);
    let issue = service.submit(&report).await?;
    print_json(&issue)
}

/// Prints the routing result for the given attributes without any I/O.
pub fn route(
    config: AppConfig,
    application: &str,
    bridge: Option<&str>,
    problem: Option<&str>,
    priority: Option<&str>,
) -> anyhow::Result<()> {
    let table = RoutingTable::new(config.routing)?;
    let problem = problem.and_then(|p| lenient::<ProblemCategory>("problem", p));
    let priority = priority.and_then(|p| lenient::<UserPriority>("priority", p));
    print_json(&table.route(application, bridge, problem, priority))
}

#[derive(Serialize)]
struct Resolution<'a> {
    email: &'a str,
    canonical: Option<String>,
    account_id: Option<String>,
}

/// Resolves `email` to a backend account.
pub async fn resolve(config: AppConfig, token: Option<String>, email: &str) -> anyhow::Result<()> {
    let tracker = Arc::new(tracker(&config, token)?);
    let identity = resolver(&config, tracker).await;
    let account = identity.resolve(email).await;
    print_json(&Resolution {
        email,
        canonical: canonical_email(email, identity.domain()),
        account_id: account.map(|id| id.to_string()),
    })
}

/// Prints the log links for `user` centred on now.
pub fn logs(config: AppConfig, user: &str) -> anyhow::Result<()> {
    let links = config
        .grafana
        .log_links(user, Timestamp::now())
        .context("failed to encode log query")?;
    print_json(&links)
}

fn tracker(config: &AppConfig, token: Option<String>) -> anyhow::Result<LinearTracker> {
    let token = token
        .and_then(ApiToken::new)
        .ok_or_else(|| anyhow!("no API token: pass --token or set LINEAR_API_TOKEN"))?;
    Ok(linear::http_tracker(
        config.linear.endpoint.clone(),
        config.linear.timeout(),
        token,
    )?)
}

async fn resolver(config: &AppConfig, tracker: Arc<LinearTracker>) -> IdentityResolver {
    let identity = IdentityResolver::new(
        tracker,
        Arc::new(InMemoryAccountCache::new()),
        config.identity.domain.clone(),
    );
    if config.identity.prefill {
        match identity.prefill().await {
            Ok(count) => info!(count, "prefilled account cache"),
            Err(error) => warn!(%error, "failed to prefill account cache, continuing cold"),
        }
    }
    identity
}

/// Reads a JSON report from a file, or from stdin when `source` is `-`.
pub fn read_report(source: &Path) -> anyhow::Result<Report> {
    let text = if source == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read report from stdin")?;
        text
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read report {}", source.display()))?
    };
    parse_report(&text)
}

fn parse_report(text: &str) -> anyhow::Result<Report> {
    serde_json::from_str(text).context("report is not valid JSON")
}

fn lenient<T: std::str::FromStr>(field: &str, value: &str) -> Option<T> {
    let parsed = value.parse().ok();
    if parsed.is_none() {
        warn!(field, value, "ignoring unknown value");
    }
    parsed
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
