//! End-to-end handling of one support report.

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use crate::diagnostics::GrafanaConfig;
use crate::identity::IdentityResolver;
use crate::issue::compose_issue;
use crate::ports::IssueTracker;
use crate::routing::RoutingTable;
use crate::{CreatedIssue, Report, SubmissionId, Timestamp, TriageError};

/// Routes a report, resolves its reporter and files the issue.
///
/// Holds no per-report state; one instance serves concurrent submissions.
#[derive(Clone)]
pub struct TriageService {
    routing: Arc<RoutingTable>,
    identity: IdentityResolver,
    tracker: Arc<dyn IssueTracker>,
    grafana: GrafanaConfig,
}

impl TriageService {
    pub fn new(
        routing: Arc<RoutingTable>,
        identity: IdentityResolver,
        tracker: Arc<dyn IssueTracker>,
        grafana: GrafanaConfig,
    ) -> Self {
        Self {
            routing,
            identity,
            tracker,
            grafana,
        }
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    pub fn identity(&self) -> &IdentityResolver {
        &self.identity
    }

    /// Files `report` as an issue.
    ///
    /// An unresolvable reporter only means the issue is left unassigned, and
    /// a failure to build log links only drops the links. Unroutable reports
    /// and backend errors are returned.
    pub async fn submit(&self, report: &Report) -> Result<CreatedIssue, TriageError> {
        let submission = SubmissionId::new_random();
        let span = info_span!(
            "submit_report",
            submission_id = %submission,
            application = %report.application,
        );
        self.submit_inner(report).instrument(span).await
    }

    async fn submit_inner(&self, report: &Report) -> Result<CreatedIssue, TriageError> {
        let routing = self.routing.route_report(report);
        info!(
            team = ?routing.team.as_ref().map(|t| t.as_str()),
            labels = routing.labels.len(),
            "routed report"
        );
        if routing.team.is_none() {
            return Err(TriageError::Unroutable {
                application: report.application.clone(),
            });
        }

        let assignee = self.identity.resolve(&report.email).await;
        if assignee.is_none() {
            info!("reporter has no backend account, filing unassigned");
        }

        let links = match report.user_id.as_deref().map(str::trim) {
            Some(user) if !user.is_empty() => match self.grafana.log_links(user, Timestamp::now()) {
                Ok(links) => Some(links),
                Err(error) => {
                    warn!(%error, "failed to build log links");
                    None
                }
            },
            _ => None,
        };

        let draft = compose_issue(report, &routing, assignee, links.as_ref())?;
        let issue = self.tracker.create_issue(&draft).await?;
        info!(
            issue_id = %issue.id,
            identifier = %issue.identifier,
            url = %issue.url,
            "created issue"
        );
        Ok(issue)
    }
}
