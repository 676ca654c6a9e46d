//! Issue composition: report + routing + assignee → [`IssueDraft`].

use std::fmt::Write as _;

use crate::diagnostics::LogLinks;
use crate::{AccountId, IssueDraft, Report, RoutingResult, TriageError};

/// Builds the create-issue input for `report`.
///
/// Fails with [`TriageError::Unroutable`] when routing produced no team.
/// Labels are emitted in routing order (sorted), so the same inputs always
/// produce the same draft.
pub fn compose_issue(
    report: &Report,
    routing: &RoutingResult,
    assignee: Option<AccountId>,
    links: Option<&LogLinks>,
) -> Result<IssueDraft, TriageError> {
    let team = routing
        .team
        .clone()
        .ok_or_else(|| TriageError::Unroutable {
            application: report.application.clone(),
        })?;

    Ok(IssueDraft {
        team,
        title: issue_title(report),
        description: issue_description(report, links),
        labels: routing.labels.iter().cloned().collect(),
        assignee,
    })
}

/// `"<problem>: <application>"`, or a generic title without a category.
pub fn issue_title(report: &Report) -> String {
    let application = match report.application.trim() {
        "" => "unknown application",
        app => app,
    };
    match report.problem {
        Some(problem) => format!("{problem}: {application}"),
        None => format!("Problem report: {application}"),
    }
}

/// Markdown description: the user's text followed by report context.
pub fn issue_description(report: &Report, links: Option<&LogLinks>) -> String {
    let mut out = String::new();
    let body = report.body.trim();
    if body.is_empty() {
        out.push_str("_No description provided._\n");
    } else {
        out.push_str(body);
        out.push('\n');
    }

    out.push_str("\n---\n\n");
    push_field(&mut out, "Reporter", report.email.trim());
    push_field(&mut out, "Application", report.application.trim());
    push_field(&mut out, "Bridge", report.bridge().unwrap_or_default());
    if let Some(problem) = report.problem {
        push_field(&mut out, "Problem", problem.as_str());
    }
    if let Some(priority) = report.priority {
        push_field(&mut out, "User priority", priority.as_str());
    }
    if let Some(user) = report.user_id.as_deref() {
        push_field(&mut out, "User ID", user.trim());
    }
    for (key, value) in &report.metadata {
        push_field(&mut out, key, value.trim());
    }

    if let Some(links) = links {
        let _ = write!(
            out,
            "\n[Bridge logs]({}) · [Megahungry logs]({})\n",
            links.bridges, links.megahungry
        );
    }
    out
}

fn push_field(out: &mut String, name: &str, value: &str) {
    if !value.is_empty() {
        let _ = writeln!(out, "* **{name}:** {value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LabelId, ProblemCategory, TeamId, UserPriority};
    use std::collections::{BTreeMap, BTreeSet};

    fn report() -> Report {
        Report {
            application: "beeper-android".into(),
            bridge: Some("whatsapp".into()),
            problem: Some(ProblemCategory::Send),
            priority: Some(UserPriority::High),
            email: "jane.doe@beeper.com".into(),
            body: "Messages stay pending forever.".into(),
            user_id: Some("jane".into()),
            metadata: BTreeMap::from([("app_version".to_string(), "4.2.0".to_string())]),
        }
    }

    fn routing() -> RoutingResult {
        RoutingResult {
            team: TeamId::new("team-android"),
            labels: BTreeSet::from([
                LabelId::new("label-b").unwrap(),
                LabelId::new("label-a").unwrap(),
            ]),
        }
    }

    #[test]
    fn draft_carries_routing_and_assignee() {
        let draft = compose_issue(&report(), &routing(), AccountId::new("acc-1"), None).unwrap();

        assert_eq!(draft.team.as_str(), "team-android");
        assert_eq!(draft.title, "I can't send a message: beeper-android");
        assert_eq!(
            draft.labels,
            vec![LabelId::new("label-a").unwrap(), LabelId::new("label-b").unwrap()]
        );
        assert_eq!(draft.assignee, AccountId::new("acc-1"));
    }

    #[test]
    fn missing_team_is_unroutable() {
        let routing = RoutingResult {
            team: None,
            ..routing()
        };
        let err = compose_issue(&report(), &routing, None, None).unwrap_err();
        assert!(matches!(err, TriageError::Unroutable { application } if application == "beeper-android"));
    }

    #[test]
    fn title_without_category_is_generic() {
        let report = Report {
            problem: None,
            ..report()
        };
        assert_eq!(issue_title(&report), "Problem report: beeper-android");
    }

    #[test]
    fn description_lists_context_and_links() {
        let links = LogLinks {
            bridges: "https://grafana/b".into(),
            megahungry: "https://grafana/m".into(),
        };
        let description = issue_description(&report(), Some(&links));

        assert!(description.starts_with("Messages stay pending forever.\n"));
        assert!(description.contains("* **Reporter:** jane.doe@beeper.com\n"));
        assert!(description.contains("* **Bridge:** whatsapp\n"));
        assert!(description.contains("* **User priority:** high\n"));
        assert!(description.contains("* **app_version:** 4.2.0\n"));
        assert!(description.contains("[Bridge logs](https://grafana/b)"));
        assert!(description.contains("[Megahungry logs](https://grafana/m)"));
    }

    #[test]
    fn description_skips_blank_fields() {
        let report = Report {
            bridge: None,
            body: "   ".into(),
            user_id: None,
            metadata: BTreeMap::new(),
            ..report()
        };
        let description = issue_description(&report, None);
        assert!(description.starts_with("_No description provided._"));
        assert!(!description.contains("Bridge"));
        assert!(!description.contains("logs]("));
    }
}
