//! [`AccountDirectory`] and [`IssueTracker`] over the Linear GraphQL API.

use async_trait::async_trait;
use tracing::warn;
use triage::{
    AccountDirectory, AccountRecord, CreatedIssue, IssueDraft, IssueId, IssueKey, IssueTracker,
    TrackerError,
};

use crate::client::GraphQlClient;
use crate::operations::{CreateIssue, FindUsersByEmail, IssueNode, ListUsers};
use crate::transport::{HttpTransport, Transport};
use crate::ApiToken;

/// Linear adapter holding a client and the token it authenticates with.
#[derive(Debug, Clone)]
pub struct LinearTracker<T = HttpTransport> {
    client: GraphQlClient<T>,
    token: ApiToken,
}

impl<T: Transport> LinearTracker<T> {
    pub fn new(client: GraphQlClient<T>, token: ApiToken) -> Self {
        Self { client, token }
    }

    pub fn client(&self) -> &GraphQlClient<T> {
        &self.client
    }
}

#[async_trait]
impl<T: Transport> AccountDirectory for LinearTracker<T> {
    async fn find_accounts_by_email(
        &self,
        email: &str,
    ) -> Result<Vec<AccountRecord>, TrackerError> {
        let data = self
            .client
            .execute(&FindUsersByEmail::new(email), &self.token)
            .await?;
        Ok(data.users.nodes)
    }

    async fn list_accounts(&self) -> Result<Vec<AccountRecord>, TrackerError> {
        let data = self.client.execute(&ListUsers::default(), &self.token).await?;
        Ok(data.users.nodes)
    }
}

#[async_trait]
impl<T: Transport> IssueTracker for LinearTracker<T> {
    async fn create_issue(&self, draft: &IssueDraft) -> Result<CreatedIssue, TrackerError> {
        let data = self
            .client
            .execute(&CreateIssue::from_draft(draft), &self.token)
            .await?;

        let payload = data.issue_create;
        if !payload.success {
            warn!(team = %draft.team, "backend declined to create issue");
            return Err(TrackerError::Rejected {
                team: draft.team.clone(),
            });
        }
        match payload.issue {
            Some(issue) => created_issue(issue),
            None => Err(TrackerError::Decode {
                message: "issueCreate succeeded without an issue".into(),
            }),
        }
    }
}

fn created_issue(node: IssueNode) -> Result<CreatedIssue, TrackerError> {
    let missing = |field: &str| TrackerError::Decode {
        message: format!("created issue has an empty {field}"),
    };
    Ok(CreatedIssue {
        id: IssueId::new(node.id).ok_or_else(|| missing("id"))?,
        title: node.title,
        identifier: IssueKey::new(node.identifier).ok_or_else(|| missing("identifier"))?,
        url: node.url,
    })
}
