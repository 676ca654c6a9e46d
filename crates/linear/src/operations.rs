//! The GraphQL operations the router sends to Linear.

use serde::{Deserialize, Serialize};
use triage::{AccountRecord, IssueDraft};

use crate::client::GraphQlOperation;

/// A GraphQL connection page.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    pub nodes: Vec<T>,
}

/// `data` of the user queries.
#[derive(Debug, Clone, Deserialize)]
pub struct UsersData {
    pub users: Connection<AccountRecord>,
}

// ---------------------------------------------------------------------------
// FindUserByEmail
// ---------------------------------------------------------------------------

/// Users whose email equals the given address.
#[derive(Debug, Clone, Serialize)]
pub struct FindUsersByEmail {
    filter: UserFilter,
}

#[derive(Debug, Clone, Serialize)]
struct UserFilter {
    email: StringComparator,
}

#[derive(Debug, Clone, Serialize)]
struct StringComparator {
    eq: String,
}

impl FindUsersByEmail {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            filter: UserFilter {
                email: StringComparator { eq: email.into() },
            },
        }
    }
}

impl GraphQlOperation for FindUsersByEmail {
    const NAME: &'static str = "FindUserByEmail";
    const QUERY: &'static str = r#"
query FindUserByEmail($filter: UserFilter!) {
    users(filter: $filter) {
        nodes {
            id
            name
            email
        }
    }
}
"#;
    type Data = UsersData;
}

// ---------------------------------------------------------------------------
// ListUsers
// ---------------------------------------------------------------------------

/// The first page of users.
///
/// Accounts beyond the first 250 are not returned.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListUsers {}

impl GraphQlOperation for ListUsers {
    const NAME: &'static str = "ListUsers";
    const QUERY: &'static str = r#"
query ListUsers {
    users(first: 250) {
        nodes {
            id
            name
            email
        }
    }
}
"#;
    type Data = UsersData;
}

// ---------------------------------------------------------------------------
// CreateIssue
// ---------------------------------------------------------------------------

/// `issueCreate` mutation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIssue {
    input: IssueCreateInput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueCreateInput {
    team_id: String,
    title: String,
    description: String,
    label_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee_id: Option<String>,
}

impl CreateIssue {
    pub fn from_draft(draft: &IssueDraft) -> Self {
        Self {
            input: IssueCreateInput {
                team_id: draft.team.as_str().to_string(),
                title: draft.title.clone(),
                description: draft.description.clone(),
                label_ids: draft.labels.iter().map(|l| l.as_str().to_string()).collect(),
                assignee_id: draft.assignee.as_ref().map(|a| a.as_str().to_string()),
            },
        }
    }
}

/// `data` of [`CreateIssue`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueData {
    pub issue_create: IssueCreatePayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueCreatePayload {
    pub success: bool,
    #[serde(default)]
    pub issue: Option<IssueNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueNode {
    pub id: String,
    pub title: String,
    pub identifier: String,
    pub url: String,
}

impl GraphQlOperation for CreateIssue {
    const NAME: &'static str = "CreateIssue";
    const QUERY: &'static str = r#"
mutation CreateIssue($input: IssueCreateInput!) {
    issueCreate(input: $input) {
        success
        issue {
            id
            title
            identifier
            url
        }
    }
}
"#;
    type Data = CreateIssueData;
}
