use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{ISSUE_FIELDS, PAGE_INFO, USER_FIELDS};
use super::{input_with, wrap_list, NodeOutput};
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{at, entity_at, success_at, JsonObject};
use crate::transport::client::LinearClient;

const USER_DETAILS: &str = r#"
    description
    statusLabel
    statusEmoji
    statusUntilAt
    organization {
        id
        name
        urlKey
    }
    teams {
        nodes {
            id
            name
            key
        }
    }
"#;

const LIST_USERS_QUERY: &str = concatcp!(
    r#"
query ListUsers($first: Int, $after: String, $includeArchived: Boolean) {
    users(first: $first, after: $after, includeArchived: $includeArchived) {
        nodes {"#,
    USER_FIELDS,
    "        }",
    PAGE_INFO,
    r#"    }
}
"#
);

const GET_USER_QUERY: &str = concatcp!(
    r#"
query GetUser($id: String!) {
    user(id: $id) {"#,
    USER_FIELDS,
    USER_DETAILS,
    r#"    }
}
"#
);

const VIEWER_QUERY: &str = concatcp!(
    r#"
query Viewer {
    viewer {"#,
    USER_FIELDS,
    USER_DETAILS,
    r#"    }
}
"#
);

const UPDATE_USER_MUTATION: &str = concatcp!(
    r#"
mutation UpdateUser($id: String!, $input: UserUpdateInput!) {
    userUpdate(id: $id, input: $input) {
        success
        user {"#,
    USER_FIELDS,
    r#"        }
    }
}
"#
);

const SUSPEND_USER_MUTATION: &str = r#"
mutation SuspendUser($id: String!) {
    userSuspend(id: $id) {
        success
    }
}
"#;

const UNSUSPEND_USER_MUTATION: &str = r#"
mutation UnsuspendUser($id: String!) {
    userUnsuspend(id: $id) {
        success
    }
}
"#;

const ASSIGNED_ISSUES_QUERY: &str = concatcp!(
    r#"
query UserAssignedIssues($id: String!, $first: Int, $after: String) {
    user(id: $id) {
        assignedIssues(first: $first, after: $after) {
            nodes {"#,
    ISSUE_FIELDS,
    "            }",
    PAGE_INFO,
    r#"        }
    }
}
"#
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListUsers,
    GetUser,
    GetCurrentUser,
    UpdateUser,
    SuspendUser,
    UnsuspendUser,
    GetUserAssignedIssues,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListUsers => {
            let filters = params.collection("filters")?;
            let include_archived = filters.get("includeArchived") == Some(&Value::Bool(true));
            let active_only = filters.get("activeOnly") == Some(&Value::Bool(true));

            let mut users: Vec<JsonObject> = client
                .paginate(
                    LIST_USERS_QUERY,
                    json!({ "includeArchived": include_archived }),
                    "users",
                    params.page_limit()?,
                )
                .await?;
            if active_only {
                users.retain(|user| user.get("active") == Some(&Value::Bool(true)));
            }
            return Ok(wrap_list("users", users));
        }
        Operation::GetUser => {
            let user_id = params.required_str("userId")?;
            let data = client.request(GET_USER_QUERY, json!({ "id": user_id })).await?;
            entity_at(&data, "user", "User", user_id)?
        }
        Operation::GetCurrentUser => {
            let data = client.request(VIEWER_QUERY, json!({})).await?;
            at(&data, "viewer")?
        }
        Operation::UpdateUser => {
            let variables = json!({
                "id": params.required_str("userId")?,
                "input": input_with(Value::Null, params.collection("updateFields")?),
            });
            let data = client.request(UPDATE_USER_MUTATION, variables).await?;
            at(&data, "userUpdate.user")?
        }
        Operation::SuspendUser => {
            let data = client
                .request(SUSPEND_USER_MUTATION, json!({ "id": params.required_str("userId")? }))
                .await?;
            success_at(&data, "userSuspend")?
        }
        Operation::UnsuspendUser => {
            let data = client
                .request(UNSUSPEND_USER_MUTATION, json!({ "id": params.required_str("userId")? }))
                .await?;
            success_at(&data, "userUnsuspend")?
        }
        Operation::GetUserAssignedIssues => {
            let issues = client
                .paginate(
                    ASSIGNED_ISSUES_QUERY,
                    json!({ "id": params.required_str("userId")? }),
                    "user.assignedIssues",
                    params.page_limit()?,
                )
                .await?;
            return Ok(wrap_list("issues", issues));
        }
    };

    Ok(NodeOutput::Item(item))
}
