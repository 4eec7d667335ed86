use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{LABEL_FIELDS, PAGE_INFO};
use super::{input_with, wrap_list, NodeOutput};
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{at, entity_at, success_at, JsonObject};
use crate::transport::client::LinearClient;

const TEAM_LABELS_QUERY: &str = concatcp!(
    r#"
query TeamLabels($id: String!, $first: Int, $after: String, $includeArchived: Boolean) {
    team(id: $id) {
        labels(first: $first, after: $after, includeArchived: $includeArchived) {
            nodes {"#,
    LABEL_FIELDS,
    "            }",
    PAGE_INFO,
    r#"        }
    }
}
"#
);

const WORKSPACE_LABELS_QUERY: &str = concatcp!(
    r#"
query WorkspaceLabels($first: Int, $after: String, $includeArchived: Boolean) {
    issueLabels(first: $first, after: $after, includeArchived: $includeArchived) {
        nodes {"#,
    LABEL_FIELDS,
    "        }",
    PAGE_INFO,
    r#"    }
}
"#
);

const GET_LABEL_QUERY: &str = concatcp!(
    r#"
query GetLabel($id: String!) {
    issueLabel(id: $id) {"#,
    LABEL_FIELDS,
    r#"        issues {
            nodes {
                id
                identifier
                title
            }
        }
    }
}
"#
);

const CREATE_LABEL_MUTATION: &str = concatcp!(
    r#"
mutation CreateLabel($input: IssueLabelCreateInput!) {
    issueLabelCreate(input: $input) {
        success
        issueLabel {"#,
    LABEL_FIELDS,
    r#"        }
    }
}
"#
);

const UPDATE_LABEL_MUTATION: &str = concatcp!(
    r#"
mutation UpdateLabel($id: String!, $input: IssueLabelUpdateInput!) {
    issueLabelUpdate(id: $id, input: $input) {
        success
        issueLabel {"#,
    LABEL_FIELDS,
    r#"        }
    }
}
"#
);

const DELETE_LABEL_MUTATION: &str = r#"
mutation DeleteLabel($id: String!) {
    issueLabelDelete(id: $id) {
        success
    }
}
"#;

const ARCHIVE_LABEL_MUTATION: &str = concatcp!(
    r#"
mutation ArchiveLabel($id: String!) {
    issueLabelArchive(id: $id) {
        success
        entity {"#,
    LABEL_FIELDS,
    r#"        }
    }
}
"#
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListLabels,
    GetLabel,
    CreateLabel,
    UpdateLabel,
    DeleteLabel,
    ArchiveLabel,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListLabels => {
            let filters = params.collection("filters")?;
            let include_archived = filters.get("includeArchived") == Some(&Value::Bool(true));
            let limit = params.page_limit()?;

            // A team narrows the listing to that team's labels.
            let labels: Vec<JsonObject> = match params.optional_str("teamId")? {
                Some(team_id) => {
                    let variables = json!({ "id": team_id, "includeArchived": include_archived });
                    client
                        .paginate(TEAM_LABELS_QUERY, variables, "team.labels", limit)
                        .await?
                }
                None => {
                    let variables = json!({ "includeArchived": include_archived });
                    client
                        .paginate(WORKSPACE_LABELS_QUERY, variables, "issueLabels", limit)
                        .await?
                }
            };
            return Ok(wrap_list("labels", labels));
        }
        Operation::GetLabel => {
            let label_id = params.required_str("labelId")?;
            let data = client.request(GET_LABEL_QUERY, json!({ "id": label_id })).await?;
            entity_at(&data, "issueLabel", "Label", label_id)?
        }
        Operation::CreateLabel => {
            let input = input_with(
                json!({
                    "name": params.required_str("name")?,
                    "teamId": params.optional_str("teamId")?,
                }),
                params.collection("additionalFields")?,
            );
            let data = client
                .request(CREATE_LABEL_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "issueLabelCreate.issueLabel")?
        }
        Operation::UpdateLabel => {
            let variables = json!({
                "id": params.required_str("labelId")?,
                "input": input_with(Value::Null, params.collection("updateFields")?),
            });
            let data = client.request(UPDATE_LABEL_MUTATION, variables).await?;
            at(&data, "issueLabelUpdate.issueLabel")?
        }
        Operation::DeleteLabel => {
            let data = client
                .request(DELETE_LABEL_MUTATION, json!({ "id": params.required_str("labelId")? }))
                .await?;
            success_at(&data, "issueLabelDelete")?
        }
        Operation::ArchiveLabel => {
            let data = client
                .request(ARCHIVE_LABEL_MUTATION, json!({ "id": params.required_str("labelId")? }))
                .await?;
            at(&data, "issueLabelArchive.entity")?
        }
    };

    Ok(NodeOutput::Item(item))
}
