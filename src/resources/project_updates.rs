use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{PAGE_INFO, PROJECT_UPDATE_FIELDS};
use super::{input_with, wrap_list, NodeOutput};
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{at, success_at};
use crate::transport::client::LinearClient;

const LIST_PROJECT_UPDATES_QUERY: &str = concatcp!(
    r#"
query ProjectUpdates($projectId: String!, $first: Int, $after: String) {
    project(id: $projectId) {
        projectUpdates(first: $first, after: $after) {
            nodes {"#,
    PROJECT_UPDATE_FIELDS,
    "            }",
    PAGE_INFO,
    r#"        }
    }
}
"#
);

const CREATE_PROJECT_UPDATE_MUTATION: &str = concatcp!(
    r#"
mutation CreateProjectUpdate($input: ProjectUpdateCreateInput!) {
    projectUpdateCreate(input: $input) {
        success
        projectUpdate {"#,
    PROJECT_UPDATE_FIELDS,
    r#"        }
    }
}
"#
);

const UPDATE_PROJECT_UPDATE_MUTATION: &str = concatcp!(
    r#"
mutation UpdateProjectUpdate($id: String!, $input: ProjectUpdateUpdateInput!) {
    projectUpdateUpdate(id: $id, input: $input) {
        success
        projectUpdate {"#,
    PROJECT_UPDATE_FIELDS,
    r#"        }
    }
}
"#
);

const DELETE_PROJECT_UPDATE_MUTATION: &str = r#"
mutation DeleteProjectUpdate($id: String!) {
    projectUpdateDelete(id: $id) {
        success
    }
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListProjectUpdates,
    CreateProjectUpdate,
    UpdateProjectUpdate,
    DeleteProjectUpdate,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListProjectUpdates => {
            let updates = client
                .paginate(
                    LIST_PROJECT_UPDATES_QUERY,
                    json!({ "projectId": params.required_str("projectId")? }),
                    "project.projectUpdates",
                    params.page_limit()?,
                )
                .await?;
            return Ok(wrap_list("projectUpdates", updates));
        }
        Operation::CreateProjectUpdate => {
            let input = input_with(
                json!({
                    "projectId": params.required_str("projectId")?,
                    "body": params.required_str("body")?,
                }),
                params.collection("additionalFields")?,
            );
            let data = client
                .request(CREATE_PROJECT_UPDATE_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "projectUpdateCreate.projectUpdate")?
        }
        Operation::UpdateProjectUpdate => {
            let variables = json!({
                "id": params.required_str("updateId")?,
                "input": input_with(Value::Null, params.collection("updateFields")?),
            });
            let data = client
                .request(UPDATE_PROJECT_UPDATE_MUTATION, variables)
                .await?;
            at(&data, "projectUpdateUpdate.projectUpdate")?
        }
        Operation::DeleteProjectUpdate => {
            let data = client
                .request(
                    DELETE_PROJECT_UPDATE_MUTATION,
                    json!({ "id": params.required_str("updateId")? }),
                )
                .await?;
            success_at(&data, "projectUpdateDelete")?
        }
    };

    Ok(NodeOutput::Item(item))
}
