use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{PAGE_INFO, WORKFLOW_STATE_FIELDS};
use super::{input_with, wrap_list, NodeOutput};
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{at, entity_at, JsonObject};
use crate::transport::client::LinearClient;

const LIST_STATES_QUERY: &str = concatcp!(
    r#"
query TeamStates($id: String!, $first: Int, $after: String, $includeArchived: Boolean) {
    team(id: $id) {
        states(first: $first, after: $after, includeArchived: $includeArchived) {
            nodes {"#,
    WORKFLOW_STATE_FIELDS,
    "            }",
    PAGE_INFO,
    r#"        }
    }
}
"#
);

const GET_STATE_QUERY: &str = concatcp!(
    r#"
query GetWorkflowState($id: String!) {
    workflowState(id: $id) {"#,
    WORKFLOW_STATE_FIELDS,
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

const CREATE_STATE_MUTATION: &str = concatcp!(
    r#"
mutation CreateWorkflowState($input: WorkflowStateCreateInput!) {
    workflowStateCreate(input: $input) {
        success
        workflowState {"#,
    WORKFLOW_STATE_FIELDS,
    r#"        }
    }
}
"#
);

const UPDATE_STATE_MUTATION: &str = concatcp!(
    r#"
mutation UpdateWorkflowState($id: String!, $input: WorkflowStateUpdateInput!) {
    workflowStateUpdate(id: $id, input: $input) {
        success
        workflowState {"#,
    WORKFLOW_STATE_FIELDS,
    r#"        }
    }
}
"#
);

const ARCHIVE_STATE_MUTATION: &str = concatcp!(
    r#"
mutation ArchiveWorkflowState($id: String!) {
    workflowStateArchive(id: $id) {
        success
        entity {"#,
    WORKFLOW_STATE_FIELDS,
    r#"        }
    }
}
"#
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListWorkflowStates,
    GetWorkflowState,
    CreateWorkflowState,
    UpdateWorkflowState,
    ArchiveWorkflowState,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListWorkflowStates => {
            let filters = params.collection("filters")?;
            let include_archived = filters.get("includeArchived") == Some(&Value::Bool(true));
            let variables = json!({
                "id": params.required_str("teamId")?,
                "includeArchived": include_archived,
            });

            let mut states: Vec<JsonObject> = client
                .paginate(LIST_STATES_QUERY, variables, "team.states", params.page_limit()?)
                .await?;
            if let Some(state_type) = filters
                .get("type")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
            {
                states.retain(|state| state.get("type").and_then(Value::as_str) == Some(state_type));
            }
            return Ok(wrap_list("states", states));
        }
        Operation::GetWorkflowState => {
            let state_id = params.required_str("stateId")?;
            let data = client.request(GET_STATE_QUERY, json!({ "id": state_id })).await?;
            entity_at(&data, "workflowState", "Workflow state", state_id)?
        }
        Operation::CreateWorkflowState => {
            let input = input_with(
                json!({
                    "teamId": params.required_str("teamId")?,
                    "name": params.required_str("name")?,
                    "type": params.required_str("type")?,
                }),
                params.collection("additionalFields")?,
            );
            let data = client
                .request(CREATE_STATE_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "workflowStateCreate.workflowState")?
        }
        Operation::UpdateWorkflowState => {
            let variables = json!({
                "id": params.required_str("stateId")?,
                "input": input_with(Value::Null, params.collection("updateFields")?),
            });
            let data = client.request(UPDATE_STATE_MUTATION, variables).await?;
            at(&data, "workflowStateUpdate.workflowState")?
        }
        Operation::ArchiveWorkflowState => {
            let data = client
                .request(ARCHIVE_STATE_MUTATION, json!({ "id": params.required_str("stateId")? }))
                .await?;
            at(&data, "workflowStateArchive.entity")?
        }
    };

    Ok(NodeOutput::Item(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::JsonItems;
    use crate::resources::testing::{client, item, respond_with_data};
    use wiremock::MockServer;

    #[tokio::test]
    async fn type_filter_applies_client_side() {
        let server = MockServer::start().await;
        respond_with_data(
            &server,
            json!({ "team": { "states": {
                "nodes": [
                    { "id": "s1", "type": "backlog" },
                    { "id": "s2", "type": "started" },
                    { "id": "s3", "type": "started" }
                ],
                "pageInfo": { "hasNextPage": false }
            } } }),
        )
        .await;

        let items = JsonItems::from_value(json!({
            "teamId": "t1",
            "filters": { "type": "started" }
        }))
        .unwrap();
        let output = execute(
            &client(&server),
            Operation::ListWorkflowStates,
            &ItemParams::new(&items, 0),
        )
        .await
        .unwrap();

        assert_eq!(
            output,
            item(json!({ "states": [
                { "id": "s2", "type": "started" },
                { "id": "s3", "type": "started" }
            ] }))
        );
    }
}
