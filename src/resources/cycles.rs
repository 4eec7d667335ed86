use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{CYCLE_FIELDS, PAGE_INFO};
use super::{input_with, issues, object_with, wrap_list, NodeOutput};
use crate::error::{LinearError, Result};
use crate::params::ItemParams;
use crate::responses::{at, entity_at, JsonObject};
use crate::transport::client::LinearClient;

const CYCLE_ISSUES: &str = r#"
    issues {
        nodes {
            id
            identifier
            title
            state {
                id
                name
            }
        }
    }
"#;

const LIST_CYCLES_QUERY: &str = concatcp!(
    r#"
query TeamCycles($teamId: String!, $first: Int, $after: String, $includeArchived: Boolean) {
    team(id: $teamId) {
        cycles(first: $first, after: $after, includeArchived: $includeArchived) {
            nodes {"#,
    CYCLE_FIELDS,
    "            }",
    PAGE_INFO,
    r#"        }
    }
}
"#
);

const GET_CYCLE_QUERY: &str = concatcp!(
    r#"
query GetCycle($id: String!) {
    cycle(id: $id) {"#,
    CYCLE_FIELDS,
    CYCLE_ISSUES,
    r#"    }
}
"#
);

const CREATE_CYCLE_MUTATION: &str = concatcp!(
    r#"
mutation CreateCycle($input: CycleCreateInput!) {
    cycleCreate(input: $input) {
        success
        cycle {"#,
    CYCLE_FIELDS,
    r#"        }
    }
}
"#
);

const UPDATE_CYCLE_MUTATION: &str = concatcp!(
    r#"
mutation UpdateCycle($id: String!, $input: CycleUpdateInput!) {
    cycleUpdate(id: $id, input: $input) {
        success
        cycle {"#,
    CYCLE_FIELDS,
    r#"        }
    }
}
"#
);

const ARCHIVE_CYCLE_MUTATION: &str = concatcp!(
    r#"
mutation ArchiveCycle($id: String!) {
    cycleArchive(id: $id) {
        success
        entity {"#,
    CYCLE_FIELDS,
    r#"        }
    }
}
"#
);

const CURRENT_CYCLE_QUERY: &str = concatcp!(
    r#"
query CurrentCycle($teamId: String!) {
    team(id: $teamId) {
        activeCycle {"#,
    CYCLE_FIELDS,
    CYCLE_ISSUES,
    r#"        }
    }
}
"#
);

const NO_ACTIVE_CYCLE: &str = "No active cycle found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListCycles,
    GetCycle,
    CreateCycle,
    UpdateCycle,
    ArchiveCycle,
    GetCurrentCycle,
    AddIssueToCycle,
    RemoveIssueFromCycle,
}

#[derive(Deserialize)]
struct TeamCycle {
    #[serde(rename = "activeCycle")]
    active_cycle: Option<JsonObject>,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListCycles => {
            let filters = params.collection("filters")?;
            let include_archived = filters.get("includeArchived") == Some(&Value::Bool(true));
            let variables = json!({
                "teamId": params.required_str("teamId")?,
                "includeArchived": include_archived,
            });
            let cycles = client
                .paginate(LIST_CYCLES_QUERY, variables, "team.cycles", params.page_limit()?)
                .await?;
            return Ok(wrap_list("cycles", cycles));
        }
        Operation::GetCycle => {
            let cycle_id = params.required_str("cycleId")?;
            let data = client.request(GET_CYCLE_QUERY, json!({ "id": cycle_id })).await?;
            entity_at(&data, "cycle", "Cycle", cycle_id)?
        }
        Operation::CreateCycle => {
            let input = input_with(
                json!({
                    "teamId": params.required_str("teamId")?,
                    "startsAt": params.required_str("startsAt")?,
                    "endsAt": params.required_str("endsAt")?,
                }),
                params.collection("additionalFields")?,
            );
            let data = client
                .request(CREATE_CYCLE_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "cycleCreate.cycle")?
        }
        Operation::UpdateCycle => {
            let variables = json!({
                "id": params.required_str("cycleId")?,
                "input": input_with(Value::Null, params.collection("updateFields")?),
            });
            let data = client.request(UPDATE_CYCLE_MUTATION, variables).await?;
            at(&data, "cycleUpdate.cycle")?
        }
        Operation::ArchiveCycle => {
            let data = client
                .request(
                    ARCHIVE_CYCLE_MUTATION,
                    json!({ "id": params.required_str("cycleId")? }),
                )
                .await?;
            at(&data, "cycleArchive.entity")?
        }
        Operation::GetCurrentCycle => current_cycle(client, params.required_str("teamId")?).await?,
        Operation::AddIssueToCycle => {
            let cycle_id = params.required_str("cycleId")?;
            issues::update(client, params.required_str("issueId")?, json!({ "cycleId": cycle_id }))
                .await?
        }
        Operation::RemoveIssueFromCycle => {
            issues::update(client, params.required_str("issueId")?, json!({ "cycleId": null }))
                .await?
        }
    };

    Ok(NodeOutput::Item(item))
}

async fn current_cycle(client: &LinearClient, team_id: &str) -> Result<JsonObject> {
    let data = client
        .request(CURRENT_CYCLE_QUERY, json!({ "teamId": team_id }))
        .await?;
    let team: Option<TeamCycle> = at(&data, "team")?;
    let team = team.ok_or_else(|| LinearError::NotFound {
        kind: "Team",
        id: team_id.to_string(),
    })?;
    Ok(team
        .active_cycle
        .unwrap_or_else(|| object_with("message", json!(NO_ACTIVE_CYCLE))))
}
