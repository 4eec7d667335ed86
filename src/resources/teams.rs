use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{LABEL_FIELDS, PAGE_INFO, TEAM_FIELDS, USER_FIELDS, WORKFLOW_STATE_FIELDS};
use super::{input_with, object_with, wrap_list, NodeOutput};
use crate::error::{LinearError, Result};
use crate::params::ItemParams;
use crate::responses::{at, entity_at, success_at, JsonObject};
use crate::transport::client::LinearClient;

const LIST_TEAMS_QUERY: &str = concatcp!(
    r#"
query ListTeams($first: Int, $after: String) {
    teams(first: $first, after: $after) {
        nodes {"#,
    TEAM_FIELDS,
    "        }",
    PAGE_INFO,
    r#"    }
}
"#
);

const GET_TEAM_QUERY: &str = concatcp!(
    r#"
query GetTeam($id: String!) {
    team(id: $id) {"#,
    TEAM_FIELDS,
    r#"        issueCount
        activeCycle {
            id
            number
            name
        }
    }
}
"#
);

const CREATE_TEAM_MUTATION: &str = concatcp!(
    r#"
mutation CreateTeam($input: TeamCreateInput!) {
    teamCreate(input: $input) {
        success
        team {"#,
    TEAM_FIELDS,
    r#"        }
    }
}
"#
);

const UPDATE_TEAM_MUTATION: &str = concatcp!(
    r#"
mutation UpdateTeam($id: String!, $input: TeamUpdateInput!) {
    teamUpdate(id: $id, input: $input) {
        success
        team {"#,
    TEAM_FIELDS,
    r#"        }
    }
}
"#
);

const DELETE_TEAM_MUTATION: &str = r#"
mutation DeleteTeam($id: String!) {
    teamDelete(id: $id) {
        success
    }
}
"#;

const TEAM_MEMBERS_QUERY: &str = concatcp!(
    r#"
query TeamMembers($id: String!, $first: Int, $after: String) {
    team(id: $id) {
        members(first: $first, after: $after) {
            nodes {"#,
    USER_FIELDS,
    "            }",
    PAGE_INFO,
    r#"        }
    }
}
"#
);

const ADD_TEAM_MEMBER_MUTATION: &str = concatcp!(
    r#"
mutation CreateTeamMembership($input: TeamMembershipCreateInput!) {
    teamMembershipCreate(input: $input) {
        success
        teamMembership {
            id
            user {"#,
    USER_FIELDS,
    r#"            }
            team {
                id
                name
                key
            }
        }
    }
}
"#
);

const FIND_MEMBERSHIP_QUERY: &str = r#"
query FindTeamMembership($filter: TeamMembershipFilter) {
    teamMemberships(filter: $filter) {
        nodes {
            id
        }
    }
}
"#;

const DELETE_MEMBERSHIP_MUTATION: &str = r#"
mutation DeleteTeamMembership($id: String!) {
    teamMembershipDelete(id: $id) {
        success
    }
}
"#;

const TEAM_LABELS_QUERY: &str = concatcp!(
    r#"
query TeamLabels($id: String!, $first: Int, $after: String) {
    team(id: $id) {
        labels(first: $first, after: $after) {
            nodes {"#,
    LABEL_FIELDS,
    "            }",
    PAGE_INFO,
    r#"        }
    }
}
"#
);

const TEAM_STATES_QUERY: &str = concatcp!(
    r#"
query TeamStates($id: String!, $first: Int, $after: String) {
    team(id: $id) {
        states(first: $first, after: $after) {
            nodes {"#,
    WORKFLOW_STATE_FIELDS,
    "            }",
    PAGE_INFO,
    r#"        }
    }
}
"#
);

const TEAM_TEMPLATES_QUERY: &str = r#"
query TeamTemplates($id: String!) {
    team(id: $id) {
        templates {
            nodes {
                id
                name
                description
                type
                createdAt
                updatedAt
            }
        }
    }
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListTeams,
    GetTeam,
    CreateTeam,
    UpdateTeam,
    DeleteTeam,
    GetTeamMembers,
    AddTeamMember,
    RemoveTeamMember,
    GetTeamLabels,
    GetTeamStates,
    GetTeamTemplates,
}

#[derive(Deserialize)]
struct MembershipRef {
    id: String,
}

#[derive(Deserialize)]
struct TeamTemplates {
    templates: Option<TemplateNodes>,
}

#[derive(Deserialize)]
struct TemplateNodes {
    #[serde(default)]
    nodes: Vec<JsonObject>,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListTeams => {
            let teams = client
                .paginate(LIST_TEAMS_QUERY, json!({}), "teams", params.page_limit()?)
                .await?;
            return Ok(wrap_list("teams", teams));
        }
        Operation::GetTeam => {
            let team_id = params.required_str("teamId")?;
            let data = client.request(GET_TEAM_QUERY, json!({ "id": team_id })).await?;
            entity_at(&data, "team", "Team", team_id)?
        }
        Operation::CreateTeam => {
            let input = input_with(
                json!({
                    "name": params.required_str("name")?,
                    "key": params.required_str("key")?,
                }),
                params.collection("additionalFields")?,
            );
            let data = client
                .request(CREATE_TEAM_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "teamCreate.team")?
        }
        Operation::UpdateTeam => {
            let variables = json!({
                "id": params.required_str("teamId")?,
                "input": input_with(Value::Null, params.collection("updateFields")?),
            });
            let data = client.request(UPDATE_TEAM_MUTATION, variables).await?;
            at(&data, "teamUpdate.team")?
        }
        Operation::DeleteTeam => {
            let data = client
                .request(DELETE_TEAM_MUTATION, json!({ "id": params.required_str("teamId")? }))
                .await?;
            success_at(&data, "teamDelete")?
        }
        Operation::GetTeamMembers => {
            return team_connection(client, params, TEAM_MEMBERS_QUERY, "team.members", "members")
                .await
        }
        Operation::AddTeamMember => {
            let input = json!({
                "teamId": params.required_str("teamId")?,
                "userId": params.required_str("userId")?,
            });
            let data = client
                .request(ADD_TEAM_MEMBER_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "teamMembershipCreate.teamMembership")?
        }
        Operation::RemoveTeamMember => remove_member(client, params).await?,
        Operation::GetTeamLabels => {
            return team_connection(client, params, TEAM_LABELS_QUERY, "team.labels", "labels").await
        }
        Operation::GetTeamStates => {
            return team_connection(client, params, TEAM_STATES_QUERY, "team.states", "states").await
        }
        Operation::GetTeamTemplates => {
            let team_id = params.required_str("teamId")?;
            let data = client
                .request(TEAM_TEMPLATES_QUERY, json!({ "id": team_id }))
                .await?;
            let team: Option<TeamTemplates> = at(&data, "team")?;
            let team = team.ok_or_else(|| LinearError::NotFound {
                kind: "Team",
                id: team_id.to_string(),
            })?;
            let templates = team.templates.map(|t| t.nodes).unwrap_or_default();
            object_with(
                "templates",
                Value::Array(templates.into_iter().map(Value::Object).collect()),
            )
        }
    };

    Ok(NodeOutput::Item(item))
}

async fn team_connection(
    client: &LinearClient,
    params: &ItemParams<'_>,
    query: &str,
    path: &str,
    key: &str,
) -> Result<NodeOutput> {
    let nodes = client
        .paginate(
            query,
            json!({ "id": params.required_str("teamId")? }),
            path,
            params.page_limit()?,
        )
        .await?;
    Ok(wrap_list(key, nodes))
}

async fn remove_member(client: &LinearClient, params: &ItemParams<'_>) -> Result<JsonObject> {
    let filter = json!({
        "team": { "id": { "eq": params.required_str("teamId")? } },
        "user": { "id": { "eq": params.required_str("userId")? } },
    });
    let data = client
        .request(FIND_MEMBERSHIP_QUERY, json!({ "filter": filter }))
        .await?;
    let memberships: Vec<MembershipRef> = at(&data, "teamMemberships.nodes")?;

    let Some(membership) = memberships.into_iter().next() else {
        let mut result = object_with("success", Value::Bool(false));
        result.insert("message".to_string(), json!("Membership not found"));
        return Ok(result);
    };

    let data = client
        .request(DELETE_MEMBERSHIP_MUTATION, json!({ "id": membership.id }))
        .await?;
    success_at(&data, "teamMembershipDelete")
}
