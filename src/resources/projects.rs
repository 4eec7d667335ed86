use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{PAGE_INFO, PROJECT_FIELDS, PROJECT_MILESTONE_FIELDS};
use super::{input_with, wrap_list, NodeOutput};
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{at, entity_at, success_at, JsonObject};
use crate::transport::client::LinearClient;

const PROJECT_MEMBERS: &str = r#"
    members {
        nodes {
            id
            name
            email
        }
    }
"#;

const LIST_PROJECTS_QUERY: &str = concatcp!(
    r#"
query ListProjects($first: Int, $after: String, $includeArchived: Boolean) {
    projects(first: $first, after: $after, includeArchived: $includeArchived) {
        nodes {"#,
    PROJECT_FIELDS,
    "        }",
    PAGE_INFO,
    r#"    }
}
"#
);

const GET_PROJECT_QUERY: &str = concatcp!(
    r#"
query GetProject($id: String!) {
    project(id: $id) {"#,
    PROJECT_FIELDS,
    PROJECT_MEMBERS,
    r#"    }
}
"#
);

const CREATE_PROJECT_MUTATION: &str = concatcp!(
    r#"
mutation CreateProject($input: ProjectCreateInput!) {
    projectCreate(input: $input) {
        success
        project {"#,
    PROJECT_FIELDS,
    r#"        }
    }
}
"#
);

const UPDATE_PROJECT_MUTATION: &str = concatcp!(
    r#"
mutation UpdateProject($id: String!, $input: ProjectUpdateInput!) {
    projectUpdate(id: $id, input: $input) {
        success
        project {"#,
    PROJECT_FIELDS,
    r#"        }
    }
}
"#
);

const DELETE_PROJECT_MUTATION: &str = r#"
mutation DeleteProject($id: String!) {
    projectDelete(id: $id) {
        success
    }
}
"#;

const ARCHIVE_PROJECT_MUTATION: &str = concatcp!(
    r#"
mutation ArchiveProject($id: String!) {
    projectArchive(id: $id) {
        success
        entity {"#,
    PROJECT_FIELDS,
    r#"        }
    }
}
"#
);

const PROJECT_MEMBER_IDS_QUERY: &str = r#"
query ProjectMemberIds($id: String!) {
    project(id: $id) {
        members {
            nodes {
                id
            }
        }
    }
}
"#;

const SET_PROJECT_MEMBERS_MUTATION: &str = concatcp!(
    r#"
mutation SetProjectMembers($id: String!, $input: ProjectUpdateInput!) {
    projectUpdate(id: $id, input: $input) {
        success
        project {"#,
    PROJECT_FIELDS,
    PROJECT_MEMBERS,
    r#"        }
    }
}
"#
);

const LIST_MILESTONES_QUERY: &str = concatcp!(
    r#"
query ProjectMilestones($projectId: String!, $first: Int, $after: String) {
    project(id: $projectId) {
        projectMilestones(first: $first, after: $after) {
            nodes {"#,
    PROJECT_MILESTONE_FIELDS,
    "            }",
    PAGE_INFO,
    r#"        }
    }
}
"#
);

const CREATE_MILESTONE_MUTATION: &str = concatcp!(
    r#"
mutation CreateProjectMilestone($input: ProjectMilestoneCreateInput!) {
    projectMilestoneCreate(input: $input) {
        success
        projectMilestone {"#,
    PROJECT_MILESTONE_FIELDS,
    r#"        }
    }
}
"#
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListProjects,
    GetProject,
    CreateProject,
    UpdateProject,
    DeleteProject,
    ArchiveProject,
    AddProjectMember,
    RemoveProjectMember,
    ListProjectMilestones,
    CreateProjectMilestone,
}

#[derive(Deserialize)]
struct MemberRef {
    id: String,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListProjects => {
            let filters = params.collection("filters")?;
            let include_archived = filters.get("includeArchived") == Some(&Value::Bool(true));
            let projects = client
                .paginate(
                    LIST_PROJECTS_QUERY,
                    json!({ "includeArchived": include_archived }),
                    "projects",
                    params.page_limit()?,
                )
                .await?;
            return Ok(wrap_list("projects", projects));
        }
        Operation::GetProject => {
            let project_id = params.required_str("projectId")?;
            let data = client
                .request(GET_PROJECT_QUERY, json!({ "id": project_id }))
                .await?;
            entity_at(&data, "project", "Project", project_id)?
        }
        Operation::CreateProject => {
            let input = input_with(
                json!({
                    "teamIds": params.string_list("teamIds")?,
                    "name": params.required_str("name")?,
                }),
                params.collection("additionalFields")?,
            );
            let data = client
                .request(CREATE_PROJECT_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "projectCreate.project")?
        }
        Operation::UpdateProject => {
            let variables = json!({
                "id": params.required_str("projectId")?,
                "input": input_with(Value::Null, params.collection("updateFields")?),
            });
            let data = client.request(UPDATE_PROJECT_MUTATION, variables).await?;
            at(&data, "projectUpdate.project")?
        }
        Operation::DeleteProject => {
            let data = client
                .request(
                    DELETE_PROJECT_MUTATION,
                    json!({ "id": params.required_str("projectId")? }),
                )
                .await?;
            success_at(&data, "projectDelete")?
        }
        Operation::ArchiveProject => {
            let data = client
                .request(
                    ARCHIVE_PROJECT_MUTATION,
                    json!({ "id": params.required_str("projectId")? }),
                )
                .await?;
            at(&data, "projectArchive.entity")?
        }
        Operation::AddProjectMember => {
            let user_id = params.required_str("userId")?;
            change_members(client, params.required_str("projectId")?, |ids| {
                if !ids.iter().any(|id| id == user_id) {
                    ids.push(user_id.to_string());
                }
            })
            .await?
        }
        Operation::RemoveProjectMember => {
            let user_id = params.required_str("userId")?;
            change_members(client, params.required_str("projectId")?, |ids| {
                ids.retain(|id| id != user_id);
            })
            .await?
        }
        Operation::ListProjectMilestones => {
            let milestones = client
                .paginate(
                    LIST_MILESTONES_QUERY,
                    json!({ "projectId": params.required_str("projectId")? }),
                    "project.projectMilestones",
                    params.page_limit()?,
                )
                .await?;
            return Ok(wrap_list("milestones", milestones));
        }
        Operation::CreateProjectMilestone => {
            let input = input_with(
                json!({
                    "projectId": params.required_str("projectId")?,
                    "name": params.required_str("milestoneName")?,
                }),
                params.collection("milestoneFields")?,
            );
            let data = client
                .request(CREATE_MILESTONE_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "projectMilestoneCreate.projectMilestone")?
        }
    };

    Ok(NodeOutput::Item(item))
}

/// Read the current member ids, apply `change`, and write the full list back.
async fn change_members(
    client: &LinearClient,
    project_id: &str,
    change: impl FnOnce(&mut Vec<String>),
) -> Result<JsonObject> {
    let data = client
        .request(PROJECT_MEMBER_IDS_QUERY, json!({ "id": project_id }))
        .await?;
    let members: Vec<MemberRef> = at(&data, "project.members.nodes")?;
    let mut member_ids: Vec<String> = members.into_iter().map(|member| member.id).collect();
    change(&mut member_ids);

    let variables = json!({ "id": project_id, "input": { "memberIds": member_ids } });
    let data = client.request(SET_PROJECT_MEMBERS_MUTATION, variables).await?;
    at(&data, "projectUpdate.project")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::JsonItems;
    use crate::resources::testing::{client, item, request_bodies};
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn run(server: &MockServer, operation: Operation, input: Value) -> Result<NodeOutput> {
        let items = JsonItems::from_value(input).unwrap();
        execute(&client(server), operation, &ItemParams::new(&items, 0)).await
    }

    async fn mount_members(server: &MockServer) {
        Mock::given(method("POST"))
            .and(body_string_contains("ProjectMemberIds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "project": { "members": { "nodes": [{ "id": "u1" }, { "id": "u2" }] } } }
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("SetProjectMembers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "projectUpdate": { "success": true, "project": { "id": "p1" } } }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn add_member_appends_to_existing_members() {
        let server = MockServer::start().await;
        mount_members(&server).await;

        let output = run(
            &server,
            Operation::AddProjectMember,
            json!({ "projectId": "p1", "userId": "u3" }),
        )
        .await
        .unwrap();

        assert_eq!(output, item(json!({ "id": "p1" })));
        let bodies = request_bodies(&server).await;
        assert_eq!(
            bodies[1]["variables"]["input"]["memberIds"],
            json!(["u1", "u2", "u3"])
        );
    }

    #[tokio::test]
    async fn adding_an_existing_member_does_not_duplicate() {
        let server = MockServer::start().await;
        mount_members(&server).await;

        run(
            &server,
            Operation::AddProjectMember,
            json!({ "projectId": "p1", "userId": "u1" }),
        )
        .await
        .unwrap();

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies[1]["variables"]["input"]["memberIds"], json!(["u1", "u2"]));
    }

    #[tokio::test]
    async fn remove_member_filters_the_user_out() {
        let server = MockServer::start().await;
        mount_members(&server).await;

        run(
            &server,
            Operation::RemoveProjectMember,
            json!({ "projectId": "p1", "userId": "u1" }),
        )
        .await
        .unwrap();

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies[1]["variables"]["input"]["memberIds"], json!(["u2"]));
    }

    #[tokio::test]
    async fn create_project_sends_team_ids_list() {
        let server = MockServer::start().await;
        crate::resources::testing::respond_with_data(
            &server,
            json!({ "projectCreate": { "success": true, "project": { "id": "p9" } } }),
        )
        .await;

        run(
            &server,
            Operation::CreateProject,
            json!({ "teamIds": ["t1", "t2"], "name": "Launch", "additionalFields": { "state": "planned" } }),
        )
        .await
        .unwrap();

        assert_eq!(
            request_bodies(&server).await[0]["variables"]["input"],
            json!({ "teamIds": ["t1", "t2"], "name": "Launch", "state": "planned" })
        );
    }

    #[tokio::test]
    async fn milestones_are_wrapped() {
        let server = MockServer::start().await;
        crate::resources::testing::respond_with_data(
            &server,
            json!({ "project": { "projectMilestones": {
                "nodes": [{ "id": "m1" }],
                "pageInfo": { "hasNextPage": false }
            } } }),
        )
        .await;

        let output = run(
            &server,
            Operation::ListProjectMilestones,
            json!({ "projectId": "p1", "returnAll": true }),
        )
        .await
        .unwrap();
        assert_eq!(output, item(json!({ "milestones": [{ "id": "m1" }] })));
    }
}
