use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{ISSUE_FIELDS, PAGE_INFO};
use super::{input_with, with_filter, wrap_list, NodeOutput};
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{at, entity_at, success_at, JsonObject};
use crate::transport::client::LinearClient;
use crate::transport::filter::build_filter;

const LIST_ISSUES_QUERY: &str = concatcp!(
    r#"
query ListIssues($first: Int, $after: String, $filter: IssueFilter, $includeArchived: Boolean) {
    issues(first: $first, after: $after, filter: $filter, includeArchived: $includeArchived) {
        nodes {"#,
    ISSUE_FIELDS,
    "        }",
    PAGE_INFO,
    r#"    }
}
"#
);

const GET_ISSUE_QUERY: &str = concatcp!(
    r#"
query GetIssue($id: String!) {
    issue(id: $id) {"#,
    ISSUE_FIELDS,
    r#"    }
}
"#
);

const CREATE_ISSUE_MUTATION: &str = concatcp!(
    r#"
mutation CreateIssue($input: IssueCreateInput!) {
    issueCreate(input: $input) {
        success
        issue {"#,
    ISSUE_FIELDS,
    r#"        }
    }
}
"#
);

const UPDATE_ISSUE_MUTATION: &str = concatcp!(
    r#"
mutation UpdateIssue($id: String!, $input: IssueUpdateInput!) {
    issueUpdate(id: $id, input: $input) {
        success
        issue {"#,
    ISSUE_FIELDS,
    r#"        }
    }
}
"#
);

const DELETE_ISSUE_MUTATION: &str = r#"
mutation DeleteIssue($id: String!) {
    issueDelete(id: $id) {
        success
    }
}
"#;

const ARCHIVE_ISSUE_MUTATION: &str = concatcp!(
    r#"
mutation ArchiveIssue($id: String!) {
    issueArchive(id: $id) {
        success
        entity {"#,
    ISSUE_FIELDS,
    r#"        }
    }
}
"#
);

const UNARCHIVE_ISSUE_MUTATION: &str = concatcp!(
    r#"
mutation UnarchiveIssue($id: String!) {
    issueUnarchive(id: $id) {
        success
        entity {"#,
    ISSUE_FIELDS,
    r#"        }
    }
}
"#
);

const ADD_LABEL_MUTATION: &str = concatcp!(
    r#"
mutation IssueAddLabel($id: String!, $labelId: String!) {
    issueAddLabel(id: $id, labelId: $labelId) {
        success
        issue {"#,
    ISSUE_FIELDS,
    r#"        }
    }
}
"#
);

const REMOVE_LABEL_MUTATION: &str = concatcp!(
    r#"
mutation IssueRemoveLabel($id: String!, $labelId: String!) {
    issueRemoveLabel(id: $id, labelId: $labelId) {
        success
        issue {"#,
    ISSUE_FIELDS,
    r#"        }
    }
}
"#
);

const SUBSCRIBE_MUTATION: &str = concatcp!(
    r#"
mutation IssueSubscribe($id: String!, $userId: String!) {
    issueSubscribe(id: $id, userId: $userId) {
        success
        issue {"#,
    ISSUE_FIELDS,
    r#"        }
    }
}
"#
);

const UNSUBSCRIBE_MUTATION: &str = concatcp!(
    r#"
mutation IssueUnsubscribe($id: String!, $userId: String!) {
    issueUnsubscribe(id: $id, userId: $userId) {
        success
        issue {"#,
    ISSUE_FIELDS,
    r#"        }
    }
}
"#
);

const CREATE_RELATION_MUTATION: &str = r#"
mutation IssueRelationCreate($input: IssueRelationCreateInput!) {
    issueRelationCreate(input: $input) {
        success
        issueRelation {
            id
            type
            issue {
                id
                identifier
            }
            relatedIssue {
                id
                identifier
            }
        }
    }
}
"#;

const ISSUE_RELATIONS_QUERY: &str = r#"
query IssueRelations($id: String!) {
    issue(id: $id) {
        relations {
            nodes {
                id
                relatedIssue {
                    id
                }
            }
        }
    }
}
"#;

const DELETE_RELATION_MUTATION: &str = r#"
mutation IssueRelationDelete($id: String!) {
    issueRelationDelete(id: $id) {
        success
    }
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListIssues,
    GetIssue,
    CreateIssue,
    UpdateIssue,
    DeleteIssue,
    ArchiveIssue,
    UnarchiveIssue,
    AddIssueLabel,
    RemoveIssueLabel,
    AddIssueSubscriber,
    RemoveIssueSubscriber,
    SetIssuePriority,
    SetIssueState,
    AssignIssue,
    UnassignIssue,
    MoveIssueToProject,
    MoveIssueToTeam,
    SetIssueParent,
    AddIssueRelation,
    RemoveIssueRelation,
}

#[derive(Deserialize)]
struct RelationRef {
    id: String,
    #[serde(rename = "relatedIssue")]
    related_issue: IdRef,
}

#[derive(Deserialize)]
struct IdRef {
    id: String,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListIssues => return list(client, params).await,
        Operation::GetIssue => get(client, params.required_str("issueId")?).await?,
        Operation::CreateIssue => {
            let input = input_with(
                json!({
                    "teamId": params.required_str("teamId")?,
                    "title": params.required_str("title")?,
                }),
                params.collection("additionalFields")?,
            );
            let data = client
                .request(CREATE_ISSUE_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "issueCreate.issue")?
        }
        Operation::UpdateIssue => {
            let input = input_with(Value::Null, params.collection("updateFields")?);
            update(client, params.required_str("issueId")?, Value::Object(input)).await?
        }
        Operation::DeleteIssue => {
            let data = client
                .request(DELETE_ISSUE_MUTATION, json!({ "id": params.required_str("issueId")? }))
                .await?;
            success_at(&data, "issueDelete")?
        }
        Operation::ArchiveIssue => {
            let data = client
                .request(ARCHIVE_ISSUE_MUTATION, json!({ "id": params.required_str("issueId")? }))
                .await?;
            at(&data, "issueArchive.entity")?
        }
        Operation::UnarchiveIssue => {
            let data = client
                .request(UNARCHIVE_ISSUE_MUTATION, json!({ "id": params.required_str("issueId")? }))
                .await?;
            at(&data, "issueUnarchive.entity")?
        }
        Operation::AddIssueLabel => {
            label_change(client, ADD_LABEL_MUTATION, "issueAddLabel", params).await?
        }
        Operation::RemoveIssueLabel => {
            label_change(client, REMOVE_LABEL_MUTATION, "issueRemoveLabel", params).await?
        }
        Operation::AddIssueSubscriber => {
            subscription_change(client, SUBSCRIBE_MUTATION, "issueSubscribe", params).await?
        }
        Operation::RemoveIssueSubscriber => {
            subscription_change(client, UNSUBSCRIBE_MUTATION, "issueUnsubscribe", params).await?
        }
        Operation::SetIssuePriority => {
            let priority = params.required_i64("priority")?;
            update(client, params.required_str("issueId")?, json!({ "priority": priority })).await?
        }
        Operation::SetIssueState => {
            let state_id = params.required_str("stateId")?;
            update(client, params.required_str("issueId")?, json!({ "stateId": state_id })).await?
        }
        Operation::AssignIssue => {
            let user_id = params.required_str("userId")?;
            update(client, params.required_str("issueId")?, json!({ "assigneeId": user_id })).await?
        }
        Operation::UnassignIssue => {
            update(client, params.required_str("issueId")?, json!({ "assigneeId": null })).await?
        }
        Operation::MoveIssueToProject => {
            let project_id = params.required_str("projectId")?;
            update(client, params.required_str("issueId")?, json!({ "projectId": project_id })).await?
        }
        Operation::MoveIssueToTeam => {
            let team_id = params.required_str("teamId")?;
            update(client, params.required_str("issueId")?, json!({ "teamId": team_id })).await?
        }
        Operation::SetIssueParent => {
            let parent_id = params.required_str("parentId")?;
            update(client, params.required_str("issueId")?, json!({ "parentId": parent_id })).await?
        }
        Operation::AddIssueRelation => {
            let input = json!({
                "issueId": params.required_str("issueId")?,
                "relatedIssueId": params.required_str("relatedIssueId")?,
                "type": params.required_str("relationType")?,
            });
            let data = client
                .request(CREATE_RELATION_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "issueRelationCreate.issueRelation")?
        }
        Operation::RemoveIssueRelation => remove_relation(client, params).await?,
    };

    Ok(NodeOutput::Item(item))
}

async fn list(client: &LinearClient, params: &ItemParams<'_>) -> Result<NodeOutput> {
    let filters = params.collection("filters")?;
    let include_archived = filters.get("includeArchived") == Some(&Value::Bool(true));
    let variables = with_filter(
        json!({ "includeArchived": include_archived }),
        build_filter(&filters),
    );

    let issues = client
        .paginate(LIST_ISSUES_QUERY, variables, "issues", params.page_limit()?)
        .await?;
    Ok(wrap_list("issues", issues))
}

async fn get(client: &LinearClient, issue_id: &str) -> Result<JsonObject> {
    // Linear resolves both UUIDs and `ENG-123` style identifiers.
    let data = client.request(GET_ISSUE_QUERY, json!({ "id": issue_id })).await?;
    entity_at(&data, "issue", "Issue", issue_id)
}

/// `issueUpdate` with a partial input, shared by the single-field setters.
pub(crate) async fn update(client: &LinearClient, issue_id: &str, input: Value) -> Result<JsonObject> {
    let data = client
        .request(UPDATE_ISSUE_MUTATION, json!({ "id": issue_id, "input": input }))
        .await?;
    at(&data, "issueUpdate.issue")
}

async fn label_change(
    client: &LinearClient,
    mutation: &str,
    payload: &str,
    params: &ItemParams<'_>,
) -> Result<JsonObject> {
    let variables = json!({
        "id": params.required_str("issueId")?,
        "labelId": params.required_str("labelId")?,
    });
    let data = client.request(mutation, variables).await?;
    at(&data, &format!("{payload}.issue"))
}

async fn subscription_change(
    client: &LinearClient,
    mutation: &str,
    payload: &str,
    params: &ItemParams<'_>,
) -> Result<JsonObject> {
    let variables = json!({
        "id": params.required_str("issueId")?,
        "userId": params.required_str("userId")?,
    });
    let data = client.request(mutation, variables).await?;
    at(&data, &format!("{payload}.issue"))
}

async fn remove_relation(client: &LinearClient, params: &ItemParams<'_>) -> Result<JsonObject> {
    let issue_id = params.required_str("issueId")?;
    let related_issue_id = params.required_str("relatedIssueId")?;

    let data = client
        .request(ISSUE_RELATIONS_QUERY, json!({ "id": issue_id }))
        .await?;
    let relations: Vec<RelationRef> = at(&data, "issue.relations.nodes")?;

    let Some(relation) = relations
        .into_iter()
        .find(|relation| relation.related_issue.id == related_issue_id)
    else {
        let mut result = JsonObject::new();
        result.insert("success".to_string(), Value::Bool(false));
        result.insert("message".to_string(), json!("Relation not found"));
        return Ok(result);
    };

    let data = client
        .request(DELETE_RELATION_MUTATION, json!({ "id": relation.id }))
        .await?;
    success_at(&data, "issueRelationDelete")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::JsonItems;
    use crate::resources::testing::client;
    use wiremock::matchers::{body_partial_json, body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn items(value: Value) -> JsonItems {
        JsonItems::from_value(value).unwrap()
    }

    async fn run(server: &MockServer, operation: Operation, input: Value) -> Result<NodeOutput> {
        let items = items(input);
        execute(&client(server), operation, &ItemParams::new(&items, 0)).await
    }

    #[tokio::test]
    async fn list_issues_sends_filter_and_archived_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "variables": {
                    "first": 5,
                    "includeArchived": true,
                    "filter": { "priority": { "gte": 2, "lte": 4 }, "team": { "id": { "eq": "t1" } } }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "issues": {
                        "nodes": [{ "id": "i1" }, { "id": "i2" }],
                        "pageInfo": { "hasNextPage": false, "endCursor": null }
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = run(
            &server,
            Operation::ListIssues,
            json!({
                "limit": 5,
                "filters": { "priorityGte": 2, "priorityLte": 4, "teamId": "t1", "includeArchived": true }
            }),
        )
        .await
        .unwrap();

        assert_eq!(
            output,
            NodeOutput::Item(
                json!({ "issues": [{ "id": "i1" }, { "id": "i2" }] })
                    .as_object()
                    .unwrap()
                    .clone()
            )
        );
    }

    #[tokio::test]
    async fn list_issues_omits_empty_filter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "issues": { "nodes": [], "pageInfo": { "hasNextPage": false } } }
            })))
            .mount(&server)
            .await;

        run(&server, Operation::ListIssues, json!({})).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert!(body["variables"].get("filter").is_none());
        assert_eq!(body["variables"]["includeArchived"], json!(false));
    }

    #[tokio::test]
    async fn missing_issue_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "issue": null } })),
            )
            .mount(&server)
            .await;

        let err = run(&server, Operation::GetIssue, json!({ "issueId": "ENG-404" }))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Issue not found: ENG-404");
    }

    #[tokio::test]
    async fn get_issue_passes_either_id_form_through() {
        let server = MockServer::start().await;
        for id in ["ENG-123", "550e8400-e29b-41d4-a716-446655440000"] {
            Mock::given(method("POST"))
                .and(body_partial_json(json!({ "variables": { "id": id } })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "data": { "issue": { "id": "i1", "identifier": "ENG-123" } }
                })))
                .expect(1)
                .mount(&server)
                .await;

            let output = run(&server, Operation::GetIssue, json!({ "issueId": id }))
                .await
                .unwrap();
            assert_eq!(
                output,
                NodeOutput::Item(
                    json!({ "id": "i1", "identifier": "ENG-123" })
                        .as_object()
                        .cloned()
                        .unwrap()
                )
            );
        }
    }

    #[tokio::test]
    async fn create_issue_cleans_additional_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("issueCreate"))
            .and(body_partial_json(json!({
                "variables": { "input": { "teamId": "t1", "title": "Crash", "priority": 0 } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "issueCreate": { "success": true, "issue": { "id": "i1", "title": "Crash" } } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = run(
            &server,
            Operation::CreateIssue,
            json!({
                "teamId": "t1",
                "title": "Crash",
                "additionalFields": { "priority": 0, "description": "", "assigneeId": null }
            }),
        )
        .await
        .unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let input = body["variables"]["input"].as_object().unwrap();
        assert!(!input.contains_key("description"));
        assert!(!input.contains_key("assigneeId"));
        assert!(matches!(output, NodeOutput::Item(issue) if issue["id"] == "i1"));
    }

    #[tokio::test]
    async fn unassign_sends_explicit_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "variables": { "id": "i1", "input": { "assigneeId": null } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "issueUpdate": { "success": true, "issue": { "id": "i1", "assignee": null } } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        run(&server, Operation::UnassignIssue, json!({ "issueId": "i1" }))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn remove_relation_without_match_reports_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("IssueRelations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "issue": { "relations": { "nodes": [
                    { "id": "r1", "relatedIssue": { "id": "other" } }
                ] } } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = run(
            &server,
            Operation::RemoveIssueRelation,
            json!({ "issueId": "i1", "relatedIssueId": "i2" }),
        )
        .await
        .unwrap();

        assert_eq!(
            output,
            NodeOutput::Item(
                json!({ "success": false, "message": "Relation not found" })
                    .as_object()
                    .unwrap()
                    .clone()
            )
        );
    }

    #[tokio::test]
    async fn remove_relation_deletes_the_matching_relation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("IssueRelations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "issue": { "relations": { "nodes": [
                    { "id": "r1", "relatedIssue": { "id": "other" } },
                    { "id": "r2", "relatedIssue": { "id": "i2" } }
                ] } } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("issueRelationDelete"))
            .and(body_partial_json(json!({ "variables": { "id": "r2" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "issueRelationDelete": { "success": true } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let output = run(
            &server,
            Operation::RemoveIssueRelation,
            json!({ "issueId": "i1", "relatedIssueId": "i2" }),
        )
        .await
        .unwrap();
        assert!(matches!(output, NodeOutput::Item(result) if result["success"] == true));
    }

    #[tokio::test]
    async fn priority_must_be_an_integer() {
        let server = MockServer::start().await;
        let err = run(
            &server,
            Operation::SetIssuePriority,
            json!({ "issueId": "i1", "priority": "high" }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_PARAMETER");
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
