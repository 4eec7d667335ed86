use const_format::concatcp;
use serde::Deserialize;
use serde_json::json;

use super::fields::{COMMENT_FIELDS, PAGE_INFO, REACTION_FIELDS};
use super::{wrap_list, NodeOutput};
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{at, entity_at, success_at};
use crate::transport::client::LinearClient;

const COMMENT_WITH_REACTIONS: &str = concatcp!(
    COMMENT_FIELDS,
    "    reactions {\n        nodes {",
    REACTION_FIELDS,
    "        }\n    }\n"
);

const LIST_COMMENTS_QUERY: &str = concatcp!(
    r#"
query IssueComments($issueId: String!, $first: Int, $after: String) {
    issue(id: $issueId) {
        comments(first: $first, after: $after) {
            nodes {"#,
    COMMENT_WITH_REACTIONS,
    "            }",
    PAGE_INFO,
    r#"        }
    }
}
"#
);

const GET_COMMENT_QUERY: &str = concatcp!(
    r#"
query GetComment($id: String!) {
    comment(id: $id) {"#,
    COMMENT_WITH_REACTIONS,
    r#"    }
}
"#
);

const CREATE_COMMENT_MUTATION: &str = concatcp!(
    r#"
mutation CreateComment($input: CommentCreateInput!) {
    commentCreate(input: $input) {
        success
        comment {"#,
    COMMENT_FIELDS,
    r#"        }
    }
}
"#
);

const UPDATE_COMMENT_MUTATION: &str = concatcp!(
    r#"
mutation UpdateComment($id: String!, $input: CommentUpdateInput!) {
    commentUpdate(id: $id, input: $input) {
        success
        comment {"#,
    COMMENT_FIELDS,
    r#"        }
    }
}
"#
);

const DELETE_COMMENT_MUTATION: &str = r#"
mutation DeleteComment($id: String!) {
    commentDelete(id: $id) {
        success
    }
}
"#;

const CREATE_REACTION_MUTATION: &str = concatcp!(
    r#"
mutation CreateReaction($input: ReactionCreateInput!) {
    reactionCreate(input: $input) {
        success
        reaction {"#,
    REACTION_FIELDS,
    r#"        }
    }
}
"#
);

const DELETE_REACTION_MUTATION: &str = r#"
mutation DeleteReaction($id: String!) {
    reactionDelete(id: $id) {
        success
    }
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListComments,
    GetComment,
    CreateComment,
    UpdateComment,
    DeleteComment,
    CreateReaction,
    DeleteReaction,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListComments => {
            let comments = client
                .paginate(
                    LIST_COMMENTS_QUERY,
                    json!({ "issueId": params.required_str("issueId")? }),
                    "issue.comments",
                    params.page_limit()?,
                )
                .await?;
            return Ok(wrap_list("comments", comments));
        }
        Operation::GetComment => {
            let comment_id = params.required_str("commentId")?;
            let data = client
                .request(GET_COMMENT_QUERY, json!({ "id": comment_id }))
                .await?;
            entity_at(&data, "comment", "Comment", comment_id)?
        }
        Operation::CreateComment => {
            let mut input = json!({
                "issueId": params.required_str("issueId")?,
                "body": params.required_str("body")?,
            });
            // Only a reply parent is taken from the optional fields.
            let additional = params.collection("additionalFields")?;
            if let Some(parent_id) = additional
                .get("parentId")
                .and_then(|v| v.as_str())
                .filter(|id| !id.is_empty())
            {
                input["parentId"] = json!(parent_id);
            }
            let data = client
                .request(CREATE_COMMENT_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "commentCreate.comment")?
        }
        Operation::UpdateComment => {
            let variables = json!({
                "id": params.required_str("commentId")?,
                "input": { "body": params.required_str("body")? },
            });
            let data = client.request(UPDATE_COMMENT_MUTATION, variables).await?;
            at(&data, "commentUpdate.comment")?
        }
        Operation::DeleteComment => {
            let data = client
                .request(
                    DELETE_COMMENT_MUTATION,
                    json!({ "id": params.required_str("commentId")? }),
                )
                .await?;
            success_at(&data, "commentDelete")?
        }
        Operation::CreateReaction => {
            let input = json!({
                "commentId": params.required_str("commentId")?,
                "emoji": params.required_str("emoji")?,
            });
            let data = client
                .request(CREATE_REACTION_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "reactionCreate.reaction")?
        }
        Operation::DeleteReaction => {
            let data = client
                .request(
                    DELETE_REACTION_MUTATION,
                    json!({ "id": params.required_str("reactionId")? }),
                )
                .await?;
            success_at(&data, "reactionDelete")?
        }
    };

    Ok(NodeOutput::Item(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::JsonItems;
    use crate::resources::testing::{client, item, request_bodies, respond_with_data};
    use serde_json::Value;
    use wiremock::MockServer;

    async fn run(server: &MockServer, operation: Operation, input: Value) -> Result<NodeOutput> {
        let items = JsonItems::from_value(input).unwrap();
        execute(&client(server), operation, &ItemParams::new(&items, 0)).await
    }

    #[test]
    fn comment_queries_embed_reactions() {
        assert!(LIST_COMMENTS_QUERY.contains("reactions {"));
        assert!(LIST_COMMENTS_QUERY.contains("emoji"));
        assert!(GET_COMMENT_QUERY.contains("emoji"));
        assert!(!CREATE_COMMENT_MUTATION.contains("reactions"));
    }

    #[tokio::test]
    async fn list_comments_reads_the_issue_connection() {
        let server = MockServer::start().await;
        respond_with_data(
            &server,
            json!({ "issue": { "comments": {
                "nodes": [{ "id": "c1", "body": "hi" }],
                "pageInfo": { "hasNextPage": false, "endCursor": null }
            } } }),
        )
        .await;

        let output = run(&server, Operation::ListComments, json!({ "issueId": "i1" }))
            .await
            .unwrap();
        assert_eq!(output, item(json!({ "comments": [{ "id": "c1", "body": "hi" }] })));
        assert_eq!(request_bodies(&server).await[0]["variables"]["issueId"], "i1");
    }

    #[tokio::test]
    async fn reply_parent_is_forwarded() {
        let server = MockServer::start().await;
        respond_with_data(
            &server,
            json!({ "commentCreate": { "success": true, "comment": { "id": "c2" } } }),
        )
        .await;

        run(
            &server,
            Operation::CreateComment,
            json!({
                "issueId": "i1",
                "body": "thanks",
                "additionalFields": { "parentId": "c1", "ignored": true }
            }),
        )
        .await
        .unwrap();

        assert_eq!(
            request_bodies(&server).await[0]["variables"]["input"],
            json!({ "issueId": "i1", "body": "thanks", "parentId": "c1" })
        );
    }

    #[tokio::test]
    async fn delete_reaction_returns_success_flag() {
        let server = MockServer::start().await;
        respond_with_data(&server, json!({ "reactionDelete": { "success": true } })).await;

        let output = run(&server, Operation::DeleteReaction, json!({ "reactionId": "r1" }))
            .await
            .unwrap();
        assert_eq!(output, item(json!({ "success": true })));
    }
}
