use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{ATTACHMENT_FIELDS, PAGE_INFO};
use super::{input_with, wrap_list, NodeOutput};
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{at, entity_at, success_at, JsonObject};
use crate::transport::client::LinearClient;
use crate::transport::values::parse_json_string;

const LIST_ATTACHMENTS_QUERY: &str = concatcp!(
    r#"
query IssueAttachments($id: String!, $first: Int, $after: String) {
    issue(id: $id) {
        attachments(first: $first, after: $after) {
            nodes {"#,
    ATTACHMENT_FIELDS,
    "            }",
    PAGE_INFO,
    r#"        }
    }
}
"#
);

const GET_ATTACHMENT_QUERY: &str = concatcp!(
    r#"
query GetAttachment($id: String!) {
    attachment(id: $id) {"#,
    ATTACHMENT_FIELDS,
    r#"    }
}
"#
);

const CREATE_ATTACHMENT_MUTATION: &str = concatcp!(
    r#"
mutation CreateAttachment($input: AttachmentCreateInput!) {
    attachmentCreate(input: $input) {
        success
        attachment {"#,
    ATTACHMENT_FIELDS,
    r#"        }
    }
}
"#
);

const UPDATE_ATTACHMENT_MUTATION: &str = concatcp!(
    r#"
mutation UpdateAttachment($id: String!, $input: AttachmentUpdateInput!) {
    attachmentUpdate(id: $id, input: $input) {
        success
        attachment {"#,
    ATTACHMENT_FIELDS,
    r#"        }
    }
}
"#
);

const DELETE_ATTACHMENT_MUTATION: &str = r#"
mutation DeleteAttachment($id: String!) {
    attachmentDelete(id: $id) {
        success
    }
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListAttachments,
    GetAttachment,
    CreateAttachment,
    UpdateAttachment,
    DeleteAttachment,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListAttachments => {
            let attachments = client
                .paginate(
                    LIST_ATTACHMENTS_QUERY,
                    json!({ "id": params.required_str("issueId")? }),
                    "issue.attachments",
                    params.page_limit()?,
                )
                .await?;
            return Ok(wrap_list("attachments", attachments));
        }
        Operation::GetAttachment => {
            let attachment_id = params.required_str("attachmentId")?;
            let data = client
                .request(GET_ATTACHMENT_QUERY, json!({ "id": attachment_id }))
                .await?;
            entity_at(&data, "attachment", "Attachment", attachment_id)?
        }
        Operation::CreateAttachment => {
            let input = input_with(
                json!({
                    "issueId": params.required_str("issueId")?,
                    "url": params.required_str("url")?,
                    "title": params.required_str("title")?,
                }),
                with_parsed_metadata(params.collection("additionalFields")?),
            );
            let data = client
                .request(CREATE_ATTACHMENT_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "attachmentCreate.attachment")?
        }
        Operation::UpdateAttachment => {
            let variables = json!({
                "id": params.required_str("attachmentId")?,
                "input": input_with(Value::Null, with_parsed_metadata(params.collection("updateFields")?)),
            });
            let data = client.request(UPDATE_ATTACHMENT_MUTATION, variables).await?;
            at(&data, "attachmentUpdate.attachment")?
        }
        Operation::DeleteAttachment => {
            let data = client
                .request(
                    DELETE_ATTACHMENT_MUTATION,
                    json!({ "id": params.required_str("attachmentId")? }),
                )
                .await?;
            success_at(&data, "attachmentDelete")?
        }
    };

    Ok(NodeOutput::Item(item))
}

/// Metadata typed into a text field arrives as a JSON string.
fn with_parsed_metadata(mut fields: JsonObject) -> JsonObject {
    if let Some(metadata) = fields.remove("metadata") {
        fields.insert("metadata".to_string(), parse_json_string(metadata));
    }
    fields
}
