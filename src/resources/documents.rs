use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{DOCUMENT_FIELDS, PAGE_INFO};
use super::{input_with, wrap_list, NodeOutput};
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{at, entity_at, success_at, JsonObject};
use crate::transport::client::LinearClient;

const PROJECT_DOCUMENTS_QUERY: &str = concatcp!(
    r#"
query ProjectDocuments($id: String!, $first: Int, $after: String) {
    project(id: $id) {
        documents(first: $first, after: $after) {
            nodes {"#,
    DOCUMENT_FIELDS,
    "            }",
    PAGE_INFO,
    r#"        }
    }
}
"#
);

const LIST_DOCUMENTS_QUERY: &str = concatcp!(
    r#"
query ListDocuments($first: Int, $after: String) {
    documents(first: $first, after: $after) {
        nodes {"#,
    DOCUMENT_FIELDS,
    "        }",
    PAGE_INFO,
    r#"    }
}
"#
);

const GET_DOCUMENT_QUERY: &str = concatcp!(
    r#"
query GetDocument($id: String!) {
    document(id: $id) {"#,
    DOCUMENT_FIELDS,
    r#"    }
}
"#
);

const CREATE_DOCUMENT_MUTATION: &str = concatcp!(
    r#"
mutation CreateDocument($input: DocumentCreateInput!) {
    documentCreate(input: $input) {
        success
        document {"#,
    DOCUMENT_FIELDS,
    r#"        }
    }
}
"#
);

const UPDATE_DOCUMENT_MUTATION: &str = concatcp!(
    r#"
mutation UpdateDocument($id: String!, $input: DocumentUpdateInput!) {
    documentUpdate(id: $id, input: $input) {
        success
        document {"#,
    DOCUMENT_FIELDS,
    r#"        }
    }
}
"#
);

const DELETE_DOCUMENT_MUTATION: &str = r#"
mutation DeleteDocument($id: String!) {
    documentDelete(id: $id) {
        success
    }
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListDocuments,
    GetDocument,
    CreateDocument,
    UpdateDocument,
    DeleteDocument,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListDocuments => {
            let limit = params.page_limit()?;
            let documents: Vec<JsonObject> = match params.optional_str("projectId")? {
                Some(project_id) => {
                    client
                        .paginate(
                            PROJECT_DOCUMENTS_QUERY,
                            json!({ "id": project_id }),
                            "project.documents",
                            limit,
                        )
                        .await?
                }
                None => {
                    client
                        .paginate(LIST_DOCUMENTS_QUERY, json!({}), "documents", limit)
                        .await?
                }
            };
            return Ok(wrap_list("documents", documents));
        }
        Operation::GetDocument => {
            let document_id = params.required_str("documentId")?;
            let data = client
                .request(GET_DOCUMENT_QUERY, json!({ "id": document_id }))
                .await?;
            entity_at(&data, "document", "Document", document_id)?
        }
        Operation::CreateDocument => {
            let input = input_with(
                json!({
                    "projectId": params.required_str("projectId")?,
                    "title": params.required_str("title")?,
                }),
                params.collection("additionalFields")?,
            );
            let data = client
                .request(CREATE_DOCUMENT_MUTATION, json!({ "input": input }))
                .await?;
            at(&data, "documentCreate.document")?
        }
        Operation::UpdateDocument => {
            let variables = json!({
                "id": params.required_str("documentId")?,
                "input": input_with(Value::Null, params.collection("updateFields")?),
            });
            let data = client.request(UPDATE_DOCUMENT_MUTATION, variables).await?;
            at(&data, "documentUpdate.document")?
        }
        Operation::DeleteDocument => {
            let data = client
                .request(
                    DELETE_DOCUMENT_MUTATION,
                    json!({ "id": params.required_str("documentId")? }),
                )
                .await?;
            success_at(&data, "documentDelete")?
        }
    };

    Ok(NodeOutput::Item(item))
}
