use const_format::concatcp;
use serde::Deserialize;
use serde_json::json;

use super::fields::{INTEGRATION_FIELDS, PAGE_INFO};
use super::{wrap_list, NodeOutput};
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{entity_at, success_at};
use crate::transport::client::LinearClient;

const LIST_INTEGRATIONS_QUERY: &str = concatcp!(
    r#"
query ListIntegrations($first: Int, $after: String) {
    integrations(first: $first, after: $after) {
        nodes {"#,
    INTEGRATION_FIELDS,
    "        }",
    PAGE_INFO,
    r#"    }
}
"#
);

const GET_INTEGRATION_QUERY: &str = concatcp!(
    r#"
query GetIntegration($id: String!) {
    integration(id: $id) {"#,
    INTEGRATION_FIELDS,
    r#"    }
}
"#
);

const DELETE_INTEGRATION_MUTATION: &str = r#"
mutation DeleteIntegration($id: String!) {
    integrationDelete(id: $id) {
        success
    }
}
"#;

const LIST_TEMPLATES_QUERY: &str = concatcp!(
    r#"
query IntegrationTemplates($first: Int, $after: String) {
    integrationTemplates(first: $first, after: $after) {
        nodes {
            id
            description
            logoUrl
            service
            templateUrl
            createdAt
            updatedAt
        }"#,
    PAGE_INFO,
    r#"    }
}
"#
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListIntegrations,
    GetIntegration,
    DeleteIntegration,
    ListIntegrationTemplates,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    match operation {
        Operation::ListIntegrations => {
            let integrations = client
                .paginate(
                    LIST_INTEGRATIONS_QUERY,
                    json!({}),
                    "integrations",
                    params.page_limit()?,
                )
                .await?;
            Ok(wrap_list("integrations", integrations))
        }
        Operation::GetIntegration => {
            let integration_id = params.required_str("integrationId")?;
            let data = client
                .request(GET_INTEGRATION_QUERY, json!({ "id": integration_id }))
                .await?;
            Ok(NodeOutput::Item(entity_at(
                &data,
                "integration",
                "Integration",
                integration_id,
            )?))
        }
        Operation::DeleteIntegration => {
            let data = client
                .request(
                    DELETE_INTEGRATION_MUTATION,
                    json!({ "id": params.required_str("integrationId")? }),
                )
                .await?;
            Ok(NodeOutput::Item(success_at(&data, "integrationDelete")?))
        }
        Operation::ListIntegrationTemplates => {
            let templates = client
                .paginate(
                    LIST_TEMPLATES_QUERY,
                    json!({}),
                    "integrationTemplates",
                    params.page_limit()?,
                )
                .await?;
            Ok(wrap_list("templates", templates))
        }
    }
}
