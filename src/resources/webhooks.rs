//! Webhook CRUD. The helpers below the dispatcher are shared with the
//! trigger's registration lifecycle.

use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{PAGE_INFO, WEBHOOK_FIELDS};
use super::NodeOutput;
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{at, entity_at, entity_or_success, JsonObject};
use crate::transport::client::{LinearClient, PageLimit};
use crate::transport::filter::is_unset;

const LIST_WEBHOOKS_QUERY: &str = concatcp!(
    r#"
query ListWebhooks($first: Int, $after: String) {
    webhooks(first: $first, after: $after) {
        nodes {"#,
    WEBHOOK_FIELDS,
    "        }",
    PAGE_INFO,
    r#"    }
}
"#
);

const GET_WEBHOOK_QUERY: &str = concatcp!(
    r#"
query GetWebhook($id: String!) {
    webhook(id: $id) {"#,
    WEBHOOK_FIELDS,
    r#"    }
}
"#
);

const CREATE_WEBHOOK_MUTATION: &str = concatcp!(
    r#"
mutation CreateWebhook($input: WebhookCreateInput!) {
    webhookCreate(input: $input) {
        success
        webhook {"#,
    WEBHOOK_FIELDS,
    r#"        }
    }
}
"#
);

const UPDATE_WEBHOOK_MUTATION: &str = concatcp!(
    r#"
mutation UpdateWebhook($id: String!, $input: WebhookUpdateInput!) {
    webhookUpdate(id: $id, input: $input) {
        success
        webhook {"#,
    WEBHOOK_FIELDS,
    r#"        }
    }
}
"#
);

const DELETE_WEBHOOK_MUTATION: &str = r#"
mutation DeleteWebhook($id: String!) {
    webhookDelete(id: $id) {
        success
    }
}
"#;

const WEBHOOK_REF_QUERY: &str = r#"
query WebhookRef($id: String!) {
    webhook(id: $id) {
        id
        url
        enabled
    }
}
"#;

const WEBHOOK_REFS_QUERY: &str = concatcp!(
    r#"
query WebhookRefs($first: Int, $after: String) {
    webhooks(first: $first, after: $after) {
        nodes {
            id
            url
            enabled
        }"#,
    PAGE_INFO,
    r#"    }
}
"#
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListWebhooks,
    GetWebhook,
    CreateWebhook,
    UpdateWebhook,
    DeleteWebhook,
}

/// The identifying fields of a registered webhook.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookRef {
    pub id: String,
    pub url: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

/// Input for `webhookCreate`. Without a team the webhook covers all public teams.
#[derive(Debug, Clone)]
pub struct NewWebhook {
    pub url: String,
    pub resource_types: Vec<String>,
    pub enabled: bool,
    pub team_id: Option<String>,
    pub label: Option<String>,
    pub secret: Option<String>,
}

impl NewWebhook {
    fn input(&self) -> JsonObject {
        let mut input = JsonObject::new();
        input.insert("url".to_string(), Value::String(self.url.clone()));
        input.insert("resourceTypes".to_string(), json!(self.resource_types));
        input.insert("enabled".to_string(), Value::Bool(self.enabled));
        match non_empty(&self.team_id) {
            Some(team_id) => input.insert("teamId".to_string(), Value::String(team_id)),
            None => input.insert("allPublicTeams".to_string(), Value::Bool(true)),
        };
        if let Some(label) = non_empty(&self.label) {
            input.insert("label".to_string(), Value::String(label));
        }
        if let Some(secret) = non_empty(&self.secret) {
            input.insert("secret".to_string(), Value::String(secret));
        }
        input
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// `webhookCreate` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedWebhook {
    pub success: bool,
    pub webhook: Option<JsonObject>,
}

impl CreatedWebhook {
    pub fn id(&self) -> Option<&str> {
        self.webhook.as_ref()?.get("id")?.as_str()
    }
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListWebhooks => {
            let webhooks: Vec<JsonObject> = client
                .paginate(LIST_WEBHOOKS_QUERY, json!({}), "webhooks", params.page_limit()?)
                .await?;
            return Ok(NodeOutput::Items(webhooks));
        }
        Operation::GetWebhook => {
            let webhook_id = params.required_str("webhookId")?;
            let data = client.request(GET_WEBHOOK_QUERY, json!({ "id": webhook_id })).await?;
            entity_at(&data, "webhook", "Webhook", webhook_id)?
        }
        Operation::CreateWebhook => {
            let new_webhook = NewWebhook {
                url: params.required_str("url")?.to_string(),
                resource_types: params.string_list("resourceTypes")?,
                enabled: params.bool_or("enabled", true)?,
                team_id: params.optional_str("teamId")?.map(String::from),
                label: params.optional_str("label")?.map(String::from),
                secret: params.optional_str("secret")?.map(String::from),
            };
            let data = client
                .request(CREATE_WEBHOOK_MUTATION, json!({ "input": new_webhook.input() }))
                .await?;
            entity_or_success(&data, "webhookCreate", "webhook")?
        }
        Operation::UpdateWebhook => {
            let variables = json!({
                "id": params.required_str("webhookId")?,
                "input": update_input(&params.collection("updateFields")?),
            });
            let data = client.request(UPDATE_WEBHOOK_MUTATION, variables).await?;
            entity_or_success(&data, "webhookUpdate", "webhook")?
        }
        Operation::DeleteWebhook => {
            let webhook_id = params.required_str("webhookId")?;
            let success = delete(client, webhook_id).await?;
            let mut result = JsonObject::new();
            result.insert("success".to_string(), Value::Bool(success));
            result.insert("id".to_string(), Value::String(webhook_id.to_string()));
            result
        }
    };

    Ok(NodeOutput::Item(item))
}

/// Only the fields that were actually given. An empty label is kept so a
/// label can be cleared; url, secret and resource types must be non-empty.
fn update_input(fields: &JsonObject) -> JsonObject {
    let mut input = JsonObject::new();
    for key in ["url", "secret"] {
        if let Some(value) = fields.get(key).filter(|v| !is_unset(v)) {
            input.insert(key.to_string(), value.clone());
        }
    }
    for key in ["label", "enabled"] {
        if let Some(value) = fields.get(key).filter(|v| !v.is_null()) {
            input.insert(key.to_string(), value.clone());
        }
    }
    if let Some(types) = fields
        .get("resourceTypes")
        .filter(|v| v.as_array().is_some_and(|types| !types.is_empty()))
    {
        input.insert("resourceTypes".to_string(), types.clone());
    }
    input
}

/// Look a webhook up by id; `None` when Linear has no such webhook.
pub async fn find(client: &LinearClient, webhook_id: &str) -> Result<Option<WebhookRef>> {
    let data = client.request(WEBHOOK_REF_QUERY, json!({ "id": webhook_id })).await?;
    at(&data, "webhook")
}

/// Every webhook visible to the credentials.
pub async fn list_all(client: &LinearClient) -> Result<Vec<WebhookRef>> {
    client
        .paginate(WEBHOOK_REFS_QUERY, json!({}), "webhooks", PageLimit::All)
        .await
}

pub async fn create(client: &LinearClient, webhook: &NewWebhook) -> Result<CreatedWebhook> {
    let data = client
        .request(CREATE_WEBHOOK_MUTATION, json!({ "input": webhook.input() }))
        .await?;
    at(&data, "webhookCreate")
}

/// Returns Linear's `success` flag.
pub async fn delete(client: &LinearClient, webhook_id: &str) -> Result<bool> {
    let data = client
        .request(DELETE_WEBHOOK_MUTATION, json!({ "id": webhook_id }))
        .await?;
    Ok(at::<Option<bool>>(&data, "webhookDelete.success")?.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::JsonItems;
    use crate::resources::testing::{client, item, object, request_bodies, respond_with_data};
    use wiremock::MockServer;

    async fn run(server: &MockServer, operation: Operation, input: Value) -> Result<NodeOutput> {
        let items = JsonItems::from_value(input).unwrap();
        execute(&client(server), operation, &ItemParams::new(&items, 0)).await
    }

    #[tokio::test]
    async fn create_without_team_covers_public_teams() {
        let server = MockServer::start().await;
        respond_with_data(
            &server,
            json!({ "webhookCreate": { "success": true, "webhook": { "id": "w1" } } }),
        )
        .await;

        let output = run(
            &server,
            Operation::CreateWebhook,
            json!({
                "url": "https://hooks.example.com/linear",
                "resourceTypes": ["Issue", "Comment"],
                "teamId": "",
                "label": "",
                "secret": "s3cret"
            }),
        )
        .await
        .unwrap();
        assert_eq!(output, item(json!({ "id": "w1" })));
        assert_eq!(
            request_bodies(&server).await[0]["variables"]["input"],
            json!({
                "url": "https://hooks.example.com/linear",
                "resourceTypes": ["Issue", "Comment"],
                "enabled": true,
                "allPublicTeams": true,
                "secret": "s3cret"
            })
        );
    }

    #[test]
    fn update_sends_only_given_fields() {
        let input = update_input(&object(json!({
            "url": "",
            "label": "",
            "enabled": false,
            "resourceTypes": []
        })));
        assert_eq!(Value::Object(input), json!({ "label": "", "enabled": false }));
    }

    #[tokio::test]
    async fn delete_echoes_the_id() {
        let server = MockServer::start().await;
        respond_with_data(&server, json!({ "webhookDelete": { "success": true } })).await;

        let output = run(&server, Operation::DeleteWebhook, json!({ "webhookId": "w9" }))
            .await
            .unwrap();
        assert_eq!(output, item(json!({ "success": true, "id": "w9" })));
    }

    #[tokio::test]
    async fn listing_returns_the_nodes_themselves() {
        let server = MockServer::start().await;
        respond_with_data(
            &server,
            json!({ "webhooks": { "nodes": [{ "id": "w1" }], "pageInfo": { "hasNextPage": false } } }),
        )
        .await;

        let output = run(&server, Operation::ListWebhooks, json!({})).await.unwrap();
        assert_eq!(output, NodeOutput::Items(vec![object(json!({ "id": "w1" }))]));
    }

    #[tokio::test]
    async fn find_maps_null_to_none() {
        let server = MockServer::start().await;
        respond_with_data(&server, json!({ "webhook": null })).await;

        assert_eq!(find(&client(&server), "gone").await.unwrap(), None);
    }
}
