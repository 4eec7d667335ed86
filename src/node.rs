//! Item loop of the action node: one resource/operation applied to every
//! input item.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::params::{ItemParams, NodeParameters};
use crate::resources::{self, Resource};
use crate::responses::JsonObject;
use crate::transport::client::LinearClient;

/// Index of the input item an output item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairedItem {
    pub item: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub json: JsonObject,
    pub paired_item: PairedItem,
}

impl OutputItem {
    fn new(json: JsonObject, item: usize) -> Self {
        Self {
            json,
            paired_item: PairedItem { item },
        }
    }
}

/// `resource` and `operation` of the run, as set on the first item.
fn selection<'a>(items: &'a dyn NodeParameters) -> Result<(Resource, &'a str)> {
    let first = ItemParams::new(items, 0);
    let resource = first.required_str("resource")?.parse()?;
    Ok((resource, first.required_str("operation")?))
}

/// Run the node over every item.
///
/// `resource` and `operation` are read from the first item. With
/// `continue_on_fail` a failing item yields `{ "error": message }` and the
/// loop moves on; otherwise the first failure is returned. An unusable
/// selection fails each item the same way.
pub async fn execute(
    client: &LinearClient,
    items: &dyn NodeParameters,
    continue_on_fail: bool,
) -> Result<Vec<OutputItem>> {
    let count = items.item_count();
    if count == 0 {
        return Ok(Vec::new());
    }

    if let Ok((resource, operation)) = selection(items) {
        log::info!("Executing {resource}.{operation} for {count} item(s)");
    }

    let mut output = Vec::new();
    for item in 0..count {
        let params = ItemParams::new(items, item);
        let result = match selection(items) {
            Ok((resource, operation)) => resources::execute(client, resource, operation, &params).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(result) => {
                output.extend(
                    result
                        .into_items()
                        .into_iter()
                        .map(|json| OutputItem::new(json, item)),
                );
            }
            Err(e) if continue_on_fail => {
                log::warn!("Item {item} failed: {e}");
                let mut json = JsonObject::new();
                json.insert("error".to_string(), Value::String(e.to_string()));
                output.push(OutputItem::new(json, item));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinearError;
    use crate::params::JsonItems;
    use crate::resources::testing::{client, object, respond_with_data};
    use serde_json::json;
    use wiremock::MockServer;

    #[tokio::test]
    async fn no_items_means_no_requests() {
        let server = MockServer::start().await;
        let output = execute(&client(&server), &JsonItems::default(), false)
            .await
            .unwrap();
        assert!(output.is_empty());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn unknown_resource_stops_the_run() {
        let server = MockServer::start().await;
        let items = JsonItems::from_value(json!({ "resource": "tickets", "operation": "list" })).unwrap();

        let err = execute(&client(&server), &items, false).await.unwrap_err();
        assert!(matches!(err, LinearError::UnknownResource(_)));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn unknown_resource_fails_every_item_when_continuing() {
        let server = MockServer::start().await;
        let items = JsonItems::from_value(json!([
            { "resource": "tickets", "operation": "list" },
            { "resource": "tickets", "operation": "list" }
        ]))
        .unwrap();

        let output = execute(&client(&server), &items, true).await.unwrap();
        let rendered: Vec<Value> = output
            .iter()
            .map(|o| serde_json::to_value(o).unwrap())
            .collect();
        assert_eq!(
            rendered,
            vec![
                json!({ "json": { "error": "Unknown resource: tickets" }, "pairedItem": { "item": 0 } }),
                json!({ "json": { "error": "Unknown resource: tickets" }, "pairedItem": { "item": 1 } }),
            ]
        );
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn item_lists_are_flattened_and_paired() {
        let server = MockServer::start().await;
        respond_with_data(
            &server,
            json!({ "webhooks": {
                "nodes": [{ "id": "w1" }, { "id": "w2" }],
                "pageInfo": { "hasNextPage": false }
            } }),
        )
        .await;

        let items = JsonItems::from_value(json!([
            { "resource": "webhooks", "operation": "listWebhooks" },
            { "resource": "webhooks", "operation": "listWebhooks", "limit": 1 }
        ]))
        .unwrap();
        let output = execute(&client(&server), &items, false).await.unwrap();

        let paired: Vec<(usize, Value)> = output
            .iter()
            .map(|o| (o.paired_item.item, o.json["id"].clone()))
            .collect();
        assert_eq!(
            paired,
            vec![(0, json!("w1")), (0, json!("w2")), (1, json!("w1"))]
        );
        assert_eq!(
            serde_json::to_value(&output[2]).unwrap(),
            json!({ "json": object(json!({ "id": "w1" })), "pairedItem": { "item": 1 } })
        );
    }
}
