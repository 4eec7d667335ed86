use chrono::{SecondsFormat, Utc};
use const_format::concatcp;
use serde::Deserialize;
use serde_json::{json, Value};

use super::fields::{NOTIFICATION_FIELDS, PAGE_INFO};
use super::{object_with, parse_choice, with_filter, NodeOutput};
use crate::error::Result;
use crate::params::ItemParams;
use crate::responses::{at, entity_or_success, JsonObject};
use crate::transport::client::LinearClient;
use crate::transport::values::format_date_for_linear;

const LIST_NOTIFICATIONS_QUERY: &str = concatcp!(
    r#"
query ListNotifications($first: Int, $after: String, $filter: NotificationFilter) {
    notifications(first: $first, after: $after, filter: $filter) {
        nodes {"#,
    NOTIFICATION_FIELDS,
    "        }",
    PAGE_INFO,
    r#"    }
}
"#
);

const UPDATE_NOTIFICATION_MUTATION: &str = concatcp!(
    r#"
mutation UpdateNotification($id: String!, $input: NotificationUpdateInput!) {
    notificationUpdate(id: $id, input: $input) {
        success
        notification {"#,
    NOTIFICATION_FIELDS,
    r#"        }
    }
}
"#
);

const MARK_ALL_READ_MUTATION: &str = r#"
mutation MarkAllNotificationsRead($readAt: DateTime!) {
    notificationUpdateAll(input: { readAt: $readAt }) {
        success
    }
}
"#;

const ARCHIVE_NOTIFICATION_MUTATION: &str = concatcp!(
    r#"
mutation ArchiveNotification($id: String!) {
    notificationArchive(id: $id) {
        success
        notification {"#,
    NOTIFICATION_FIELDS,
    r#"        }
    }
}
"#
);

const UNARCHIVE_NOTIFICATION_MUTATION: &str = concatcp!(
    r#"
mutation UnarchiveNotification($id: String!) {
    notificationUnarchive(id: $id) {
        success
        notification {"#,
    NOTIFICATION_FIELDS,
    r#"        }
    }
}
"#
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    ListNotifications,
    MarkNotificationRead,
    MarkAllNotificationsRead,
    ArchiveNotification,
    UnarchiveNotification,
    SnoozeNotification,
    UnsnoozeNotification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ReadState {
    Read,
    Unread,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ArchiveState {
    Active,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
enum SnoozeState {
    Snoozed,
    NotSnoozed,
}

pub async fn execute(
    client: &LinearClient,
    operation: Operation,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    let item = match operation {
        Operation::ListNotifications => {
            let filter = notification_filter(&params.collection("filters")?)?;
            let notifications: Vec<JsonObject> = client
                .paginate(
                    LIST_NOTIFICATIONS_QUERY,
                    with_filter(json!({}), filter),
                    "notifications",
                    params.page_limit()?,
                )
                .await?;
            return Ok(NodeOutput::Items(notifications));
        }
        Operation::MarkNotificationRead => {
            update(
                client,
                params.required_str("notificationId")?,
                json!({ "readAt": now() }),
            )
            .await?
        }
        Operation::MarkAllNotificationsRead => {
            let data = client
                .request(MARK_ALL_READ_MUTATION, json!({ "readAt": now() }))
                .await?;
            let success = at::<Option<bool>>(&data, "notificationUpdateAll.success")?;
            object_with("success", Value::Bool(success.unwrap_or(false)))
        }
        Operation::ArchiveNotification => {
            let data = client
                .request(
                    ARCHIVE_NOTIFICATION_MUTATION,
                    json!({ "id": params.required_str("notificationId")? }),
                )
                .await?;
            entity_or_success(&data, "notificationArchive", "notification")?
        }
        Operation::UnarchiveNotification => {
            let data = client
                .request(
                    UNARCHIVE_NOTIFICATION_MUTATION,
                    json!({ "id": params.required_str("notificationId")? }),
                )
                .await?;
            entity_or_success(&data, "notificationUnarchive", "notification")?
        }
        Operation::SnoozeNotification => {
            let snoozed_until = format_date_for_linear(params.required_str("snoozedUntilAt")?)?;
            update(
                client,
                params.required_str("notificationId")?,
                json!({ "snoozedUntilAt": snoozed_until }),
            )
            .await?
        }
        Operation::UnsnoozeNotification => {
            update(
                client,
                params.required_str("notificationId")?,
                json!({ "snoozedUntilAt": null }),
            )
            .await?
        }
    };

    Ok(NodeOutput::Item(item))
}

async fn update(client: &LinearClient, notification_id: &str, input: Value) -> Result<JsonObject> {
    let data = client
        .request(
            UPDATE_NOTIFICATION_MUTATION,
            json!({ "id": notification_id, "input": input }),
        )
        .await?;
    entity_or_success(&data, "notificationUpdate", "notification")
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Translate the list filters into a `NotificationFilter`.
fn notification_filter(filters: &JsonObject) -> Result<JsonObject> {
    let mut filter = JsonObject::new();

    let types = match filters.get("type") {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        Some(Value::String(csv)) => csv
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    };
    if !types.is_empty() {
        filter.insert("type".to_string(), json!({ "in": types }));
    }

    if let Some(state) = choice::<ReadState>(filters, "readAt")? {
        filter.insert("readAt".to_string(), json!({ "null": state == ReadState::Unread }));
    }
    if let Some(state) = choice::<ArchiveState>(filters, "archivedAt")? {
        filter.insert("archivedAt".to_string(), json!({ "null": state == ArchiveState::Active }));
    }
    if let Some(state) = choice::<SnoozeState>(filters, "snoozedUntilAt")? {
        filter.insert(
            "snoozedUntilAt".to_string(),
            json!({ "null": state == SnoozeState::NotSnoozed }),
        );
    }

    Ok(filter)
}

/// An optional enumerated filter; unset, empty and `"all"` mean no condition.
fn choice<T: serde::de::DeserializeOwned>(filters: &JsonObject, name: &str) -> Result<Option<T>> {
    match filters.get(name).and_then(Value::as_str) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => parse_choice(name, value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinearError;
    use crate::params::JsonItems;
    use crate::resources::testing::{client, item, object, request_bodies, respond_with_data};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn run(server: &MockServer, operation: Operation, input: Value) -> Result<NodeOutput> {
        let items = JsonItems::from_value(input).unwrap();
        execute(&client(server), operation, &ItemParams::new(&items, 0)).await
    }

    #[test]
    fn filter_conditions_map_to_null_checks() {
        let filter = notification_filter(&object(json!({
            "type": ["issueAssignedToYou", "issueMention"],
            "readAt": "unread",
            "archivedAt": "archived",
            "snoozedUntilAt": "notSnoozed"
        })))
        .unwrap();
        assert_eq!(
            Value::Object(filter),
            json!({
                "type": { "in": ["issueAssignedToYou", "issueMention"] },
                "readAt": { "null": true },
                "archivedAt": { "null": false },
                "snoozedUntilAt": { "null": true }
            })
        );
    }

    #[test]
    fn all_and_empty_add_no_condition() {
        let filter = notification_filter(&object(json!({
            "type": [],
            "readAt": "all",
            "archivedAt": ""
        })))
        .unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn unknown_read_state_is_rejected() {
        let err = notification_filter(&object(json!({ "readAt": "skimmed" }))).unwrap_err();
        assert!(matches!(err, LinearError::InvalidParameter { name, .. } if name == "readAt"));
    }

    #[tokio::test]
    async fn listing_returns_the_nodes_themselves() {
        let server = MockServer::start().await;
        respond_with_data(
            &server,
            json!({ "notifications": {
                "nodes": [{ "id": "n1" }, { "id": "n2" }],
                "pageInfo": { "hasNextPage": false }
            } }),
        )
        .await;

        let output = run(
            &server,
            Operation::ListNotifications,
            json!({ "filters": { "readAt": "read" } }),
        )
        .await
        .unwrap();
        assert_eq!(
            output,
            NodeOutput::Items(vec![object(json!({ "id": "n1" })), object(json!({ "id": "n2" }))])
        );
        assert_eq!(
            request_bodies(&server).await[0]["variables"]["filter"],
            json!({ "readAt": { "null": false } })
        );
    }

    #[tokio::test]
    async fn snooze_normalises_the_date() {
        let server = MockServer::start().await;
        respond_with_data(
            &server,
            json!({ "notificationUpdate": { "success": true, "notification": { "id": "n1" } } }),
        )
        .await;

        let output = run(
            &server,
            Operation::SnoozeNotification,
            json!({ "notificationId": "n1", "snoozedUntilAt": "2026-03-01" }),
        )
        .await
        .unwrap();
        assert_eq!(output, item(json!({ "id": "n1" })));
        assert_eq!(
            request_bodies(&server).await[0]["variables"]["input"],
            json!({ "snoozedUntilAt": "2026-03-01T00:00:00.000Z" })
        );
    }

    #[tokio::test]
    async fn mark_all_read_propagates_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{ "message": "Cannot query field \"notificationUpdateAll\"" }]
            })))
            .mount(&server)
            .await;

        let err = run(&server, Operation::MarkAllNotificationsRead, json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, LinearError::Api { .. }));
    }

    #[tokio::test]
    async fn unsnooze_clears_the_date() {
        let server = MockServer::start().await;
        respond_with_data(
            &server,
            json!({ "notificationUpdate": { "success": true, "notification": null } }),
        )
        .await;

        let output = run(&server, Operation::UnsnoozeNotification, json!({ "notificationId": "n1" }))
            .await
            .unwrap();
        assert_eq!(output, item(json!({ "success": true })));
        assert_eq!(
            request_bodies(&server).await[0]["variables"]["input"],
            json!({ "snoozedUntilAt": null })
        );
    }
}
