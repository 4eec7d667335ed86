//! Resource/operation dispatch. Each resource module owns its query documents
//! and an `Operation` enum whose wire names are the operation values the
//! host sends.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LinearError, Result};
use crate::params::ItemParams;
use crate::responses::JsonObject;
use crate::transport::client::LinearClient;
use crate::transport::values::clean_object;

pub mod attachments;
pub mod comments;
pub mod cycles;
pub mod documents;
pub mod favorites;
pub mod fields;
pub mod integrations;
pub mod issues;
pub mod labels;
pub mod notifications;
pub mod project_updates;
pub mod projects;
pub mod teams;
pub mod users;
pub mod webhooks;
pub mod workflow_states;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
    Issues,
    Comments,
    Projects,
    ProjectUpdates,
    Cycles,
    Teams,
    Users,
    Labels,
    WorkflowStates,
    Documents,
    Attachments,
    Favorites,
    Notifications,
    Webhooks,
    Integrations,
}

impl Resource {
    pub const ALL: [Resource; 15] = [
        Resource::Issues,
        Resource::Comments,
        Resource::Projects,
        Resource::ProjectUpdates,
        Resource::Cycles,
        Resource::Teams,
        Resource::Users,
        Resource::Labels,
        Resource::WorkflowStates,
        Resource::Documents,
        Resource::Attachments,
        Resource::Favorites,
        Resource::Notifications,
        Resource::Webhooks,
        Resource::Integrations,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Issues => "issues",
            Resource::Comments => "comments",
            Resource::Projects => "projects",
            Resource::ProjectUpdates => "projectUpdates",
            Resource::Cycles => "cycles",
            Resource::Teams => "teams",
            Resource::Users => "users",
            Resource::Labels => "labels",
            Resource::WorkflowStates => "workflowStates",
            Resource::Documents => "documents",
            Resource::Attachments => "attachments",
            Resource::Favorites => "favorites",
            Resource::Notifications => "notifications",
            Resource::Webhooks => "webhooks",
            Resource::Integrations => "integrations",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = LinearError;

    fn from_str(s: &str) -> Result<Self> {
        Resource::ALL
            .into_iter()
            .find(|resource| resource.as_str() == s)
            .ok_or_else(|| LinearError::UnknownResource(s.to_string()))
    }
}

/// What one operation produced for one input item.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutput {
    Item(JsonObject),
    Items(Vec<JsonObject>),
}

impl NodeOutput {
    pub fn into_items(self) -> Vec<JsonObject> {
        match self {
            NodeOutput::Item(item) => vec![item],
            NodeOutput::Items(items) => items,
        }
    }
}

/// Run `operation` of `resource` with the parameters of one item.
pub async fn execute(
    client: &LinearClient,
    resource: Resource,
    operation: &str,
    params: &ItemParams<'_>,
) -> Result<NodeOutput> {
    log::debug!("{resource}.{operation} (item {})", params.item());
    match resource {
        Resource::Issues => issues::execute(client, parse_operation(resource, operation)?, params).await,
        Resource::Comments => comments::execute(client, parse_operation(resource, operation)?, params).await,
        Resource::Projects => projects::execute(client, parse_operation(resource, operation)?, params).await,
        Resource::ProjectUpdates => {
            project_updates::execute(client, parse_operation(resource, operation)?, params).await
        }
        Resource::Cycles => cycles::execute(client, parse_operation(resource, operation)?, params).await,
        Resource::Teams => teams::execute(client, parse_operation(resource, operation)?, params).await,
        Resource::Users => users::execute(client, parse_operation(resource, operation)?, params).await,
        Resource::Labels => labels::execute(client, parse_operation(resource, operation)?, params).await,
        Resource::WorkflowStates => {
            workflow_states::execute(client, parse_operation(resource, operation)?, params).await
        }
        Resource::Documents => documents::execute(client, parse_operation(resource, operation)?, params).await,
        Resource::Attachments => {
            attachments::execute(client, parse_operation(resource, operation)?, params).await
        }
        Resource::Favorites => favorites::execute(client, parse_operation(resource, operation)?, params).await,
        Resource::Notifications => {
            notifications::execute(client, parse_operation(resource, operation)?, params).await
        }
        Resource::Webhooks => webhooks::execute(client, parse_operation(resource, operation)?, params).await,
        Resource::Integrations => {
            integrations::execute(client, parse_operation(resource, operation)?, params).await
        }
    }
}

/// Operation enums deserialize from their camelCase wire name.
pub fn parse_operation<T: DeserializeOwned>(resource: Resource, operation: &str) -> Result<T> {
    serde_json::from_value(Value::String(operation.to_string())).map_err(|_| {
        LinearError::UnknownOperation {
            resource: resource.to_string(),
            operation: operation.to_string(),
        }
    })
}

/// An enumerated parameter value, deserialized from its wire name.
pub(crate) fn parse_choice<T: DeserializeOwned>(name: &str, value: &str) -> Result<T> {
    serde_json::from_value(Value::String(value.to_string())).map_err(|_| {
        LinearError::InvalidParameter {
            name: name.to_string(),
            reason: format!("unsupported value `{value}`"),
        }
    })
}

/// `{ <key>: [...] }`, the wrapper list operations return.
pub(crate) fn wrap_list(key: &str, nodes: Vec<JsonObject>) -> NodeOutput {
    let mut wrapped = JsonObject::new();
    wrapped.insert(
        key.to_string(),
        Value::Array(nodes.into_iter().map(Value::Object).collect()),
    );
    NodeOutput::Item(wrapped)
}

/// Required fields overlaid with an optional-field collection, then cleaned.
///
/// Collection entries win over required ones with the same key.
pub(crate) fn input_with(required: Value, fields: JsonObject) -> JsonObject {
    let mut input = match required {
        Value::Object(object) => object,
        _ => JsonObject::new(),
    };
    input.extend(fields);
    clean_object(&input)
}

/// Add `filter` to `variables` unless it is empty.
pub(crate) fn with_filter(variables: Value, filter: JsonObject) -> Value {
    let mut variables = match variables {
        Value::Object(object) => object,
        _ => JsonObject::new(),
    };
    if !filter.is_empty() {
        variables.insert("filter".to_string(), Value::Object(filter));
    }
    Value::Object(variables)
}

/// A single `{ key: value }` object.
pub(crate) fn object_with(key: &str, value: Value) -> JsonObject {
    let mut object = JsonObject::new();
    object.insert(key.to_string(), value);
    object
}

#[cfg(test)]
pub(crate) mod testing {
    use serde_json::Value;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::NodeOutput;
    use crate::responses::JsonObject;
    use crate::transport::client::{Credentials, LinearClient};

    pub fn client(server: &MockServer) -> LinearClient {
        LinearClient::new(Credentials::api_key("lin_api_test")).with_endpoint(server.uri())
    }

    pub fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap_or_default()
    }

    pub fn item(value: Value) -> NodeOutput {
        NodeOutput::Item(object(value))
    }

    /// Answer every POST with `{ data }`.
    pub async fn respond_with_data(server: &MockServer, data: Value) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data })))
            .mount(server)
            .await;
    }

    /// JSON bodies of every request the server saw, in order.
    pub async fn request_bodies(server: &MockServer) -> Vec<Value> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).unwrap_or(Value::Null))
            .collect()
    }
}
