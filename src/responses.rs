//! Shared GraphQL response types and extraction helpers.
//!
//! Entities come back as loose JSON objects (their field selections are pure
//! data), but every envelope around them is validated here: a missing field
//! or a wrong type becomes `LinearError::UnexpectedShape` instead of an
//! absent value flowing further.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LinearError, Result};

/// A flat JSON object, the unit every operation produces.
pub type JsonObject = serde_json::Map<String, Value>;

/// Raw GraphQL envelope: `{ data?, errors? }`.
#[derive(Deserialize, Debug)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<ErrorExtensions>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ErrorExtensions {
    pub code: Option<String>,
    #[serde(rename = "userPresentableMessage")]
    pub user_presentable_message: Option<String>,
}

/// Pagination info for cursor-based pagination.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
}

/// A GraphQL connection: `{ nodes, pageInfo }`.
#[derive(Deserialize, Debug)]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
}

/// `{ success }` returned by delete-style mutations.
#[derive(Deserialize, Debug)]
pub struct SuccessPayload {
    pub success: bool,
}

/// Walk a dot-separated path (`issue.comments`) into `data`.
pub fn pluck<'a>(data: &'a Value, path: &str) -> Result<&'a Value> {
    let mut current = data;
    for key in path.split('.') {
        current = current
            .as_object()
            .and_then(|object| object.get(key))
            .ok_or_else(|| LinearError::shape(path, format!("field `{key}` is missing")))?;
    }
    Ok(current)
}

/// Deserialize the value at `path` into `T`.
pub fn at<T: DeserializeOwned>(data: &Value, path: &str) -> Result<T> {
    let value = pluck(data, path)?;
    T::deserialize(value).map_err(|e| LinearError::shape(path, e))
}

/// Entity object at `path`; a `null` entity means Linear did not find it.
pub fn entity_at(data: &Value, path: &str, kind: &'static str, id: &str) -> Result<JsonObject> {
    at::<Option<JsonObject>>(data, path)?.ok_or_else(|| LinearError::NotFound {
        kind,
        id: id.to_string(),
    })
}

/// `{ success }` from the mutation payload at `path`.
pub fn success_at(data: &Value, path: &str) -> Result<JsonObject> {
    let payload: SuccessPayload = at(data, path)?;
    let mut result = JsonObject::new();
    result.insert("success".to_string(), Value::Bool(payload.success));
    Ok(result)
}

/// Payload entity if present, otherwise `{ success }` from the payload.
pub fn entity_or_success(data: &Value, payload: &str, field: &str) -> Result<JsonObject> {
    let path = format!("{payload}.{field}");
    match at::<Option<JsonObject>>(data, &path)? {
        Some(entity) => Ok(entity),
        None => success_at(data, payload),
    }
}
