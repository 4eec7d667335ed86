//! Parameter lookup by name and item index, the way the workflow host hands
//! parameters to a node.

use serde_json::Value;

use crate::error::{LinearError, Result};
use crate::responses::JsonObject;
use crate::transport::client::PageLimit;

/// Default `limit` for list operations when the caller does not set one.
pub const DEFAULT_LIMIT: usize = 50;

/// Host-provided parameter source.
pub trait NodeParameters {
    fn parameter(&self, name: &str, item: usize) -> Option<&Value>;

    fn item_count(&self) -> usize;
}

/// One JSON object of parameters per input item.
#[derive(Debug, Clone, Default)]
pub struct JsonItems {
    items: Vec<JsonObject>,
}

impl JsonItems {
    pub fn new(items: Vec<JsonObject>) -> Self {
        Self { items }
    }

    /// Accepts a single object or an array of objects.
    pub fn from_value(value: Value) -> Result<Self> {
        let items = match value {
            Value::Object(object) => vec![object],
            Value::Array(values) => values
                .into_iter()
                .enumerate()
                .map(|(index, value)| match value {
                    Value::Object(object) => Ok(object),
                    other => Err(LinearError::InvalidParameter {
                        name: format!("items[{index}]"),
                        reason: format!("expected an object, got {}", type_name(&other)),
                    }),
                })
                .collect::<Result<Vec<_>>>()?,
            other => {
                return Err(LinearError::InvalidParameter {
                    name: "items".to_string(),
                    reason: format!("expected an object or array, got {}", type_name(&other)),
                })
            }
        };
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl NodeParameters for JsonItems {
    fn parameter(&self, name: &str, item: usize) -> Option<&Value> {
        self.items.get(item)?.get(name)
    }

    fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// Typed accessors for the parameters of one item.
#[derive(Clone, Copy)]
pub struct ItemParams<'a> {
    source: &'a dyn NodeParameters,
    item: usize,
}

impl<'a> ItemParams<'a> {
    pub fn new(source: &'a dyn NodeParameters, item: usize) -> Self {
        Self { source, item }
    }

    pub fn item(&self) -> usize {
        self.item
    }

    /// The raw value, with `null` treated as absent.
    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        self.source
            .parameter(name, self.item)
            .filter(|value| !value.is_null())
    }

    pub fn required_str(&self, name: &str) -> Result<&'a str> {
        self.optional_str(name)?
            .ok_or_else(|| LinearError::MissingParameter(name.to_string()))
    }

    /// Empty strings count as unset.
    pub fn optional_str(&self, name: &str) -> Result<Option<&'a str>> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(invalid(name, "a string", other)),
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool> {
        match self.raw(name) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(invalid(name, "a boolean", other)),
        }
    }

    pub fn required_i64(&self, name: &str) -> Result<i64> {
        match self.raw(name) {
            None => Err(LinearError::MissingParameter(name.to_string())),
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| invalid(name, "an integer", &Value::Number(n.clone()))),
            Some(other) => Err(invalid(name, "an integer", other)),
        }
    }

    /// A nested object of optional fields, `{}` when unset.
    pub fn collection(&self, name: &str) -> Result<JsonObject> {
        match self.raw(name) {
            None => Ok(JsonObject::new()),
            Some(Value::Object(object)) => Ok(object.clone()),
            Some(other) => Err(invalid(name, "an object", other)),
        }
    }

    /// A list of strings; a comma separated string is split.
    pub fn string_list(&self, name: &str) -> Result<Vec<String>> {
        match self.raw(name) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(s
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect()),
            Some(Value::Array(values)) => values
                .iter()
                .map(|value| match value {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(invalid(name, "a list of strings", other)),
                })
                .collect(),
            Some(other) => Err(invalid(name, "a list of strings", other)),
        }
    }

    pub fn limit(&self) -> Result<usize> {
        match self.raw("limit") {
            None => Ok(DEFAULT_LIMIT),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| invalid("limit", "a non-negative integer", &Value::Number(n.clone()))),
            Some(other) => Err(invalid("limit", "a non-negative integer", other)),
        }
    }

    /// `returnAll` and `limit` combined.
    pub fn page_limit(&self) -> Result<PageLimit> {
        Ok(PageLimit::new(self.bool_or("returnAll", false)?, self.limit()?))
    }
}

fn invalid(name: &str, expected: &str, got: &Value) -> LinearError {
    LinearError::InvalidParameter {
        name: name.to_string(),
        reason: format!("expected {expected}, got {}", type_name(got)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
