use serde_json::Value;

use crate::cli::{ExecArgs, OutputFormat};
use crate::output;
use linear_connector::error::{LinearError, Result};
use linear_connector::{node, JsonItems, JsonObject, LinearClient};

pub async fn run(client: &LinearClient, args: ExecArgs, format: OutputFormat) -> Result<()> {
    let items = match &args.items {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            JsonItems::from_value(serde_json::from_str(&contents).map_err(LinearError::InvalidPayload)?)?
        }
        None => JsonItems::new(vec![single_item(&args)?]),
    };

    let output = node::execute(client, &items, args.continue_on_fail).await?;
    output::print_items(&output, format);
    Ok(())
}

/// One item from `--resource`, `--operation` and the `--param` pairs.
fn single_item(args: &ExecArgs) -> Result<JsonObject> {
    let mut item = JsonObject::new();
    for param in &args.params {
        let (key, value) = parse_param(param)?;
        item.insert(key, value);
    }
    if let Some(resource) = &args.resource {
        item.insert("resource".to_string(), Value::String(resource.clone()));
    }
    if let Some(operation) = &args.operation {
        item.insert("operation".to_string(), Value::String(operation.clone()));
    }
    Ok(item)
}

/// `key=value`; a value that parses as JSON is taken as JSON, otherwise as a string.
fn parse_param(param: &str) -> Result<(String, Value)> {
    let (key, raw) = param
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| LinearError::InvalidParameter {
            name: param.to_string(),
            reason: "expected KEY=VALUE".to_string(),
        })?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_are_json_when_they_parse() {
        assert_eq!(parse_param("returnAll=true").unwrap(), ("returnAll".to_string(), json!(true)));
        assert_eq!(parse_param("limit=10").unwrap(), ("limit".to_string(), json!(10)));
        assert_eq!(
            parse_param(r#"filters={"priority":1}"#).unwrap(),
            ("filters".to_string(), json!({ "priority": 1 }))
        );
        assert_eq!(
            parse_param("issueId=ENG-123").unwrap(),
            ("issueId".to_string(), json!("ENG-123"))
        );
        assert_eq!(parse_param("title=").unwrap(), ("title".to_string(), json!("")));
    }

    #[test]
    fn params_need_a_key() {
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }
}
