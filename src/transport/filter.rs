//! Flat UI filter parameters to Linear's nested filter objects.

use serde_json::Value;

use crate::responses::JsonObject;

/// Build a GraphQL filter object from flat filter parameters.
///
/// Unset values (`null`, `""`) are skipped. Every mapping merges into the
/// nested object it targets, so `priorityGte` and `priorityLte` combine into
/// one `priority` comparator regardless of the order they arrive in.
pub fn build_filter(params: &JsonObject) -> JsonObject {
    let mut filter = JsonObject::new();

    for (key, value) in params {
        if is_unset(value) {
            continue;
        }

        match key.as_str() {
            "teamId" => merge(&mut filter, &["team", "id"], "eq", value),
            "teamIds" => merge(&mut filter, &["team", "id"], "in", value),
            "assigneeId" => merge(&mut filter, &["assignee", "id"], "eq", value),
            "creatorId" => merge(&mut filter, &["creator", "id"], "eq", value),
            "projectId" => merge(&mut filter, &["project", "id"], "eq", value),
            "cycleId" => merge(&mut filter, &["cycle", "id"], "eq", value),
            "stateId" => merge(&mut filter, &["state", "id"], "eq", value),
            "labelIds" => merge(&mut filter, &["labels", "id"], "in", value),
            "priority" => merge(&mut filter, &["priority"], "eq", value),
            "priorityGte" => merge(&mut filter, &["priority"], "gte", value),
            "priorityLte" => merge(&mut filter, &["priority"], "lte", value),
            "createdAfter" => merge(&mut filter, &["createdAt"], "gt", value),
            "createdBefore" => merge(&mut filter, &["createdAt"], "lt", value),
            "updatedAfter" => merge(&mut filter, &["updatedAt"], "gt", value),
            "updatedBefore" => merge(&mut filter, &["updatedAt"], "lt", value),
            "searchQuery" => merge(&mut filter, &["searchableContent"], "contains", value),
            "titleContains" => merge(&mut filter, &["title"], "containsIgnoreCase", value),
            // Sent as its own query variable.
            "includeArchived" => {}
            _ => {
                let shaped = match value {
                    Value::Object(_) | Value::Array(_) => value.clone(),
                    scalar => {
                        let mut eq = JsonObject::new();
                        eq.insert("eq".to_string(), scalar.clone());
                        Value::Object(eq)
                    }
                };
                filter.insert(key.clone(), shaped);
            }
        }
    }

    filter
}

pub(crate) fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn merge(filter: &mut JsonObject, path: &[&str], comparator: &str, value: &Value) {
    let Some((head, rest)) = path.split_first() else {
        filter.insert(comparator.to_string(), value.clone());
        return;
    };

    let entry = filter
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(JsonObject::new()));
    if !entry.is_object() {
        *entry = Value::Object(JsonObject::new());
    }
    if let Value::Object(nested) = entry {
        merge(nested, rest, comparator, value);
    }
}
