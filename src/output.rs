use colored::Colorize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;
use linear_connector::{JsonObject, OutputItem};

/// Columns shown in table mode, in order, when the rows carry them.
const PREFERRED_COLUMNS: [&str; 8] = [
    "identifier",
    "id",
    "key",
    "name",
    "title",
    "email",
    "url",
    "success",
];

const MAX_CELL_WIDTH: usize = 60;

/// Print node output in the requested format.
pub fn print_items(items: &[OutputItem], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Compact => {
            for item in items {
                println!("{}", serde_json::to_string(&item.json).unwrap_or_default());
            }
        }
        OutputFormat::Table => {
            let rows: Vec<&JsonObject> = items.iter().map(|item| &item.json).collect();
            print_table(&rows);
        }
    }
}

/// Print a single object in the requested format.
pub fn print_object(object: &JsonObject, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(object).unwrap_or_default());
        }
        OutputFormat::Compact => {
            println!("{}", serde_json::to_string(object).unwrap_or_default());
        }
        OutputFormat::Table => {
            for (key, value) in object {
                println!("{} {}", format!("{key}:").bold(), cell(value));
            }
        }
    }
}

/// Print a message (skipped in JSON mode, or prints simple object)
pub fn print_message(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Compact => {
            println!("{}", serde_json::json!({ "message": message }));
        }
        OutputFormat::Table => println!("{message}"),
    }
}

fn print_table(rows: &[&JsonObject]) {
    if rows.is_empty() {
        println!("{}", "No results".bright_black());
        return;
    }

    // A single wrapper object (`{ issues: [...] }`) is shown as its list.
    if let [only] = rows {
        if only.len() == 1 {
            if let Some(Value::Array(nodes)) = only.values().next() {
                let nested: Vec<&JsonObject> = nodes.iter().filter_map(Value::as_object).collect();
                if nested.len() == nodes.len() {
                    return print_table(&nested);
                }
            }
        }
    }

    let columns = columns(rows);
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.bold().to_string()));
    for row in rows {
        builder.push_record(
            columns
                .iter()
                .map(|column| row.get(*column).map(cell).unwrap_or_default()),
        );
    }
    println!("{}", builder.build().with(Style::rounded()).to_string());
}

/// Preferred columns present in any row, or the first row's scalar keys.
fn columns<'a>(rows: &[&'a JsonObject]) -> Vec<&'a str> {
    let preferred: Vec<&str> = PREFERRED_COLUMNS
        .into_iter()
        .filter(|column| rows.iter().any(|row| row.contains_key(*column)))
        .collect();
    if !preferred.is_empty() {
        return rows
            .iter()
            .copied()
            .flat_map(|row| row.keys())
            .filter(|key| preferred.contains(&key.as_str()))
            .fold(Vec::new(), |mut acc: Vec<&'a str>, key| {
                if !acc.contains(&key.as_str()) {
                    acc.push(key.as_str());
                }
                acc
            });
    }
    rows.first()
        .copied()
        .map(|row| {
            row.iter()
                .filter(|(_, value)| !value.is_object() && !value.is_array())
                .map(|(key, _)| key.as_str())
                .collect()
        })
        .unwrap_or_default()
}

fn cell(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "yes".green().to_string(),
        Value::Bool(false) => "no".red().to_string(),
        other => other.to_string(),
    };
    truncate(&text, MAX_CELL_WIDTH)
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
