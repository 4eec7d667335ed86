use std::io::{self, Write};

use linear_connector::config::Config;
use linear_connector::error::{LinearError, Result};

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn optional(value: String) -> Option<String> {
    Some(value).filter(|v| !v.is_empty())
}

pub async fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        let answer = prompt(&format!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        ))?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("Linear Connector Configuration");
    println!("==============================\n");

    let api_key = optional(prompt(
        "Enter your Linear API key (create one at https://linear.app/settings/api) [blank to use OAuth]: ",
    )?);
    let oauth_token = match api_key {
        Some(_) => None,
        None => optional(prompt("Enter an OAuth2 access token: ")?),
    };
    if api_key.is_none() && oauth_token.is_none() {
        return Err(LinearError::Authentication);
    }

    let config = Config {
        api_key,
        oauth_token,
        api_url: optional(prompt("GraphQL endpoint [default https://api.linear.app/graphql]: ")?),
        max_pages: None,
    };

    config.save_to(&config_path)?;

    println!("\nConfig saved to {}", config_path.display());
    println!("You can now use 'linear-connector' commands!");

    Ok(())
}
