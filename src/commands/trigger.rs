use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::{ActivateArgs, DeliverArgs, OutputFormat};
use crate::output;
use linear_connector::config::Config;
use linear_connector::error::Result;
use linear_connector::transport::sign_payload;
use linear_connector::{
    handle_delivery, DeliveryOutcome, FileStore, JsonObject, LinearClient, TriggerConfig,
    TriggerEvent, WebhookLifecycle, WebhookStore,
};

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Callback URL")]
    url: String,
    #[tabled(rename = "Registered")]
    registered: String,
    #[tabled(rename = "Webhook ID")]
    webhook_id: String,
}

fn lifecycle<'a>(client: &'a LinearClient, url: &str) -> Result<WebhookLifecycle<'a, FileStore>> {
    let store = FileStore::open(Config::store_path()?)?;
    WebhookLifecycle::new(client, store, url)
}

pub async fn status(client: &LinearClient, url: &str, format: OutputFormat) -> Result<()> {
    let mut lifecycle = lifecycle(client, url)?;
    let exists = lifecycle.check_exists().await?;
    let webhook_id = lifecycle.store().webhook_id(url);

    if format == OutputFormat::Table {
        let row = StatusRow {
            url: url.to_string(),
            registered: if exists { "yes".green() } else { "no".red() }.to_string(),
            webhook_id: webhook_id.unwrap_or_default(),
        };
        println!("{}", Table::new([row]).with(Style::rounded()).to_string());
    } else {
        let mut object = JsonObject::new();
        object.insert("url".to_string(), url.into());
        object.insert("registered".to_string(), exists.into());
        object.insert("webhookId".to_string(), webhook_id.into());
        output::print_object(&object, format);
    }
    Ok(())
}

pub async fn activate(client: &LinearClient, args: ActivateArgs, format: OutputFormat) -> Result<()> {
    let config = TriggerConfig {
        event: args.event.parse()?,
        team_id: args.team,
        secret: args.secret,
        verify_signature: true,
        label: args.label,
    };

    let mut lifecycle = lifecycle(client, &args.url)?;
    if lifecycle.check_exists().await? {
        output::print_message("Webhook already registered", format);
        return Ok(());
    }
    let webhook_id = lifecycle.create(&config).await?;
    output::print_message(
        &format!("Registered webhook {webhook_id} for {}", config.event),
        format,
    );
    Ok(())
}

pub async fn deactivate(client: &LinearClient, url: &str, format: OutputFormat) -> Result<()> {
    lifecycle(client, url)?.delete().await?;
    output::print_message("Webhook removed", format);
    Ok(())
}

pub fn deliver(args: DeliverArgs, format: OutputFormat) -> Result<()> {
    let event: TriggerEvent = args.event.parse()?;
    let config = TriggerConfig {
        secret: args.secret,
        verify_signature: !args.no_verify,
        ..TriggerConfig::new(event)
    };
    let body = std::fs::read(&args.body)?;

    let outcome = handle_delivery(&config, &body, args.signature.as_deref());
    match outcome {
        DeliveryOutcome::Emitted(item) => output::print_object(&item, format),
        DeliveryOutcome::Suppressed => {
            output::print_message(&format!("Delivery does not match {event}"), format)
        }
        other => {
            let response = other.response_body().unwrap_or_default();
            output::print_message(&format!("Responded with {response}"), format);
        }
    }
    Ok(())
}

pub fn sign(body: &std::path::Path, secret: &str) -> Result<()> {
    let body = std::fs::read(body)?;
    println!("{}", sign_payload(&body, secret)?);
    Ok(())
}
