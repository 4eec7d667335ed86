//! Registering, finding and removing the Linear webhook behind a trigger.

use url::Url;

use super::TriggerConfig;
use crate::error::{LinearError, Result};
use crate::resources::webhooks::{self, NewWebhook};
use crate::transport::client::LinearClient;

/// Where a trigger remembers the id of the webhook it registered.
///
/// Records are keyed by the trigger's callback URL; a key holds at most one id.
pub trait WebhookStore {
    fn webhook_id(&self, key: &str) -> Option<String>;

    fn set_webhook_id(&mut self, key: &str, webhook_id: &str) -> Result<()>;

    fn clear_webhook_id(&mut self, key: &str) -> Result<()>;
}

pub struct WebhookLifecycle<'a, S> {
    client: &'a LinearClient,
    store: S,
    callback_url: String,
}

impl<'a, S: WebhookStore> WebhookLifecycle<'a, S> {
    pub fn new(client: &'a LinearClient, store: S, callback_url: &str) -> Result<Self> {
        let parsed = Url::parse(callback_url)
            .map_err(|e| LinearError::InvalidUrl(format!("{callback_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(LinearError::InvalidUrl(format!(
                "{callback_url}: webhooks must be delivered over http(s)"
            )));
        }
        Ok(Self {
            client,
            store,
            callback_url: callback_url.to_string(),
        })
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Whether a webhook for the callback URL is registered.
    ///
    /// The remembered id is tried first; any failure there falls through to
    /// a scan of all webhooks, and a webhook found by URL is adopted.
    pub async fn check_exists(&mut self) -> Result<bool> {
        if let Some(webhook_id) = self.store.webhook_id(&self.callback_url) {
            match webhooks::find(self.client, &webhook_id).await {
                Ok(Some(webhook)) if webhook.url.as_deref() == Some(self.callback_url.as_str()) => {
                    return Ok(true);
                }
                Ok(_) => log::debug!("Stored webhook {webhook_id} is gone or points elsewhere"),
                Err(e) => log::debug!("Looking up stored webhook {webhook_id} failed: {e}"),
            }
        }

        let existing = webhooks::list_all(self.client)
            .await?
            .into_iter()
            .find(|webhook| webhook.url.as_deref() == Some(self.callback_url.as_str()));

        match existing {
            Some(webhook) => {
                log::info!("Adopting existing webhook {} for {}", webhook.id, self.callback_url);
                self.store.set_webhook_id(&self.callback_url, &webhook.id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Register a webhook for the configured event and remember its id.
    pub async fn create(&mut self, config: &TriggerConfig) -> Result<String> {
        let new_webhook = NewWebhook {
            url: self.callback_url.clone(),
            resource_types: vec![config.event.resource_type().to_string()],
            enabled: true,
            team_id: config.team_id.clone(),
            label: config.label.clone(),
            secret: config.secret.clone(),
        };

        let created = webhooks::create(self.client, &new_webhook).await?;
        if !created.success {
            return Err(LinearError::WebhookCreateFailed);
        }
        let webhook_id = created
            .id()
            .ok_or(LinearError::WebhookCreateFailed)?
            .to_string();

        log::info!("Registered webhook {webhook_id} for {}", config.event);
        self.store.set_webhook_id(&self.callback_url, &webhook_id)?;
        Ok(webhook_id)
    }

    /// Remove the remembered webhook. The record is cleared even when Linear
    /// rejects the delete, since the webhook may already be gone.
    pub async fn delete(&mut self) -> Result<()> {
        let Some(webhook_id) = self.store.webhook_id(&self.callback_url) else {
            return Ok(());
        };

        match webhooks::delete(self.client, &webhook_id).await {
            Ok(success) => log::debug!("Deleted webhook {webhook_id} (success={success})"),
            Err(e) => log::debug!("Deleting webhook {webhook_id} failed: {e}"),
        }
        self.store.clear_webhook_id(&self.callback_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::testing::{client, request_bodies, respond_with_data};
    use crate::store::MemoryStore;
    use crate::trigger::TriggerEvent;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CALLBACK: &str = "https://hooks.example.com/linear/abc";

    fn config() -> TriggerConfig {
        TriggerConfig {
            event: TriggerEvent::CommentCreated,
            team_id: Some("t1".to_string()),
            secret: Some("s3cret".to_string()),
            verify_signature: true,
            label: None,
        }
    }

    fn stored(id: &str) -> MemoryStore {
        let mut store = MemoryStore::default();
        store.set_webhook_id(CALLBACK, id).unwrap();
        store
    }

    #[test]
    fn callback_must_be_http() {
        let client = LinearClient::new(Default::default());
        assert!(matches!(
            WebhookLifecycle::new(&client, MemoryStore::default(), "ftp://example.com/hook"),
            Err(LinearError::InvalidUrl(_))
        ));
        assert!(matches!(
            WebhookLifecycle::new(&client, MemoryStore::default(), "not a url"),
            Err(LinearError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn stored_webhook_with_matching_url_exists() {
        let server = MockServer::start().await;
        respond_with_data(&server, json!({ "webhook": { "id": "w1", "url": CALLBACK, "enabled": true } }))
            .await;
        let client = client(&server);

        let mut lifecycle = WebhookLifecycle::new(&client, stored("w1"), CALLBACK).unwrap();
        assert!(lifecycle.check_exists().await.unwrap());
        assert_eq!(request_bodies(&server).await.len(), 1);
    }

    #[tokio::test]
    async fn webhook_found_by_url_is_adopted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("WebhookRef("))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{ "message": "Entity not found" }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("WebhookRefs("))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "webhooks": {
                "nodes": [
                    { "id": "other", "url": "https://elsewhere.example.com", "enabled": true },
                    { "id": "w2", "url": CALLBACK, "enabled": true }
                ],
                "pageInfo": { "hasNextPage": false }
            } } })))
            .mount(&server)
            .await;
        let client = client(&server);

        let mut lifecycle = WebhookLifecycle::new(&client, stored("stale"), CALLBACK).unwrap();
        assert!(lifecycle.check_exists().await.unwrap());
        assert_eq!(lifecycle.store().webhook_id(CALLBACK).as_deref(), Some("w2"));
    }

    #[tokio::test]
    async fn nothing_registered_does_not_exist() {
        let server = MockServer::start().await;
        respond_with_data(
            &server,
            json!({ "webhooks": { "nodes": [], "pageInfo": { "hasNextPage": false } } }),
        )
        .await;
        let client = client(&server);

        let mut lifecycle = WebhookLifecycle::new(&client, MemoryStore::default(), CALLBACK).unwrap();
        assert!(!lifecycle.check_exists().await.unwrap());
        assert_eq!(lifecycle.store().webhook_id(CALLBACK), None);
    }

    #[tokio::test]
    async fn create_registers_the_event_resource_type() {
        let server = MockServer::start().await;
        respond_with_data(
            &server,
            json!({ "webhookCreate": { "success": true, "webhook": { "id": "w3" } } }),
        )
        .await;
        let client = client(&server);

        let mut lifecycle = WebhookLifecycle::new(&client, MemoryStore::default(), CALLBACK).unwrap();
        assert_eq!(lifecycle.create(&config()).await.unwrap(), "w3");
        assert_eq!(lifecycle.store().webhook_id(CALLBACK).as_deref(), Some("w3"));
        assert_eq!(
            request_bodies(&server).await[0]["variables"]["input"],
            json!({
                "url": CALLBACK,
                "resourceTypes": ["Comment"],
                "enabled": true,
                "teamId": "t1",
                "secret": "s3cret"
            })
        );
    }

    #[tokio::test]
    async fn unsuccessful_create_is_an_error() {
        let server = MockServer::start().await;
        respond_with_data(&server, json!({ "webhookCreate": { "success": false, "webhook": null } })).await;
        let client = client(&server);

        let mut lifecycle = WebhookLifecycle::new(&client, MemoryStore::default(), CALLBACK).unwrap();
        assert!(matches!(
            lifecycle.create(&config()).await,
            Err(LinearError::WebhookCreateFailed)
        ));
        assert_eq!(lifecycle.store().webhook_id(CALLBACK), None);
    }

    #[tokio::test]
    async fn delete_clears_the_record_even_when_linear_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;
        let client = client(&server);

        let mut lifecycle = WebhookLifecycle::new(&client, stored("w4"), CALLBACK).unwrap();
        lifecycle.delete().await.unwrap();
        assert_eq!(lifecycle.into_store().webhook_id(CALLBACK), None);
    }

    #[tokio::test]
    async fn delete_without_record_makes_no_request() {
        let server = MockServer::start().await;
        let client = client(&server);

        let mut lifecycle = WebhookLifecycle::new(&client, MemoryStore::default(), CALLBACK).unwrap();
        lifecycle.delete().await.unwrap();
        assert!(request_bodies(&server).await.is_empty());
    }
}
