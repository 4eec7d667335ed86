//! The webhook-driven trigger node.

pub mod delivery;
pub mod events;
pub mod lifecycle;

use serde::Deserialize;

pub use delivery::{handle_delivery, DeliveryOutcome, SIGNATURE_HEADER};
pub use events::{Action, TriggerEvent};
pub use lifecycle::{WebhookLifecycle, WebhookStore};

/// Trigger node parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfig {
    pub event: TriggerEvent,
    /// Restrict the webhook to one team; all public teams otherwise.
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default, alias = "webhookSecret")]
    pub secret: Option<String>,
    #[serde(default = "default_verify")]
    pub verify_signature: bool,
    #[serde(default, alias = "webhookLabel")]
    pub label: Option<String>,
}

fn default_verify() -> bool {
    true
}

impl TriggerConfig {
    pub fn new(event: TriggerEvent) -> Self {
        Self {
            event,
            team_id: None,
            secret: None,
            verify_signature: true,
            label: None,
        }
    }

    /// The secret deliveries must be signed with, when verification applies.
    pub fn verification_secret(&self) -> Option<&str> {
        self.secret
            .as_deref()
            .filter(|secret| self.verify_signature && !secret.is_empty())
    }
}
