//! Incoming webhook deliveries: signature check, verification pings, and
//! filtering down to the subscribed event.

use serde_json::Value;

use super::{TriggerConfig, TriggerEvent};
use crate::responses::JsonObject;
use crate::transport::signature::verify_webhook_signature;

/// Header Linear puts the HMAC signature in.
pub const SIGNATURE_HEADER: &str = "linear-signature";

/// Delivery fields copied into an emitted item, after `event`.
const FORWARDED_FIELDS: [&str; 8] = [
    "type",
    "action",
    "data",
    "createdAt",
    "organizationId",
    "webhookId",
    "webhookTimestamp",
    "url",
];

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    /// Answer with `reason` and start nothing.
    Rejected { reason: &'static str },
    /// Linear's URL verification ping.
    Verification,
    /// A valid delivery for some other event.
    Suppressed,
    Emitted(JsonObject),
}

impl DeliveryOutcome {
    /// Body to answer the delivery with, if the outcome calls for one.
    pub fn response_body(&self) -> Option<String> {
        match self {
            DeliveryOutcome::Rejected { reason } => Some((*reason).to_string()),
            DeliveryOutcome::Verification => Some(r#"{"success":true}"#.to_string()),
            DeliveryOutcome::Suppressed | DeliveryOutcome::Emitted(_) => None,
        }
    }
}

pub fn handle_delivery(
    config: &TriggerConfig,
    raw_body: &[u8],
    signature: Option<&str>,
) -> DeliveryOutcome {
    if let Some(secret) = config.verification_secret() {
        let valid = signature.is_some_and(|sig| verify_webhook_signature(raw_body, sig, secret));
        if !valid {
            log::warn!("Rejected delivery with missing or invalid signature");
            return DeliveryOutcome::Rejected {
                reason: "Invalid signature",
            };
        }
    }

    let body: JsonObject = match serde_json::from_slice(raw_body) {
        Ok(body) => body,
        Err(e) => {
            log::warn!("Rejected delivery with unreadable body: {e}");
            return DeliveryOutcome::Rejected {
                reason: "Invalid payload",
            };
        }
    };

    let resource_type = body.get("type").and_then(Value::as_str).unwrap_or_default();
    if resource_type == "UrlVerification" {
        return DeliveryOutcome::Verification;
    }
    let action = body.get("action").and_then(Value::as_str).unwrap_or_default();

    match TriggerEvent::from_delivery(resource_type, action) {
        Some(event) if event == config.event => {
            let mut item = JsonObject::new();
            item.insert("event".to_string(), Value::String(event.as_str().to_string()));
            for field in FORWARDED_FIELDS {
                if let Some(value) = body.get(field) {
                    item.insert(field.to_string(), value.clone());
                }
            }
            log::debug!("Emitting {event} delivery");
            DeliveryOutcome::Emitted(item)
        }
        _ => {
            log::debug!("Suppressed {resource_type}:{action} delivery (waiting for {})", config.event);
            DeliveryOutcome::Suppressed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::signature::sign_payload;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn issue_create() -> Vec<u8> {
        body(json!({
            "type": "Issue",
            "action": "create",
            "data": { "id": "i1", "title": "Crash on save" },
            "createdAt": "2026-01-05T10:00:00.000Z",
            "organizationId": "org1",
            "webhookId": "w1",
            "webhookTimestamp": 1767607200000u64
        }))
    }

    fn config(event: TriggerEvent) -> TriggerConfig {
        TriggerConfig::new(event)
    }

    #[test]
    fn matching_event_is_emitted() {
        let outcome = handle_delivery(&config(TriggerEvent::IssueCreated), &issue_create(), None);
        let DeliveryOutcome::Emitted(item) = outcome else {
            panic!("expected an emitted item, got {outcome:?}");
        };
        assert_eq!(
            Value::Object(item),
            json!({
                "event": "issueCreated",
                "type": "Issue",
                "action": "create",
                "data": { "id": "i1", "title": "Crash on save" },
                "createdAt": "2026-01-05T10:00:00.000Z",
                "organizationId": "org1",
                "webhookId": "w1",
                "webhookTimestamp": 1767607200000u64
            })
        );
    }

    #[test]
    fn other_events_are_suppressed() {
        let outcome = handle_delivery(&config(TriggerEvent::IssueUpdated), &issue_create(), None);
        assert_eq!(outcome, DeliveryOutcome::Suppressed);
        assert_eq!(outcome.response_body(), None);

        let unknown = body(json!({ "type": "Initiative", "action": "create" }));
        assert_eq!(
            handle_delivery(&config(TriggerEvent::IssueCreated), &unknown, None),
            DeliveryOutcome::Suppressed
        );
    }

    #[test]
    fn signed_delivery_is_accepted() {
        let mut config = config(TriggerEvent::IssueCreated);
        config.secret = Some("s3cret".to_string());
        let raw = issue_create();
        let signature = sign_payload(&raw, "s3cret").unwrap();

        assert!(matches!(
            handle_delivery(&config, &raw, Some(&signature)),
            DeliveryOutcome::Emitted(_)
        ));
    }

    #[test]
    fn missing_or_wrong_signature_is_rejected() {
        let mut config = config(TriggerEvent::IssueCreated);
        config.secret = Some("s3cret".to_string());
        let raw = issue_create();
        let wrong = sign_payload(&raw, "other").unwrap();

        for signature in [None, Some(wrong.as_str())] {
            let outcome = handle_delivery(&config, &raw, signature);
            assert_eq!(outcome.response_body().as_deref(), Some("Invalid signature"));
        }
    }

    #[test]
    fn disabled_verification_skips_the_check() {
        let mut config = config(TriggerEvent::IssueCreated);
        config.secret = Some("s3cret".to_string());
        config.verify_signature = false;

        assert!(matches!(
            handle_delivery(&config, &issue_create(), None),
            DeliveryOutcome::Emitted(_)
        ));
    }

    #[test]
    fn verification_ping_is_answered() {
        let ping = body(json!({ "type": "UrlVerification" }));
        let outcome = handle_delivery(&config(TriggerEvent::CycleCreated), &ping, None);
        assert_eq!(outcome, DeliveryOutcome::Verification);
        assert_eq!(outcome.response_body().as_deref(), Some(r#"{"success":true}"#));
    }

    #[test]
    fn unreadable_body_is_rejected() {
        let outcome = handle_delivery(&config(TriggerEvent::IssueCreated), b"not json", None);
        assert_eq!(outcome, DeliveryOutcome::Rejected { reason: "Invalid payload" });
    }
}
