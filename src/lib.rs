//! Linear GraphQL connector: an action node covering Linear's resources and
//! a webhook trigger node, host independent.

pub mod config;
pub mod error;
pub mod node;
pub mod params;
pub mod resources;
pub mod responses;
pub mod store;
pub mod transport;
pub mod trigger;

pub use config::Config;
pub use error::{LinearError, Result};
pub use node::{execute, OutputItem};
pub use params::{ItemParams, JsonItems, NodeParameters};
pub use resources::{NodeOutput, Resource};
pub use responses::JsonObject;
pub use store::{FileStore, MemoryStore};
pub use transport::{Credentials, LicenseNotice, LinearClient, PageLimit};
pub use trigger::{handle_delivery, DeliveryOutcome, TriggerConfig, TriggerEvent, WebhookLifecycle, WebhookStore};
