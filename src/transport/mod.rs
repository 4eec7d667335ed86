//! Everything that talks to, or shapes data for, the Linear GraphQL endpoint.

pub mod client;
pub mod filter;
pub mod identifier;
pub mod signature;
pub mod values;

pub use client::{Credentials, LicenseNotice, LinearClient, PageLimit};
pub use filter::build_filter;
pub use identifier::{parse_identifier, IssueKey};
pub use signature::{sign_payload, verify_webhook_signature};
pub use values::{clean_object, format_date_for_linear};
