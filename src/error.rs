use std::path::PathBuf;
use thiserror::Error;

/// Fallback machine code when Linear does not send `extensions.code`.
pub const GRAPHQL_ERROR_CODE: &str = "GRAPHQL_ERROR";

#[derive(Error, Debug)]
pub enum LinearError {
    #[error("No Linear credentials configured. Set LINEAR_API_KEY or LINEAR_OAUTH_TOKEN, or run `linear-connector init`")]
    Authentication,

    #[error("Linear API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Linear API request failed (status {status}): {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Linear API Error: {message}")]
    Api {
        code: String,
        message: String,
        details: String,
    },

    #[error("Unexpected response shape at `{path}`: {reason}")]
    UnexpectedShape { path: String, reason: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Pagination stopped after {0} pages without reaching the end")]
    PageLimitExceeded(usize),

    #[error("Missing required parameter `{0}`")]
    MissingParameter(String),

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Unknown operation `{operation}` for resource `{resource}`")]
    UnknownOperation { resource: String, operation: String },

    #[error("Unknown event type: {0}")]
    UnknownEvent(String),

    #[error("Failed to create webhook in Linear")]
    WebhookCreateFailed,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config file at {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to write webhook store at {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse webhook store at {path}: {source}")]
    StoreParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LinearError {
    /// Machine-readable code for host-visible failures.
    pub fn code(&self) -> &str {
        match self {
            Self::Authentication => "AUTHENTICATION",
            Self::ApiRequest(_) | Self::HttpStatus { .. } => "API_REQUEST",
            Self::Api { code, .. } => code.as_str(),
            Self::UnexpectedShape { .. } => "UNEXPECTED_SHAPE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::PageLimitExceeded(_) => "PAGE_LIMIT",
            Self::MissingParameter(_) | Self::InvalidParameter { .. } => "INVALID_PARAMETER",
            Self::UnknownResource(_) | Self::UnknownOperation { .. } | Self::UnknownEvent(_) => {
                "UNSUPPORTED"
            }
            Self::WebhookCreateFailed => "WEBHOOK_CREATE_FAILED",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            _ => "INTERNAL",
        }
    }

    pub(crate) fn shape(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::UnexpectedShape {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LinearError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_server_code() {
        let err = LinearError::Api {
            code: "FORBIDDEN".to_string(),
            message: "boom".to_string(),
            details: "boom".to_string(),
        };
        assert_eq!(err.code(), "FORBIDDEN");
        assert_eq!(err.to_string(), "Linear API Error: boom");
    }

    #[test]
    fn missing_parameter_names_the_parameter() {
        let err = LinearError::MissingParameter("issueId".to_string());
        assert_eq!(err.code(), "INVALID_PARAMETER");
        assert!(err.to_string().contains("issueId"));
    }
}
