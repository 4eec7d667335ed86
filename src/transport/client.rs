use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{LinearError, Result, GRAPHQL_ERROR_CODE};
use crate::responses::{at, Connection, GraphQLError, GraphQLResponse, JsonObject};

pub const API_ENDPOINT: &str = "https://api.linear.app/graphql";

/// Linear caps connection pages at 50 nodes.
pub const MAX_PAGE_SIZE: usize = 50;

/// Pages fetched before an unbounded listing is abandoned.
pub const DEFAULT_MAX_PAGES: usize = 1000;

const LICENSE_NOTICE: &str = "linear-connector is licensed under the Business Source License 1.1. \
Production use by for-profit organizations requires a commercial license.";

/// Credentials in resolution order: API key first, then OAuth2 access token.
#[derive(Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub oauth_token: Option<String>,
}

impl Credentials {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            oauth_token: None,
        }
    }

    pub fn oauth(token: impl Into<String>) -> Self {
        Self {
            api_key: None,
            oauth_token: Some(token.into()),
        }
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return Ok(key.to_string());
        }
        if let Some(token) = self.oauth_token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(format!("Bearer {token}"));
        }
        Err(LinearError::Authentication)
    }
}

/// Process-scoped "show once" state for the licensing notice.
///
/// Share one instance (behind an `Arc`) between every client of a process.
#[derive(Default)]
pub struct LicenseNotice {
    shown: AtomicBool,
}

impl LicenseNotice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the notice unless this instance already did. Returns whether it logged.
    pub fn emit(&self) -> bool {
        if self.shown.swap(true, Ordering::AcqRel) {
            return false;
        }
        log::warn!("{LICENSE_NOTICE}");
        true
    }

    pub fn has_been_shown(&self) -> bool {
        self.shown.load(Ordering::Acquire)
    }
}

/// How many nodes a paginated listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLimit {
    All,
    AtMost(usize),
}

impl PageLimit {
    pub fn new(return_all: bool, limit: usize) -> Self {
        if return_all {
            PageLimit::All
        } else {
            PageLimit::AtMost(limit)
        }
    }

    pub fn page_size(self) -> usize {
        match self {
            PageLimit::All => MAX_PAGE_SIZE,
            PageLimit::AtMost(limit) => limit.min(MAX_PAGE_SIZE),
        }
    }
}

pub struct LinearClient {
    http: Client,
    endpoint: String,
    credentials: Credentials,
    notice: Arc<LicenseNotice>,
    max_pages: usize,
}

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    variables: &'a Value,
}

impl LinearClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            http: Client::new(),
            endpoint: API_ENDPOINT.to_string(),
            credentials,
            notice: Arc::new(LicenseNotice::new()),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_notice(mut self, notice: Arc<LicenseNotice>) -> Self {
        self.notice = notice;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Run one query or mutation and return its unwrapped `data`.
    pub async fn request(&self, query: &str, variables: Value) -> Result<Value> {
        self.notice.emit();

        let authorization = self.credentials.authorization()?;
        let variables = match variables {
            Value::Null => Value::Object(JsonObject::new()),
            other => other,
        };
        let request = GraphQLRequest {
            query,
            variables: &variables,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", authorization)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read response body>".to_string());

            // Linear reports validation failures as 400 with a regular error envelope.
            if let Ok(envelope) = serde_json::from_str::<GraphQLResponse<Value>>(&body) {
                if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
                    return Err(api_error(&errors));
                }
            }
            return Err(LinearError::HttpStatus {
                status: status.as_u16(),
                message: body,
            });
        }

        let gql_response: GraphQLResponse<Value> = response.json().await?;

        if let Some(errors) = gql_response.errors.filter(|e| !e.is_empty()) {
            return Err(api_error(&errors));
        }

        match gql_response.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(LinearError::Api {
                code: "NO_DATA".to_string(),
                message: "No data returned from Linear API".to_string(),
                details: String::new(),
            }),
        }
    }

    /// Like [`request`](Self::request), deserializing `data` into `T`.
    pub async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let data = self.request(query, variables).await?;
        serde_json::from_value(data).map_err(|e| LinearError::shape("data", e))
    }

    /// Follow a connection at `path` page by page until `limit` is satisfied.
    ///
    /// `variables` must be an object (or null); `first` and `after` are added per page.
    pub async fn paginate<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        path: &str,
        limit: PageLimit,
    ) -> Result<Vec<T>> {
        if limit == PageLimit::AtMost(0) {
            return Ok(Vec::new());
        }

        let base = match variables {
            Value::Object(map) => map,
            Value::Null => JsonObject::new(),
            other => {
                return Err(LinearError::InvalidParameter {
                    name: "variables".to_string(),
                    reason: format!("expected an object, got {other}"),
                })
            }
        };
        let page_size = limit.page_size();

        let mut results = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0;

        loop {
            // Bounded listings end at `limit`; only `All` can run away.
            if limit == PageLimit::All && pages == self.max_pages {
                return Err(LinearError::PageLimitExceeded(pages));
            }
            pages += 1;

            let mut page_variables = base.clone();
            page_variables.insert("first".to_string(), Value::from(page_size));
            match &cursor {
                Some(after) => {
                    page_variables.insert("after".to_string(), Value::String(after.clone()));
                }
                None => {
                    page_variables.remove("after");
                }
            }

            let data = self.request(query, Value::Object(page_variables)).await?;
            let connection: Connection<T> = at(&data, path)?;
            log::debug!(
                "{path}: page {pages} returned {} nodes (hasNextPage={})",
                connection.nodes.len(),
                connection.page_info.has_next_page
            );
            results.extend(connection.nodes);

            if let PageLimit::AtMost(max) = limit {
                if results.len() >= max {
                    results.truncate(max);
                    return Ok(results);
                }
            }

            if !connection.page_info.has_next_page {
                break;
            }
            match connection.page_info.end_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    log::warn!("{path}: hasNextPage without endCursor, stopping pagination");
                    break;
                }
            }
        }

        Ok(results)
    }
}

fn api_error(errors: &[GraphQLError]) -> LinearError {
    let primary = &errors[0];
    let extensions = primary.extensions.clone().unwrap_or_default();
    LinearError::Api {
        code: extensions
            .code
            .unwrap_or_else(|| GRAPHQL_ERROR_CODE.to_string()),
        message: extensions
            .user_presentable_message
            .unwrap_or_else(|| primary.message.clone()),
        details: errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; "),
    }
}
