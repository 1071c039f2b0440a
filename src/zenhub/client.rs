use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, Error, Result};

/// A remote source that executes GraphQL documents.
///
/// Implementations return the `data` member of the response, or a
/// classified [`ApiError`].
pub trait GraphQl: Send + Sync {
  fn execute<'a>(&'a self, query: &'a str, variables: Value)
    -> BoxFuture<'a, Result<Value, ApiError>>;
}

/// GraphQL-over-HTTP client used for both ZenHub and GitHub.
#[derive(Clone)]
pub struct GraphQlClient {
  name: &'static str,
  http: reqwest::Client,
  endpoint: Url,
  token: String,
}

impl GraphQlClient {
  pub fn new(name: &'static str, endpoint: &str, token: String, timeout: Duration) -> Result<Self> {
    let endpoint = Url::parse(endpoint)
      .map_err(|e| Error::Config(format!("Invalid {} endpoint {}: {}", name, endpoint, e)))?;

    let http = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(concat!("zh/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| Error::Config(format!("Failed to create {} client: {}", name, e)))?;

    Ok(Self {
      name,
      http,
      endpoint,
      token,
    })
  }

  /// Client for the ZenHub GraphQL API.
  pub fn zenhub(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()?;
    Self::new("ZenHub", &config.zenhub.url, token, config.timeout())
  }

  /// Client for the GitHub GraphQL API, if a token is available.
  pub fn github(config: &Config) -> Result<Option<Self>> {
    match Config::get_github_token() {
      Some(token) => Self::new("GitHub", &config.github.url, token, config.timeout()).map(Some),
      None => Ok(None),
    }
  }

  async fn send(&self, query: &str, variables: Value) -> Result<Value, ApiError> {
    let body = json!({ "query": query, "variables": variables });

    let response = self
      .http
      .post(self.endpoint.clone())
      .bearer_auth(&self.token)
      .json(&body)
      .send()
      .await
      .map_err(|e| ApiError::Failed(format!("{} request failed: {}", self.name, e)))?;

    let status = response.status();
    debug!(api = self.name, status = status.as_u16(), "graphql response");
    if let Some(err) = classify_status(status, response.headers()) {
      return Err(err);
    }

    let envelope: GraphQlResponse = response
      .json()
      .await
      .map_err(|e| ApiError::Malformed(e.to_string()))?;

    if !envelope.errors.is_empty() {
      return Err(classify_errors(&envelope.errors));
    }

    envelope
      .data
      .filter(|d| !d.is_null())
      .ok_or_else(|| ApiError::Malformed("response has no data".to_string()))
  }
}

impl GraphQl for GraphQlClient {
  fn execute<'a>(
    &'a self,
    query: &'a str,
    variables: Value,
  ) -> BoxFuture<'a, Result<Value, ApiError>> {
    Box::pin(self.send(query, variables))
  }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
  data: Option<Value>,
  #[serde(default)]
  errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
  #[serde(default)]
  message: String,
  /// GitHub reports the error class here
  #[serde(rename = "type")]
  kind: Option<String>,
  /// ZenHub and most servers report it as `extensions.code`
  extensions: Option<Value>,
}

impl GraphQlError {
  fn code(&self) -> Option<&str> {
    self.kind.as_deref().or_else(|| {
      self
        .extensions
        .as_ref()
        .and_then(|e| e.get("code"))
        .and_then(Value::as_str)
    })
  }
}

/// Map an HTTP status to an error, or `None` when the body should be read.
fn classify_status(status: StatusCode, headers: &HeaderMap) -> Option<ApiError> {
  let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

  match status.as_u16() {
    429 => Some(ApiError::RateLimited {
      retry_after: header(RETRY_AFTER.as_str()).and_then(|v| v.trim().parse().ok()),
    }),
    // GitHub signals an exhausted quota with a 403
    403 if header("x-ratelimit-remaining") == Some("0") => Some(ApiError::RateLimited {
      retry_after: header(RETRY_AFTER.as_str()).and_then(|v| v.trim().parse().ok()),
    }),
    401 | 403 => Some(ApiError::Auth(format!("HTTP {}", status))),
    404 => Some(ApiError::NotFound(format!("HTTP {}", status))),
    _ if status.is_success() => None,
    _ => Some(ApiError::Failed(format!("HTTP {}", status))),
  }
}

fn classify_errors(errors: &[GraphQlError]) -> ApiError {
  let message = errors
    .iter()
    .map(|e| e.message.as_str())
    .collect::<Vec<_>>()
    .join("; ");

  match errors.iter().find_map(GraphQlError::code) {
    Some("NOT_FOUND") => ApiError::NotFound(message),
    Some("UNAUTHENTICATED") | Some("FORBIDDEN") => ApiError::Auth(message),
    Some("RATE_LIMITED") => ApiError::RateLimited { retry_after: None },
    _ => ApiError::Failed(message),
  }
}
