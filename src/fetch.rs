//! External snapshot fetching
//!
//! One GET per snapshot, no retries. Every failure is folded into a
//! `FetchOutcome::Failed` so the caller decides what to store instead.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::SourcesConfig;

/// Why a snapshot could not be obtained
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(StatusCode),

    #[error("invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The body parsed to `null`, `false`, `0` or `""`
    #[error("empty payload")]
    EmptyPayload,
}

/// Result of a single fetch
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(Value),
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched(_))
    }

    /// The parsed payload, if the fetch succeeded
    pub fn payload(&self) -> Option<&Value> {
        match self {
            FetchOutcome::Fetched(value) => Some(value),
            FetchOutcome::Failed(_) => None,
        }
    }

    /// Pick a value out of the payload, or the "Unavailable" sentinel when the
    /// fetch failed or `select` finds nothing.
    pub fn field_or_sentinel(&self, select: impl FnOnce(&Value) -> Option<&Value>) -> Value {
        self.payload()
            .and_then(select)
            .filter(|value| !is_empty_payload(value))
            .cloned()
            .unwrap_or_else(crate::types::sentinel)
    }
}

/// Scalars that carry no data. Empty arrays and objects still count.
fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

impl From<Result<Value, FetchError>> for FetchOutcome {
    fn from(result: Result<Value, FetchError>) -> Self {
        match result {
            Ok(value) if is_empty_payload(&value) => FetchOutcome::Failed(FetchError::EmptyPayload),
            Ok(value) => FetchOutcome::Fetched(value),
            Err(e) => FetchOutcome::Failed(e),
        }
    }
}

/// Anything that can produce a JSON document for a URL
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Fetch and parse `url`. Never fails the run.
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// `JsonSource` backed by reqwest
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build the HTTP client. No explicit timeout; the client default applies.
    pub fn new(sources: &SourcesConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&sources.user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl JsonSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let outcome = FetchOutcome::from(self.get_json(url).await);
        if let FetchOutcome::Failed(e) = &outcome {
            warn!("Failed to fetch {}: {}", url, e);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_body_is_a_failure() {
        let outcome = FetchOutcome::from(Ok(Value::Null));
        assert!(matches!(outcome, FetchOutcome::Failed(FetchError::EmptyPayload)));
    }

    #[test]
    fn test_falsy_scalar_bodies_are_failures() {
        for body in [json!(false), json!(0), json!(0.0), json!("")] {
            let outcome = FetchOutcome::from(Ok(body.clone()));
            assert!(
                matches!(outcome, FetchOutcome::Failed(FetchError::EmptyPayload)),
                "{} should not count as fetched",
                body
            );
        }
    }

    #[test]
    fn test_empty_containers_and_truthy_scalars_are_fetched() {
        for body in [json!([]), json!({}), json!(true), json!(-1), json!("0")] {
            assert!(FetchOutcome::from(Ok(body.clone())).is_fetched(), "{}", body);
        }
    }

    #[test]
    fn test_falsy_field_becomes_sentinel() {
        let outcome = FetchOutcome::Fetched(json!({"current_weather": 0, "other": false}));
        assert_eq!(outcome.field_or_sentinel(|v| v.get("current_weather")), json!("Unavailable"));
        assert_eq!(outcome.field_or_sentinel(|v| v.get("other")), json!("Unavailable"));
    }

    #[test]
    fn test_field_or_sentinel_selects_nested_object() {
        let outcome = FetchOutcome::Fetched(json!({
            "latitude": 37.76,
            "current_weather": {"temperature": 16.1, "windspeed": 9.4}
        }));
        let field = outcome.field_or_sentinel(|v| v.get("current_weather"));
        assert_eq!(field, json!({"temperature": 16.1, "windspeed": 9.4}));
    }

    #[test]
    fn test_field_or_sentinel_missing_key() {
        let outcome = FetchOutcome::Fetched(json!({"latitude": 37.76}));
        assert!(outcome.is_fetched());
        assert_eq!(outcome.field_or_sentinel(|v| v.get("current_weather")), json!("Unavailable"));
    }

    #[test]
    fn test_field_or_sentinel_on_failure() {
        let outcome = FetchOutcome::Failed(FetchError::Status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!outcome.is_fetched());
        assert!(outcome.payload().is_none());
        assert_eq!(outcome.field_or_sentinel(|v| Some(v)), json!("Unavailable"));
    }

    #[test]
    fn test_status_error_message() {
        let e = FetchError::Status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(e.to_string(), "HTTP error! status: 503 Service Unavailable");
    }

    #[tokio::test]
    async fn test_mock_source_returns_configured_outcome() {
        let mut source = MockJsonSource::new();
        source
            .expect_fetch()
            .withf(|url| url.contains("prices"))
            .times(1)
            .returning(|_| FetchOutcome::Fetched(json!({"bitcoin": {"usd": 1}})));

        let outcome = source.fetch("http://example.test/prices").await;
        assert_eq!(outcome.payload(), Some(&json!({"bitcoin": {"usd": 1}})));
    }
}
