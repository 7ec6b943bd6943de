//! The trigger runner: one authenticated POST per tick.
//!
//! Each tick checks that the configuration is complete, fires a single POST
//! at the configured target, and classifies the result into a
//! [`TickOutcome`]. Exactly one log line is emitted per outcome. Nothing is
//! retried and nothing is persisted; the next tick starts from scratch.
//!
//! Overlap is permitted: if the schedule fires again while a previous tick
//! is still waiting on the network, both ticks run concurrently. The runner
//! holds no mutable state, so no mutual exclusion exists or is needed.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Serialize;

use crate::config::TriggerConfig;

/// The classified result of one tick.
///
/// Variants are mutually exclusive and checked in declaration order: a
/// request that never completed has no status to branch on, and a 401 is
/// reported as an authentication failure rather than a generic HTTP error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    /// Configuration incomplete; no request was attempted.
    Skipped { missing: Vec<&'static str> },
    /// The request never completed (DNS failure, connection refused, ...).
    TransportError { message: String },
    /// The target rejected the credential (HTTP 401).
    AuthFailed,
    /// Any other non-2xx response.
    HttpError { status: u16, body: String },
    /// A 2xx response.
    Success { status: u16, url: String },
}

/// Fires one POST per scheduled tick and classifies the response.
pub struct TriggerRunner {
    client: reqwest::Client,
    config: Arc<TriggerConfig>,
}

impl TriggerRunner {
    /// Create a runner over the given configuration.
    ///
    /// The reqwest client keeps its library defaults; in particular no
    /// request timeout is set here.
    pub fn new(config: Arc<TriggerConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Execute one tick.
    ///
    /// Skips (without any network call) when the base URL or API key is
    /// missing, otherwise POSTs to the concatenated target URL with the
    /// shared-secret header and an empty body. Every path logs exactly one
    /// outcome line and returns the matching [`TickOutcome`]; no outcome is
    /// fatal to the process.
    pub async fn run_once(&self) -> TickOutcome {
        let missing = self.config.missing_fields();
        if !missing.is_empty() {
            tracing::error!(
                missing = %missing.join(", "),
                "skipping tick: configuration incomplete"
            );
            return TickOutcome::Skipped { missing };
        }

        let url = self.config.target_url();
        tracing::debug!(%url, "firing trigger");

        let response = match self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .header("x-api-key", self.config.api_key.expose_secret())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let message = e.to_string();
                tracing::error!(%url, error = %message, "trigger request failed");
                return TickOutcome::TransportError { message };
            }
        };

        let status = response.status().as_u16();
        // The final URL after any redirects; captured before the body
        // consumes the response.
        let resolved_url = response.url().to_string();

        if status == 401 {
            tracing::error!(url = %resolved_url, "authentication failed (HTTP 401): check the API key");
            return TickOutcome::AuthFailed;
        }

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, body = %body, "trigger returned HTTP error");
            return TickOutcome::HttpError { status, body };
        }

        tracing::info!(status, url = %resolved_url, "trigger delivered");
        TickOutcome::Success {
            status,
            url: resolved_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn runner(base_url: &str, endpoint_path: &str, api_key: &str) -> TriggerRunner {
        TriggerRunner::new(Arc::new(TriggerConfig {
            schedule: "*/5 * * * *".to_string(),
            base_url: base_url.to_string(),
            endpoint_path: endpoint_path.to_string(),
            api_key: SecretString::from(api_key),
        }))
    }

    #[tokio::test]
    async fn test_success_carries_status_and_resolved_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jobs/run"))
            .and(header("x-api-key", "sk-test"))
            .and(header("content-type", "application/json"))
            .and(body_string(""))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let runner = runner(&server.uri(), "/jobs/run", "sk-test");
        let outcome = runner.run_once().await;

        match outcome {
            TickOutcome::Success { status, url } => {
                assert_eq!(status, 200);
                assert_eq!(url, format!("{}/jobs/run", server.uri()));
            }
            other => panic!("expected Success, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_401_is_auth_failure_not_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jobs/run"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let runner = runner(&server.uri(), "/jobs/run", "wrong-key");
        let outcome = runner.run_once().await;

        assert_eq!(outcome, TickOutcome::AuthFailed);
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jobs/run"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let runner = runner(&server.uri(), "/jobs/run", "sk-test");
        let outcome = runner.run_once().await;

        match outcome {
            TickOutcome::HttpError { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected HttpError, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_4xx_other_than_401_takes_generic_path() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/jobs/run"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let runner = runner(&server.uri(), "/jobs/run", "sk-test");
        let outcome = runner.run_once().await;

        match outcome {
            TickOutcome::HttpError { status, .. } => assert_eq!(status, 403),
            other => panic!("expected HttpError, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_carries_underlying_message() {
        // Bind a server to reserve a local port, then drop it so the
        // connection is refused.
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let runner = runner(&uri, "/jobs/run", "sk-test");
        let outcome = runner.run_once().await;

        match outcome {
            TickOutcome::TransportError { message } => {
                assert!(!message.is_empty());
            }
            other => panic!("expected TransportError, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_skips_without_network_call() {
        let server = MockServer::start().await;

        let runner = runner(&server.uri(), "/jobs/run", "");
        let outcome = runner.run_once().await;

        assert_eq!(
            outcome,
            TickOutcome::Skipped {
                missing: vec!["API key"]
            }
        );
        let requests = server.received_requests().await.unwrap();
        assert!(requests.is_empty(), "no request should have been made");
    }

    #[tokio::test]
    async fn test_missing_base_url_skips() {
        let runner = runner("", "/jobs/run", "sk-test");
        let outcome = runner.run_once().await;

        assert_eq!(
            outcome,
            TickOutcome::Skipped {
                missing: vec!["base URL"]
            }
        );
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = TickOutcome::Success {
            status: 200,
            url: "https://example.com/jobs/run".to_string(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "outcome": "success",
                "status": 200,
                "url": "https://example.com/jobs/run",
            })
        );

        let value = serde_json::to_value(TickOutcome::AuthFailed).unwrap();
        assert_eq!(value, serde_json::json!({ "outcome": "auth_failed" }));
    }
}
