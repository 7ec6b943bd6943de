//! Trigger configuration.
//!
//! `TriggerConfig` is constructed once at process startup (from CLI flags or
//! their environment-variable fallbacks) and passed into the scheduler
//! callback by `Arc`. Nothing reads ambient process state after startup.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use secrecy::{ExposeSecret, SecretString};

/// Configuration for the scheduled trigger.
///
/// A missing `base_url` or `api_key` is not a startup error: the scheduler
/// runs anyway and each tick logs what is missing and skips the request
/// (the operator may fix the environment and restart at any time).
#[derive(Clone)]
pub struct TriggerConfig {
    /// Cron expression controlling when ticks fire (5- or 6-field).
    pub schedule: String,
    /// Base URL of the target service (e.g., `https://example.com`).
    pub base_url: String,
    /// Path appended verbatim to `base_url` (e.g., `/jobs/run`).
    pub endpoint_path: String,
    /// Shared-secret credential sent as the `x-api-key` header value.
    pub api_key: SecretString,
}

impl TriggerConfig {
    /// The target URL: the literal concatenation of base URL and endpoint
    /// path. No templating, no query parameters, no path normalization.
    pub fn target_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint_path)
    }

    /// Names of the required fields that are empty.
    ///
    /// Absent and empty are equivalent: an unset environment variable
    /// materializes as an empty string here. The endpoint path is not
    /// required; an empty path is legal.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.base_url.is_empty() {
            missing.push("base URL");
        }
        if self.api_key.expose_secret().is_empty() {
            missing.push("API key");
        }
        missing
    }
}
