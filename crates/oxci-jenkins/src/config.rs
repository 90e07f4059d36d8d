use crate::error::{ClientError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Per-input configuration, deserialized from the agent's `[[inputs]]` entry.
///
/// Built once at startup and shared read-only by every cycle.
#[derive(Clone, Deserialize)]
pub struct PollConfig {
    /// Extra `host` tag; omitted from measurements when empty.
    #[serde(default)]
    pub host: String,
    /// Jenkins base address, also emitted as the `url` tag.
    pub url: String,
    pub username: String,
    /// Password or Jenkins-generated API token.
    pub password: String,
    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure: bool,
    /// Per-label queue counts and the `worker_labels` measurement.
    #[serde(default)]
    pub extended_labels: bool,
    #[serde(default = "default_response_timeout")]
    pub response_timeout_secs: u64,
}

impl std::fmt::Debug for PollConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollConfig")
            .field("host", &self.host)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("insecure", &self.insecure)
            .field("extended_labels", &self.extended_labels)
            .field("response_timeout_secs", &self.response_timeout_secs)
            .finish()
    }
}

/// Per-request timeout used when `response_timeout_secs` is not set.
pub const DEFAULT_RESPONSE_TIMEOUT_SECS: u64 = 30;

fn default_response_timeout() -> u64 {
    DEFAULT_RESPONSE_TIMEOUT_SECS
}

impl PollConfig {
    pub fn new(url: &str, username: &str, password: &str) -> Self {
        Self {
            host: String::new(),
            url: url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            insecure: false,
            extended_labels: false,
            response_timeout_secs: default_response_timeout(),
        }
    }

    /// Reject configurations no cycle could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(ClientError::ConfigError("url is required".to_string()));
        }
        reqwest::Url::parse(self.url.trim())
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", self.url)))?;
        if self.username.is_empty() {
            return Err(ClientError::ConfigError("username is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(ClientError::ConfigError("password is required".to_string()));
        }
        if self.response_timeout_secs == 0 {
            return Err(ClientError::ConfigError(
                "response_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Tags attached to every measurement of this input.
    pub fn tags(&self) -> HashMap<String, String> {
        let mut tags = HashMap::new();
        if !self.host.is_empty() {
            tags.insert("host".to_string(), self.host.clone());
        }
        tags.insert("url".to_string(), self.url.clone());
        tags
    }
}
