use crate::client::HttpJenkinsClient;
use crate::collector::JenkinsCollector;
use crate::transport::Transport;
use crate::PollConfig;
use anyhow::{Context, Result};
use oxci_common::plugin::{Input, InputPlugin};
use oxci_common::sink::MeasurementSink;
use serde_json::Value;
use std::sync::Arc;

/// Name the Jenkins input is registered under.
pub const PLUGIN_NAME: &str = "jenkins";

const SAMPLE_CONFIG: &str = r#"[[inputs]]
  type = "jenkins"
  ## Optional value for an additional "host" tag
  host = "jenkins1"
  ## Jenkins base address: [protocol://]address[:port]
  ##   e.g. http://jenkins.service.consul:8080/
  url = "http://jenkins.service.consul:8080"
  ## Credentials; password may be a Jenkins-generated API token
  username = "admin"
  password = "password"
  ## Skip TLS certificate verification (self-signed or internal servers only)
  insecure = false
  ## Count queued items per job label and agents per label.
  ## Costs one extra request per buildable queue item and per agent.
  extended_labels = false
  ## Per-request timeout
  response_timeout_secs = 30
"#;

/// Factory for [`JenkinsInput`], registered as `"jenkins"`.
pub struct JenkinsPlugin;

impl JenkinsPlugin {
    fn parse(config: &Value) -> Result<PollConfig> {
        let poll: PollConfig =
            serde_json::from_value(config.clone()).context("Invalid jenkins input config")?;
        poll.validate().context("Invalid jenkins input config")?;
        Ok(poll)
    }

    /// Concrete input behind [`InputPlugin::create_input`].
    pub fn build_input(&self, config: &Value) -> Result<JenkinsInput> {
        JenkinsInput::new(Self::parse(config)?)
    }
}

impl InputPlugin for JenkinsPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn description(&self) -> &str {
        "Reads metrics from a Jenkins server"
    }

    fn sample_config(&self) -> &str {
        SAMPLE_CONFIG
    }

    fn validate_config(&self, config: &Value) -> Result<()> {
        Self::parse(config).map(|_| ())
    }

    fn create_input(&self, config: &Value) -> Result<Box<dyn Input>> {
        Ok(Box::new(self.build_input(config)?))
    }

    fn redact_config(&self, config: &Value) -> Value {
        let mut redacted = config.clone();
        if let Some(obj) = redacted.as_object_mut() {
            if obj.contains_key("password") {
                obj.insert("password".to_string(), Value::String("***".to_string()));
            }
        }
        redacted
    }
}

/// A Jenkins server polled through [`HttpJenkinsClient`].
pub struct JenkinsInput {
    collector: JenkinsCollector,
    transport: Option<Transport>,
}

impl JenkinsInput {
    pub fn new(config: PollConfig) -> Result<Self> {
        if Transport::for_config(config.insecure).accepts_invalid_certs() {
            tracing::warn!(
                url = %config.url,
                "TLS certificate verification disabled for Jenkins input"
            );
        }
        let client = HttpJenkinsClient::from_config(&config)
            .with_context(|| format!("Failed to build Jenkins client for {}", config.url))?;
        Ok(Self {
            transport: client.transport(),
            collector: JenkinsCollector::new(Arc::new(client), Arc::new(config)),
        })
    }

    pub fn transport(&self) -> Option<Transport> {
        self.transport
    }
}

#[async_trait::async_trait]
impl Input for JenkinsInput {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn gather(&self, sink: &dyn MeasurementSink) -> Result<()> {
        let emitted = self.collector.run_cycle(sink).await?;
        tracing::debug!(
            url = %self.collector.config().url,
            count = emitted.len(),
            "Jenkins cycle complete"
        );
        Ok(())
    }
}
