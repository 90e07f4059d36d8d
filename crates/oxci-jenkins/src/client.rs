use crate::config::DEFAULT_RESPONSE_TIMEOUT_SECS;
use crate::error::{ClientError, Result};
use crate::transport::Transport;
use crate::{JenkinsClient, PollConfig, QueueItem, WorkerRecord};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Username and password (or API token) sent as HTTP basic auth.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct QueueResponse {
    #[serde(default)]
    items: Vec<QueueItemJson>,
}

#[derive(Debug, Deserialize)]
struct QueueItemJson {
    #[serde(default)]
    buildable: bool,
    #[serde(default)]
    task: TaskJson,
}

#[derive(Debug, Default, Deserialize)]
struct TaskJson {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ComputerSetResponse {
    #[serde(default)]
    computer: Vec<ComputerJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComputerJson {
    display_name: String,
    #[serde(default)]
    idle: bool,
    #[serde(default)]
    jnlp_agent: bool,
}

/// Root element varies by job type (`project`, `flow-definition`, ...).
#[derive(Debug, Deserialize)]
struct JobConfigXml {
    #[serde(rename = "assignedNode", default)]
    assigned_node: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ComputerConfigXml {
    #[serde(default)]
    label: Option<String>,
}

/// [`JenkinsClient`] over the Jenkins remote access API.
pub struct HttpJenkinsClient {
    base_url: Url,
    credentials: Credentials,
    client: Client,
    transport: Option<Transport>,
}

impl HttpJenkinsClient {
    /// Client with the default transport and the default request timeout.
    pub fn new(endpoint: &str, credentials: Credentials) -> Result<Self> {
        Self::build(
            endpoint,
            credentials,
            Transport::Default,
            Duration::from_secs(DEFAULT_RESPONSE_TIMEOUT_SECS),
        )
    }

    /// Client whose transport follows `config.insecure`.
    pub fn from_config(config: &PollConfig) -> Result<Self> {
        let credentials = Credentials {
            username: config.username.clone(),
            password: config.password.clone(),
        };
        Self::build(
            &config.url,
            credentials,
            Transport::for_config(config.insecure),
            Duration::from_secs(config.response_timeout_secs),
        )
    }

    fn build(
        endpoint: &str,
        credentials: Credentials,
        transport: Transport,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(endpoint.trim())
            .map_err(|e| ClientError::InvalidUrl(format!("{endpoint}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{endpoint}: not a base URL"
            )));
        }

        Ok(Self {
            base_url,
            credentials,
            client: transport.build_client(timeout)?,
            transport: Some(transport),
        })
    }

    /// Replace the network transport. Intended to be called before first use.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self.transport = None;
        self
    }

    /// Transport the client was built with, `None` once a caller-supplied
    /// client has been installed.
    pub fn transport(&self) -> Option<Transport> {
        self.transport
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        tracing::trace!(url = %url, "Jenkins API request");
        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::HttpError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let body = self.get_text(self.endpoint(segments)?).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_xml<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let body = self.get_text(self.endpoint(segments)?).await?;
        Ok(quick_xml::de::from_str(&body)?)
    }
}

#[async_trait::async_trait]
impl JenkinsClient for HttpJenkinsClient {
    async fn fetch_queue(&self) -> Result<Vec<QueueItem>> {
        let queue: QueueResponse = self.get_json(&["queue", "api", "json"]).await?;
        Ok(queue
            .items
            .into_iter()
            .map(|item| QueueItem {
                buildable: item.buildable,
                task_name: item.task.name,
            })
            .collect())
    }

    async fn fetch_job_label(&self, job_name: &str) -> Result<String> {
        let config: JobConfigXml = self.get_xml(&["job", job_name, "config.xml"]).await?;
        Ok(config
            .assigned_node
            .map(|node| node.trim().to_string())
            .unwrap_or_default())
    }

    async fn fetch_workers(&self) -> Result<Vec<WorkerRecord>> {
        let computers: ComputerSetResponse = self.get_json(&["computer", "api", "json"]).await?;
        Ok(computers
            .computer
            .into_iter()
            .map(|c| WorkerRecord {
                is_managed_agent: c.jnlp_agent,
                is_idle: c.idle,
                display_name: c.display_name,
            })
            .collect())
    }

    async fn fetch_worker_config(&self, display_name: &str) -> Result<String> {
        let config: ComputerConfigXml = self
            .get_xml(&["computer", display_name, "config.xml"])
            .await?;
        Ok(config.label.unwrap_or_default())
    }
}
