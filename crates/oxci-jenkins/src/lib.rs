//! Jenkins input for the oxci agent.
//!
//! [`collector::JenkinsCollector`] turns the build queue and the agent pool of
//! a Jenkins server into `queue`, `workers` and `worker_labels` measurements.
//! Server access goes through the [`JenkinsClient`] trait;
//! [`client::HttpJenkinsClient`] is the implementation used in production.

pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod plugin;
pub mod transport;

pub use config::PollConfig;

/// One entry of the Jenkins build queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    /// Whether the item is waiting only for a free executor.
    pub buildable: bool,
    /// Name of the job the item belongs to.
    pub task_name: String,
}

/// One node of the Jenkins computer set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRecord {
    /// Remotely connected agent, as opposed to the built-in executor.
    pub is_managed_agent: bool,
    pub is_idle: bool,
    pub display_name: String,
}

/// Read-only access to the Jenkins management API.
#[async_trait::async_trait]
pub trait JenkinsClient: Send + Sync {
    /// Current build queue.
    async fn fetch_queue(&self) -> error::Result<Vec<QueueItem>>;

    /// Label expression the job is restricted to, empty when unrestricted.
    async fn fetch_job_label(&self, job_name: &str) -> error::Result<String>;

    /// Every node known to the server, including the built-in one.
    async fn fetch_workers(&self) -> error::Result<Vec<WorkerRecord>>;

    /// Space-separated label string from the node's configuration.
    async fn fetch_worker_config(&self, display_name: &str) -> error::Result<String>;
}
