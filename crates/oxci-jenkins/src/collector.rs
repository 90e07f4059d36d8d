use crate::error::CollectError;
use crate::{JenkinsClient, PollConfig};
use oxci_common::sink::MeasurementSink;
use oxci_common::types::{format_fields, Measurement, MeasurementKind};
use std::collections::HashSet;
use std::sync::Arc;

/// Field prefix for per-label queue counts.
const QUEUE_LABEL_PREFIX: &str = "label_";

/// Runs collection cycles against one Jenkins server.
///
/// Holds no state between cycles beyond the immutable config; every counter
/// lives only for the duration of the call that builds its measurement.
pub struct JenkinsCollector {
    client: Arc<dyn JenkinsClient>,
    config: Arc<PollConfig>,
}

impl JenkinsCollector {
    pub fn new(client: Arc<dyn JenkinsClient>, config: Arc<PollConfig>) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Build the `queue` measurement.
    ///
    /// With extended labels enabled, each buildable item costs one more
    /// request to resolve its job's label. A failure there discards every
    /// count gathered so far.
    pub async fn poll_queue(&self) -> Result<Measurement, CollectError> {
        let queue = self
            .client
            .fetch_queue()
            .await
            .map_err(CollectError::upstream("queue"))?;

        let mut measurement = Measurement::new(MeasurementKind::Queue, self.config.tags());
        let mut queue_size = 0u64;

        for item in queue.iter().filter(|item| item.buildable) {
            queue_size += 1;

            if !self.config.extended_labels {
                continue;
            }
            let label = self
                .client
                .fetch_job_label(&item.task_name)
                .await
                .map_err(|source| CollectError::UpstreamFetch {
                    what: format!("job label of {}", item.task_name),
                    source,
                })?;
            let label = label.trim();
            if !label.is_empty() {
                measurement.increment(format!("{QUEUE_LABEL_PREFIX}{label}"));
            }
        }

        measurement.set_field("queue_size", queue_size);
        Ok(measurement)
    }

    /// Build the `workers` measurement. Only managed agents are counted.
    pub async fn poll_workers(&self) -> Result<Measurement, CollectError> {
        let workers = self
            .client
            .fetch_workers()
            .await
            .map_err(CollectError::upstream("workers"))?;

        let mut slave_count = 0u64;
        let mut slaves_busy = 0u64;
        for worker in workers.iter().filter(|w| w.is_managed_agent) {
            slave_count += 1;
            if !worker.is_idle {
                slaves_busy += 1;
            }
        }

        let mut measurement = Measurement::new(MeasurementKind::Workers, self.config.tags());
        measurement.set_field("slave_count", slave_count);
        measurement.set_field("slaves_busy", slaves_busy);
        Ok(measurement)
    }

    /// Build the `worker_labels` measurement: one field per label token,
    /// valued by the number of managed agents carrying it. A token repeated
    /// in one agent's label string counts once for that agent.
    pub async fn poll_worker_labels(&self) -> Result<Measurement, CollectError> {
        let workers = self
            .client
            .fetch_workers()
            .await
            .map_err(CollectError::upstream("workers"))?;

        let mut measurement = Measurement::new(MeasurementKind::WorkerLabels, self.config.tags());

        for worker in workers.iter().filter(|w| w.is_managed_agent) {
            let labels = self
                .client
                .fetch_worker_config(&worker.display_name)
                .await
                .map_err(|source| CollectError::UpstreamFetch {
                    what: format!("config of worker {}", worker.display_name),
                    source,
                })?;
            let tokens: HashSet<&str> = labels.split_whitespace().collect();
            for token in tokens {
                measurement.increment(token);
            }
        }

        Ok(measurement)
    }

    /// Run one full cycle, emitting each measurement as soon as it is built.
    ///
    /// Returns the names emitted, in order. On error the remaining steps are
    /// skipped; measurements already handed to `sink` stay there.
    pub async fn run_cycle(
        &self,
        sink: &dyn MeasurementSink,
    ) -> Result<Vec<MeasurementKind>, CollectError> {
        let mut emitted = Vec::with_capacity(3);

        let queue = self.poll_queue().await?;
        emitted.push(self.emit(sink, queue));

        let workers = self.poll_workers().await?;
        emitted.push(self.emit(sink, workers));

        if self.config.extended_labels {
            let labels = self.poll_worker_labels().await?;
            emitted.push(self.emit(sink, labels));
        }

        Ok(emitted)
    }

    fn emit(&self, sink: &dyn MeasurementSink, measurement: Measurement) -> MeasurementKind {
        let name = measurement.name;
        tracing::debug!(
            url = %self.config.url,
            measurement = %name,
            fields = %format_fields(&measurement.fields),
            "Emitting measurement"
        );
        sink.emit(measurement);
        name
    }
}
