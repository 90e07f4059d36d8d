use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of a measurement handed to the metrics pipeline.
///
/// # Examples
///
/// ```
/// use oxci_common::types::MeasurementKind;
///
/// assert_eq!(MeasurementKind::WorkerLabels.as_str(), "worker_labels");
/// assert_eq!(MeasurementKind::Queue.to_string(), "queue");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    Queue,
    Workers,
    WorkerLabels,
}

impl MeasurementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MeasurementKind::Queue => "queue",
            MeasurementKind::Workers => "workers",
            MeasurementKind::WorkerLabels => "worker_labels",
        }
    }
}

impl std::fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named bundle of integer fields and string tags.
///
/// Field keys are unique: [`Measurement::increment`] accumulates into an
/// existing key instead of adding a second one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub name: MeasurementKind,
    pub fields: HashMap<String, u64>,
    pub tags: HashMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl Measurement {
    pub fn new(name: MeasurementKind, tags: HashMap<String, String>) -> Self {
        Self {
            name,
            fields: HashMap::new(),
            tags,
            timestamp: Utc::now(),
        }
    }

    /// Add one to `key`, creating it at 1 when absent.
    pub fn increment(&mut self, key: impl Into<String>) {
        *self.fields.entry(key.into()).or_insert(0) += 1;
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: u64) {
        self.fields.insert(key.into(), value);
    }

    pub fn field(&self, key: &str) -> Option<u64> {
        self.fields.get(key).copied()
    }
}

/// Format a field map into a stable, human-readable string.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use oxci_common::types::format_fields;
///
/// let mut fields = HashMap::new();
/// fields.insert("slaves_busy".to_string(), 2);
/// fields.insert("slave_count".to_string(), 3);
/// assert_eq!(format_fields(&fields), "slave_count=3, slaves_busy=2");
/// ```
pub fn format_fields(fields: &HashMap<String, u64>) -> String {
    if fields.is_empty() {
        return String::new();
    }
    let mut pairs: Vec<String> = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    pairs.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_accumulates_into_same_key() {
        let mut m = Measurement::new(MeasurementKind::WorkerLabels, HashMap::new());
        m.increment("linux");
        m.increment("linux");
        m.increment("docker");

        assert_eq!(m.fields.len(), 2);
        assert_eq!(m.field("linux"), Some(2));
        assert_eq!(m.field("docker"), Some(1));
    }

    #[test]
    fn set_field_overwrites_existing_value() {
        let mut m = Measurement::new(MeasurementKind::Queue, HashMap::new());
        m.set_field("queue_size", 4);
        m.set_field("queue_size", 0);
        assert_eq!(m.field("queue_size"), Some(0));
        assert_eq!(m.fields.len(), 1);
    }

    #[test]
    fn measurement_serializes_name_as_snake_case() {
        let mut tags = HashMap::new();
        tags.insert("url".to_string(), "http://ci:8080".to_string());
        let mut m = Measurement::new(MeasurementKind::WorkerLabels, tags);
        m.set_field("linux", 1);

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["name"], "worker_labels");
        assert_eq!(json["fields"]["linux"], 1);
        assert_eq!(json["tags"]["url"], "http://ci:8080");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn format_fields_is_empty_for_no_fields() {
        assert_eq!(format_fields(&HashMap::new()), "");
    }
}
