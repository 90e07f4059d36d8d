use oxci_common::sink::MeasurementSink;
use oxci_common::types::Measurement;
use std::io::Write;
use std::sync::Mutex;

/// Writes each measurement as one JSON object per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl JsonLinesSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> MeasurementSink for JsonLinesSink<W> {
    fn emit(&self, measurement: Measurement) {
        let line = match serde_json::to_string(&measurement) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(name = %measurement.name, error = %e, "Failed to encode measurement");
                return;
            }
        };

        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(writer, "{line}").and_then(|()| writer.flush()) {
            tracing::warn!(name = %measurement.name, error = %e, "Failed to write measurement");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxci_common::types::MeasurementKind;
    use std::collections::HashMap;

    #[test]
    fn writes_one_json_object_per_line() {
        let sink = JsonLinesSink::new(Vec::new());

        let mut tags = HashMap::new();
        tags.insert("url".to_string(), "http://ci:8080".to_string());
        let mut queue = Measurement::new(MeasurementKind::Queue, tags.clone());
        queue.set_field("queue_size", 2);
        sink.emit(queue);
        let mut workers = Measurement::new(MeasurementKind::Workers, tags);
        workers.set_field("slave_count", 3);
        sink.emit(workers);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["name"], "queue");
        assert_eq!(first["fields"]["queue_size"], 2);
        assert_eq!(first["tags"]["url"], "http://ci:8080");

        let second: Measurement = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.name, MeasurementKind::Workers);
        assert!(second.timestamp <= chrono::Utc::now());
    }
}
