use crate::types::{Measurement, MeasurementKind};
use std::sync::{Mutex, MutexGuard};

/// Destination for finished measurements.
///
/// Emission is fire-and-forget: the collector hands over ownership and does
/// not wait for the measurement to be persisted.
pub trait MeasurementSink: Send + Sync {
    fn emit(&self, measurement: Measurement);
}

/// Sink that keeps every emitted measurement in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    measurements: Mutex<Vec<Measurement>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Measurement>> {
        self.measurements
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of everything emitted so far.
    pub fn measurements(&self) -> Vec<Measurement> {
        self.lock().clone()
    }

    pub fn find(&self, kind: MeasurementKind) -> Option<Measurement> {
        self.lock().iter().find(|m| m.name == kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl MeasurementSink for MemorySink {
    fn emit(&self, measurement: Measurement) {
        tracing::trace!(name = %measurement.name, "Measurement buffered in memory");
        self.lock().push(measurement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn memory_sink_keeps_emission_order() {
        let sink = MemorySink::new();
        sink.emit(Measurement::new(MeasurementKind::Queue, HashMap::new()));
        sink.emit(Measurement::new(MeasurementKind::Workers, HashMap::new()));

        let names: Vec<_> = sink.measurements().iter().map(|m| m.name).collect();
        assert_eq!(names, vec![MeasurementKind::Queue, MeasurementKind::Workers]);
        assert!(sink.find(MeasurementKind::WorkerLabels).is_none());
    }
}
