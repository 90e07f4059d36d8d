use crate::sink::MeasurementSink;
use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;

/// A configured metrics source, gathered once per collection interval.
#[async_trait::async_trait]
pub trait Input: Send + Sync {
    /// Returns the plugin type this input was created from (e.g. `"jenkins"`).
    fn name(&self) -> &str;

    /// Runs one collection cycle, emitting finished measurements into `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error when the cycle was aborted. Measurements emitted
    /// before the failure stay in the sink.
    async fn gather(&self, sink: &dyn MeasurementSink) -> Result<()>;
}

/// Factory for creating [`Input`] instances from JSON configuration.
///
/// Each plugin is registered in the [`InputRegistry`] by its `name()` once at
/// process startup.
pub trait InputPlugin: Send + Sync {
    /// Returns the plugin type name (e.g., `"jenkins"`).
    fn name(&self) -> &str;

    /// One-line description shown next to the sample configuration.
    fn description(&self) -> &str;

    /// Annotated TOML snippet listing every recognised option.
    fn sample_config(&self) -> &str;

    /// Validates a JSON config blob against this plugin's expected schema.
    fn validate_config(&self, config: &Value) -> Result<()>;

    /// Creates a configured input from a validated JSON config.
    fn create_input(&self, config: &Value) -> Result<Box<dyn Input>>;

    /// Returns a copy of `config` with secrets redacted. Used for logging.
    fn redact_config(&self, config: &Value) -> Value {
        config.clone()
    }
}

/// Registry of available [`InputPlugin`]s, used to instantiate inputs from
/// configuration.
///
/// # Examples
///
/// ```
/// use oxci_common::plugin::InputRegistry;
///
/// let registry = InputRegistry::new();
/// assert!(!registry.has_plugin("jenkins"));
/// assert!(registry.plugin_names().is_empty());
/// ```
#[derive(Default)]
pub struct InputRegistry {
    plugins: HashMap<String, Box<dyn InputPlugin>>,
}

impl InputRegistry {
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    pub fn register(&mut self, plugin: Box<dyn InputPlugin>) {
        let name = plugin.name().to_string();
        if self.plugins.insert(name.clone(), plugin).is_some() {
            tracing::warn!(plugin = %name, "Input plugin registered twice, keeping the latest");
        }
    }

    pub fn create_input(&self, type_name: &str, config: &Value) -> Result<Box<dyn Input>> {
        let plugin = self
            .plugins
            .get(type_name)
            .ok_or_else(|| anyhow::anyhow!("Unknown input plugin type: {type_name}"))?;
        plugin.validate_config(config)?;
        plugin.create_input(config)
    }

    pub fn get_plugin(&self, type_name: &str) -> Option<&dyn InputPlugin> {
        self.plugins.get(type_name).map(|p| p.as_ref())
    }

    pub fn has_plugin(&self, type_name: &str) -> bool {
        self.plugins.contains_key(type_name)
    }

    /// Registered plugin names, sorted.
    pub fn plugin_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use crate::types::{Measurement, MeasurementKind};

    struct StaticInput;

    #[async_trait::async_trait]
    impl Input for StaticInput {
        fn name(&self) -> &str {
            "static"
        }

        async fn gather(&self, sink: &dyn MeasurementSink) -> Result<()> {
            sink.emit(Measurement::new(MeasurementKind::Queue, HashMap::new()));
            Ok(())
        }
    }

    struct StaticPlugin;

    impl InputPlugin for StaticPlugin {
        fn name(&self) -> &str {
            "static"
        }

        fn description(&self) -> &str {
            "Emits an empty queue measurement"
        }

        fn sample_config(&self) -> &str {
            ""
        }

        fn validate_config(&self, config: &Value) -> Result<()> {
            if config.get("reject").is_some() {
                anyhow::bail!("rejected");
            }
            Ok(())
        }

        fn create_input(&self, _config: &Value) -> Result<Box<dyn Input>> {
            Ok(Box::new(StaticInput))
        }
    }

    #[tokio::test]
    async fn registry_creates_registered_input() {
        let mut registry = InputRegistry::new();
        registry.register(Box::new(StaticPlugin));
        assert!(registry.has_plugin("static"));
        assert_eq!(registry.plugin_names(), vec!["static"]);

        let input = registry
            .create_input("static", &serde_json::json!({}))
            .unwrap();
        let sink = MemorySink::new();
        input.gather(&sink).await.unwrap();
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn registry_rejects_unknown_type() {
        let registry = InputRegistry::new();
        let err = registry
            .create_input("nope", &serde_json::json!({}))
            .err()
            .unwrap();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn registry_runs_validation_before_creating() {
        let mut registry = InputRegistry::new();
        registry.register(Box::new(StaticPlugin));
        assert!(registry
            .create_input("static", &serde_json::json!({"reject": true}))
            .is_err());
    }

    #[test]
    fn default_redaction_returns_config_unchanged() {
        let config = serde_json::json!({"password": "secret"});
        assert_eq!(StaticPlugin.redact_config(&config), config);
    }
}
