mod config;
mod sink;

use anyhow::{Context, Result};
use config::AgentConfig;
use oxci_common::plugin::{Input, InputRegistry};
use oxci_common::sink::MeasurementSink;
use oxci_jenkins::plugin::JenkinsPlugin;
use sink::JsonLinesSink;
use std::time::Instant;
use tokio::signal;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

fn build_registry() -> InputRegistry {
    let mut registry = InputRegistry::new();
    registry.register(Box::new(JenkinsPlugin));
    registry
}

fn build_inputs(registry: &InputRegistry, config: &AgentConfig) -> Result<Vec<Box<dyn Input>>> {
    let mut inputs = Vec::with_capacity(config.inputs.len());
    for (index, entry) in config.inputs.iter().enumerate() {
        let settings = entry.settings_json()?;
        if let Some(plugin) = registry.get_plugin(&entry.input_type) {
            tracing::info!(
                index,
                input = %entry.input_type,
                config = %plugin.redact_config(&settings),
                "Configuring input"
            );
        }
        let input = registry
            .create_input(&entry.input_type, &settings)
            .with_context(|| format!("Failed to create input #{index} ({})", entry.input_type))?;
        inputs.push(input);
    }
    Ok(inputs)
}

fn print_sample_config(registry: &InputRegistry) {
    println!("collection_interval_secs = 10");
    for name in registry.plugin_names() {
        if let Some(plugin) = registry.get_plugin(name) {
            println!();
            println!("# {}", plugin.description());
            print!("{}", plugin.sample_config());
        }
    }
}

/// Gather every input once, one after another. A failed input does not stop
/// the others.
async fn collect_once(inputs: &[Box<dyn Input>], sink: &dyn MeasurementSink) -> usize {
    let mut failed = 0;
    for input in inputs {
        let started = Instant::now();
        match input.gather(sink).await {
            Ok(()) => tracing::debug!(
                input = input.name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Input gathered"
            ),
            Err(e) => {
                failed += 1;
                tracing::error!(input = input.name(), error = %e, "Collection cycle failed");
            }
        }
    }
    failed
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("oxci=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let registry = build_registry();

    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("sample-config") {
        print_sample_config(&registry);
        return Ok(());
    }
    let config_path = arg.unwrap_or_else(|| "config/agent.toml".to_string());

    let config = AgentConfig::load(&config_path)?;
    let inputs = build_inputs(&registry, &config)?;
    if inputs.is_empty() {
        tracing::warn!(path = %config_path, "No inputs configured");
    }

    let sink = JsonLinesSink::stdout();
    let mut tick = interval(Duration::from_secs(config.collection_interval_secs));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        interval_secs = config.collection_interval_secs,
        inputs = inputs.len(),
        "Starting collection loop"
    );

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let failed = collect_once(&inputs, &sink).await;
                if failed > 0 {
                    tracing::warn!(failed, total = inputs.len(), "Some inputs failed this cycle");
                }
            }
            _ = signal::ctrl_c() => {
                tracing::info!("Shutting down gracefully");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxci_common::sink::MemorySink;
    use oxci_common::types::{Measurement, MeasurementKind};
    use std::collections::HashMap;

    struct FixedInput {
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Input for FixedInput {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn gather(&self, sink: &dyn MeasurementSink) -> Result<()> {
            if self.fail {
                anyhow::bail!("boom");
            }
            sink.emit(Measurement::new(MeasurementKind::Queue, HashMap::new()));
            Ok(())
        }
    }

    #[test]
    fn registry_knows_jenkins() {
        let registry = build_registry();
        assert_eq!(registry.plugin_names(), vec!["jenkins"]);
    }

    #[test]
    fn builds_jenkins_input_from_config() {
        let config = AgentConfig::parse(
            r#"
[[inputs]]
type = "jenkins"
url = "https://jenkins.internal"
username = "admin"
password = "token"
insecure = true
"#,
        )
        .unwrap();

        let inputs = build_inputs(&build_registry(), &config).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].name(), "jenkins");
    }

    #[test]
    fn unknown_input_type_fails_startup() {
        let config = AgentConfig::parse(
            r#"
[[inputs]]
type = "gitlab"
url = "https://gitlab.internal"
"#,
        )
        .unwrap();

        let err = build_inputs(&build_registry(), &config).err().unwrap();
        assert!(format!("{err:#}").contains("gitlab"));
    }

    #[tokio::test]
    async fn failed_input_does_not_stop_others() {
        let inputs: Vec<Box<dyn Input>> = vec![
            Box::new(FixedInput { fail: true }),
            Box::new(FixedInput { fail: false }),
        ];
        let sink = MemorySink::new();

        let failed = collect_once(&inputs, &sink).await;

        assert_eq!(failed, 1);
        assert_eq!(sink.len(), 1);
    }
}
