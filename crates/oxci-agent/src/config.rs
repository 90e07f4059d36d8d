use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_collection_interval")]
    pub collection_interval_secs: u64,
    #[serde(default)]
    pub inputs: Vec<InputConfig>,
}

/// One `[[inputs]]` entry: the plugin type plus its own options.
#[derive(Debug, Deserialize)]
pub struct InputConfig {
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(flatten)]
    pub settings: toml::Table,
}

fn default_collection_interval() -> u64 {
    10
}

impl AgentConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        Self::parse(&content).with_context(|| format!("Failed to load config file {path}"))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.collection_interval_secs == 0 {
            anyhow::bail!("collection_interval_secs must be greater than zero");
        }
        Ok(config)
    }
}

impl InputConfig {
    /// Plugin options as JSON, the format input plugins are configured with.
    pub fn settings_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(&self.settings).context("Failed to convert input settings to JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
collection_interval_secs = 60

[[inputs]]
type = "jenkins"
host = "jenkins1"
url = "http://jenkins.service.consul:8080"
username = "admin"
password = "password"
insecure = true
"#;

    #[test]
    fn parses_inputs_with_flattened_settings() {
        let config = AgentConfig::parse(SAMPLE).unwrap();

        assert_eq!(config.collection_interval_secs, 60);
        assert_eq!(config.inputs.len(), 1);
        let input = &config.inputs[0];
        assert_eq!(input.input_type, "jenkins");
        assert!(!input.settings.contains_key("type"));

        let json = input.settings_json().unwrap();
        assert_eq!(json["url"], "http://jenkins.service.consul:8080");
        assert_eq!(json["insecure"], true);
    }

    #[test]
    fn applies_default_interval() {
        let config = AgentConfig::parse("").unwrap();
        assert_eq!(config.collection_interval_secs, 10);
        assert!(config.inputs.is_empty());
    }

    #[test]
    fn rejects_zero_interval() {
        assert!(AgentConfig::parse("collection_interval_secs = 0").is_err());
    }

    #[test]
    fn rejects_input_without_type() {
        let content = r#"
[[inputs]]
url = "http://ci:8080"
"#;
        assert!(AgentConfig::parse(content).is_err());
    }

    #[test]
    fn loads_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("agent.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = AgentConfig::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.inputs.len(), 1);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = AgentConfig::load("/nonexistent/oxci/agent.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/oxci/agent.toml"));
    }
}
