//! Shared building blocks for oxci inputs and the agent: the measurement
//! model, the sink capability and the input plugin registry.

pub mod plugin;
pub mod sink;
pub mod types;
