/// mackerel-plugin-nasne - reports nasne recorder metrics to mackerel-agent
///
/// This library polls a nasne over its local HTTP API and shapes recording
/// counts and disk capacity into the mackerel-agent plugin format.
pub mod cli;
pub mod config;
pub mod core;
pub mod device;
pub mod formatting;
pub mod plugin;
pub mod reporter;

// Re-export core types for convenience
pub use crate::core::*;
pub use plugin::{OutputMode, Plugin, PluginRunner};
pub use reporter::MetricsReporter;
