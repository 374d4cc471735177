//! The mackerel-agent plugin protocol.
//!
//! The agent runs the plugin once per collection cycle. With
//! `MACKEREL_AGENT_PLUGIN_META` set it expects graph definitions, otherwise
//! one tab-separated line per metric value.

use crate::core::{DeviceApi, GraphDescriptors, MetricSample};
use crate::formatting::{format_graph_meta, format_metric_line, metric_key, META_HEADER};
use crate::reporter::MetricsReporter;
use anyhow::{Context, Result};
use chrono::Utc;
use std::ffi::OsString;
use std::io::Write;
use tracing::{debug, warn};

/// Environment variable the agent sets when it wants graph definitions.
pub const META_ENV: &str = "MACKEREL_AGENT_PLUGIN_META";

/// What a plugin exposes to the agent.
pub trait Plugin {
    /// Namespace prepended to every graph and metric key.
    fn metric_key_prefix(&self) -> &str;

    /// Graph layout keyed by graph key, without the prefix.
    fn graph_definition(&mut self) -> Result<GraphDescriptors>;

    /// Current metric values keyed by metric name.
    fn fetch_metrics(&mut self) -> Result<MetricSample>;
}

impl<D: DeviceApi> Plugin for MetricsReporter<D> {
    fn metric_key_prefix(&self) -> &str {
        MetricsReporter::metric_key_prefix(self)
    }

    fn graph_definition(&mut self) -> Result<GraphDescriptors> {
        self.describe_graphs().context("failed to describe graphs")
    }

    fn fetch_metrics(&mut self) -> Result<MetricSample> {
        self.sample().context("failed to fetch metrics")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Print graph definitions.
    Meta,
    /// Print metric values.
    Metrics,
}

impl OutputMode {
    /// Picks the mode the agent asked for through `MACKEREL_AGENT_PLUGIN_META`.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var_os(META_ENV))
    }

    fn from_env_value(value: Option<OsString>) -> Self {
        match value {
            Some(v) if !v.is_empty() => OutputMode::Meta,
            _ => OutputMode::Metrics,
        }
    }
}

/// Runs a plugin for one collection cycle and writes its output.
pub struct PluginRunner<P> {
    plugin: P,
}

impl<P: Plugin> PluginRunner<P> {
    pub fn new(plugin: P) -> Self {
        Self { plugin }
    }

    pub fn into_inner(self) -> P {
        self.plugin
    }

    /// Writes either the graph definitions or the current values to `out`.
    ///
    /// Nothing is written when the plugin fails.
    pub fn run<W: Write>(&mut self, mode: OutputMode, out: &mut W) -> Result<()> {
        let output = match mode {
            OutputMode::Meta => self.render_definitions()?,
            OutputMode::Metrics => self.render_values(Utc::now().timestamp())?,
        };
        out.write_all(output.as_bytes())
            .and_then(|_| out.flush())
            .context("failed to write plugin output")
    }

    fn render_definitions(&mut self) -> Result<String> {
        let graphs = self.plugin.graph_definition()?;
        let json = format_graph_meta(self.plugin.metric_key_prefix(), &graphs)
            .context("failed to serialize graph definitions")?;
        Ok(format!("{}\n{}\n", META_HEADER, json))
    }

    fn render_values(&mut self, epoch: i64) -> Result<String> {
        let sample = self.plugin.fetch_metrics()?;
        let graphs = self.plugin.graph_definition()?;
        let prefix = self.plugin.metric_key_prefix();

        let mut output = String::new();
        for (graph_key, graph) in &graphs {
            for metric in &graph.metrics {
                let Some(value) = sample.get(&metric.name) else {
                    warn!(metric = %metric.name, graph = %graph_key, "No value for described metric");
                    continue;
                };
                // Rate metrics are reported raw; the delta needs the previous
                // cycle's value, which is not kept between runs.
                let key = metric_key(prefix, graph_key, &metric.name);
                output.push_str(&format_metric_line(&key, *value, epoch));
                output.push('\n');
            }
        }
        debug!(lines = output.lines().count(), "Rendered metric values");
        Ok(output)
    }
}
