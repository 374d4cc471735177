// src/formatting.rs

use crate::core::{GraphDescriptor, GraphDescriptors};
use serde::Serialize;
use std::collections::BTreeMap;

/// First line of the graph-definition output, which the agent checks for.
pub const META_HEADER: &str = "# mackerel-agent-plugin";

/// Joins the prefix, graph key and metric name into the reported key.
pub fn metric_key(prefix: &str, graph_key: &str, metric_name: &str) -> String {
    format!("{}.{}.{}", prefix, graph_key, metric_name)
}

/// Formats one value line: key, value and unix time, tab-separated.
pub fn format_metric_line(key: &str, value: f64, epoch: i64) -> String {
    format!("{}\t{:.6}\t{}", key, value, epoch)
}

#[derive(Serialize)]
struct GraphMeta<'a> {
    graphs: BTreeMap<String, &'a GraphDescriptor>,
}

/// Renders graph definitions as the agent's meta JSON, keying every graph by
/// `<prefix>.<graph key>`.
pub fn format_graph_meta(prefix: &str, graphs: &GraphDescriptors) -> serde_json::Result<String> {
    let meta = GraphMeta {
        graphs: graphs
            .iter()
            .map(|(key, graph)| (format!("{}.{}", prefix, key), graph))
            .collect(),
    };
    serde_json::to_string(&meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MetricDescriptor, Unit};
    use serde_json::{json, Value};

    #[test]
    fn test_metric_key() {
        assert_eq!(metric_key("nasne", "disk_0", "used_0"), "nasne.disk_0.used_0");
    }

    #[test]
    fn test_format_metric_line() {
        assert_eq!(
            format_metric_line("nasne.recorded_count.recorded_count", 42.0, 1_700_000_000),
            "nasne.recorded_count.recorded_count\t42.000000\t1700000000"
        );
    }

    #[test]
    fn test_format_graph_meta() {
        let mut graphs = GraphDescriptors::new();
        graphs.insert(
            "failed_recording_count".to_string(),
            GraphDescriptor {
                label: "Nasne Failed Recording Count".to_string(),
                unit: Unit::Integer,
                metrics: vec![MetricDescriptor::new("failed_recording_count", "Failed").with_diff()],
            },
        );

        let rendered: Value = serde_json::from_str(&format_graph_meta("nasne", &graphs).unwrap()).unwrap();

        assert_eq!(
            rendered,
            json!({
                "graphs": {
                    "nasne.failed_recording_count": {
                        "label": "Nasne Failed Recording Count",
                        "unit": "integer",
                        "metrics": [{ "name": "failed_recording_count", "label": "Failed" }]
                    }
                }
            })
        );
    }
}
