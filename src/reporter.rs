//! The metrics reporter: decides which device calls to make and how their
//! results are named, labeled and grouped.
//!
//! Graph descriptors and samples are both built from the naming helpers in
//! this module, so every sampled key has exactly one descriptor entry.

use crate::core::{
    DeviceApi, DiskRecord, GraphDescriptor, GraphDescriptors, MetricDescriptor, MetricSample, Unit,
};
use crate::device::DeviceError;
use tracing::{debug, info, instrument};

pub const RECORDED_COUNT_KEY: &str = "recorded_count";
pub const FAILED_RECORDING_COUNT_KEY: &str = "failed_recording_count";

/// The recorded-title list is only queried for its match count.
const RECORDED_COUNT_PAGE_SIZE: u32 = 1;

/// Per-disk capacity figures, in the order they are graphed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskMetric {
    Used,
    Free,
    Total,
}

impl DiskMetric {
    pub const ALL: [DiskMetric; 3] = [DiskMetric::Used, DiskMetric::Free, DiskMetric::Total];

    fn as_str(self) -> &'static str {
        match self {
            DiskMetric::Used => "used",
            DiskMetric::Free => "free",
            DiskMetric::Total => "total",
        }
    }

    fn label(self) -> &'static str {
        match self {
            DiskMetric::Used => "Used",
            DiskMetric::Free => "Free",
            DiskMetric::Total => "Total",
        }
    }

    fn value(self, disk: &DiskRecord) -> u64 {
        match self {
            DiskMetric::Used => disk.used,
            DiskMetric::Free => disk.free,
            DiskMetric::Total => disk.total,
        }
    }

    /// Metric name for this figure on the given disk, e.g. `used_1`.
    pub fn metric_name(self, disk_id: u32) -> String {
        format!("{}_{}", self.as_str(), disk_id)
    }
}

/// Graph key for a disk's capacity graph, e.g. `disk_1`.
pub fn disk_graph_key(disk_id: u32) -> String {
    format!("disk_{}", disk_id)
}

/// Upper-cases the first character, turning `nasne` into `Nasne`.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Collects recording and disk metrics from one device.
///
/// The disk list is fetched at most once per reporter and reused by every
/// later call.
#[derive(Debug)]
pub struct MetricsReporter<D> {
    device: D,
    prefix: String,
    disks: Option<Vec<DiskRecord>>,
}

impl<D: DeviceApi> MetricsReporter<D> {
    pub fn new(device: D, prefix: impl Into<String>) -> Self {
        Self {
            device,
            prefix: prefix.into(),
            disks: None,
        }
    }

    pub fn metric_key_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Builds the graph layout: one capacity graph per disk plus the two
    /// recording-count graphs.
    ///
    /// Fetches the disk list first if this reporter has not done so yet.
    pub fn describe_graphs(&mut self) -> Result<GraphDescriptors, DeviceError> {
        let label_prefix = capitalize(&self.prefix);
        let disks = self.fetch_disk_records()?;

        let mut graphs = GraphDescriptors::new();
        graphs.insert(
            RECORDED_COUNT_KEY.to_string(),
            GraphDescriptor {
                label: format!("{} Recorded Count", label_prefix),
                unit: Unit::Integer,
                metrics: vec![MetricDescriptor::new(RECORDED_COUNT_KEY, "Recorded")],
            },
        );
        graphs.insert(
            FAILED_RECORDING_COUNT_KEY.to_string(),
            GraphDescriptor {
                label: format!("{} Failed Recording Count", label_prefix),
                unit: Unit::Integer,
                metrics: vec![MetricDescriptor::new(FAILED_RECORDING_COUNT_KEY, "Failed").with_diff()],
            },
        );

        for disk in disks {
            graphs.insert(
                disk_graph_key(disk.id),
                GraphDescriptor {
                    label: format!("{} Disk {}", label_prefix, disk.id),
                    unit: Unit::Bytes,
                    metrics: DiskMetric::ALL
                        .iter()
                        .map(|m| MetricDescriptor::new(m.metric_name(disk.id), m.label()))
                        .collect(),
                },
            );
        }

        Ok(graphs)
    }

    /// Takes one sample of every metric.
    ///
    /// Any failed device call fails the whole sample.
    pub fn sample(&mut self) -> Result<MetricSample, DeviceError> {
        let mut sample = MetricSample::new();

        for disk in self.fetch_disk_records()? {
            for metric in DiskMetric::ALL {
                sample.insert(metric.metric_name(disk.id), metric.value(disk) as f64);
            }
        }

        sample.insert(RECORDED_COUNT_KEY.to_string(), self.get_recorded_count()?);
        sample.insert(
            FAILED_RECORDING_COUNT_KEY.to_string(),
            self.get_failed_recording_count()?,
        );

        info!(metrics = sample.len(), "Collected device metrics");
        Ok(sample)
    }

    /// Returns the cached disk records, fetching them on first use.
    ///
    /// The list is only cached when every disk was fetched successfully.
    #[instrument(skip(self))]
    pub fn fetch_disk_records(&mut self) -> Result<&[DiskRecord], DeviceError> {
        if self.disks.is_none() {
            let ids = self.device.list_disk_ids()?;
            debug!(count = ids.len(), "Listed disks");

            let disks = ids
                .into_iter()
                .map(|id| self.device.disk_info(id))
                .collect::<Result<Vec<_>, _>>()?;
            self.disks = Some(disks);
        }

        Ok(self.disks.as_deref().unwrap_or_default())
    }

    /// Number of recorded titles on the device.
    #[instrument(skip(self))]
    pub fn get_recorded_count(&self) -> Result<f64, DeviceError> {
        let list = self.device.recorded_titles(RECORDED_COUNT_PAGE_SIZE)?;
        debug!(
            total_matches = list.total_matches,
            returned = list.items.len(),
            "Fetched recorded title list"
        );
        Ok(list.total_matches as f64)
    }

    /// Number of recordings the device reports as failed.
    #[instrument(skip(self))]
    pub fn get_failed_recording_count(&self) -> Result<f64, DeviceError> {
        let list = self.device.failed_recordings()?;
        debug!(number = list.number, "Fetched failed recording list");
        Ok(list.number as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::test_utils::{FakeCall, FakeDevice};
    use std::collections::BTreeSet;

    fn two_disk_device() -> FakeDevice {
        FakeDevice::new()
            .with_disk(0, 100, 400, 500)
            .with_disk(1, 10, 20, 30)
            .with_recorded(42, 1)
            .with_failed_recordings(3)
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("nasne"), "Nasne");
        assert_eq!(capitalize("Living"), "Living");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_describe_graphs_has_one_graph_per_disk_plus_two() {
        for disk_count in 0..4u32 {
            let mut device = FakeDevice::new();
            for id in 0..disk_count {
                device = device.with_disk(id, 1, 2, 3);
            }
            let mut reporter = MetricsReporter::new(device, "nasne");

            let graphs = reporter.describe_graphs().unwrap();

            assert_eq!(graphs.len(), disk_count as usize + 2);
            assert!(graphs.contains_key(RECORDED_COUNT_KEY));
            assert!(graphs.contains_key(FAILED_RECORDING_COUNT_KEY));
            for id in 0..disk_count {
                assert!(graphs.contains_key(&disk_graph_key(id)));
            }
        }
    }

    #[test]
    fn test_describe_graphs_labels_use_capitalized_prefix() {
        let mut reporter = MetricsReporter::new(two_disk_device(), "living");
        let graphs = reporter.describe_graphs().unwrap();

        assert_eq!(graphs[RECORDED_COUNT_KEY].label, "Living Recorded Count");
        assert_eq!(graphs[RECORDED_COUNT_KEY].unit, Unit::Integer);
        assert_eq!(graphs["disk_1"].label, "Living Disk 1");
        assert_eq!(graphs["disk_1"].unit, Unit::Bytes);
        assert!(graphs[FAILED_RECORDING_COUNT_KEY].metrics[0].diff);
        assert!(!graphs[RECORDED_COUNT_KEY].metrics[0].diff);
    }

    #[test]
    fn test_sample_reports_disk_capacity() {
        let device = FakeDevice::new().with_disk(1, 10, 20, 30);
        let mut reporter = MetricsReporter::new(device, "nasne");

        let sample = reporter.sample().unwrap();

        assert_eq!(sample["used_1"], 10.0);
        assert_eq!(sample["free_1"], 20.0);
        assert_eq!(sample["total_1"], 30.0);
    }

    #[test]
    fn test_sample_keys_match_graph_metrics_exactly() {
        let mut reporter = MetricsReporter::new(two_disk_device(), "nasne");

        let sample = reporter.sample().unwrap();
        let graphs = reporter.describe_graphs().unwrap();

        let sampled: BTreeSet<&str> = sample.keys().map(String::as_str).collect();
        let described: Vec<&str> = graphs
            .values()
            .flat_map(|g| g.metrics.iter().map(|m| m.name.as_str()))
            .collect();
        let described_set: BTreeSet<&str> = described.iter().copied().collect();

        assert_eq!(described.len(), described_set.len(), "metric names must be unique");
        assert_eq!(sampled, described_set);

        let expected: BTreeSet<&str> = [
            "used_0",
            "free_0",
            "total_0",
            "used_1",
            "free_1",
            "total_1",
            RECORDED_COUNT_KEY,
            FAILED_RECORDING_COUNT_KEY,
        ]
        .into_iter()
        .collect();
        assert_eq!(sampled, expected);
    }

    #[test]
    fn test_recorded_count_reads_total_matches_not_items() {
        let device = FakeDevice::new().with_recorded(5, 1);
        let reporter = MetricsReporter::new(device, "nasne");

        assert_eq!(reporter.get_recorded_count().unwrap(), 5.0);
    }

    #[test]
    fn test_failed_recording_count() {
        let device = FakeDevice::new().with_failed_recordings(7);
        let reporter = MetricsReporter::new(device, "nasne");

        assert_eq!(reporter.get_failed_recording_count().unwrap(), 7.0);
    }

    #[test]
    fn test_fetch_disk_records_lists_disks_once() {
        let mut reporter = MetricsReporter::new(two_disk_device(), "nasne");

        reporter.fetch_disk_records().unwrap();
        reporter.fetch_disk_records().unwrap();
        reporter.describe_graphs().unwrap();
        reporter.sample().unwrap();

        assert_eq!(reporter.device().call_count(FakeCall::ListDiskIds), 1);
        assert_eq!(reporter.device().call_count(FakeCall::DiskInfo(0)), 1);
        assert_eq!(reporter.device().call_count(FakeCall::DiskInfo(1)), 1);
    }

    #[test]
    fn test_partial_disk_failure_is_not_cached() {
        let device = two_disk_device();
        device.fail_on(FakeCall::DiskInfo(1), -1);
        let mut reporter = MetricsReporter::new(&device, "nasne");

        assert!(reporter.fetch_disk_records().is_err());

        device.recover(FakeCall::DiskInfo(1));
        let disks = reporter.fetch_disk_records().unwrap();

        assert_eq!(disks.len(), 2);
        assert_eq!(device.call_count(FakeCall::ListDiskIds), 2);
        assert_eq!(device.call_count(FakeCall::DiskInfo(0)), 2);
    }

    #[test]
    fn test_sample_fails_without_partial_result() {
        for call in [
            FakeCall::ListDiskIds,
            FakeCall::DiskInfo(0),
            FakeCall::RecordedTitles,
            FakeCall::FailedRecordings,
        ] {
            let device = two_disk_device();
            device.fail_on(call, -1);
            let mut reporter = MetricsReporter::new(device, "nasne");

            let err = reporter.sample().unwrap_err();
            assert!(matches!(err, DeviceError::Api { code: -1, .. }), "{:?}", call);
        }
    }

    #[test]
    fn test_describe_graphs_fails_when_disk_list_fails() {
        let device = two_disk_device();
        device.fail_on(FakeCall::ListDiskIds, 1);
        let mut reporter = MetricsReporter::new(device, "nasne");

        assert!(reporter.describe_graphs().is_err());
    }

    #[test]
    fn test_reporters_have_independent_caches() {
        let device = two_disk_device();
        let mut first = MetricsReporter::new(&device, "nasne");
        let mut second = MetricsReporter::new(&device, "nasne");

        first.fetch_disk_records().unwrap();
        second.fetch_disk_records().unwrap();

        assert_eq!(device.call_count(FakeCall::ListDiskIds), 2);
    }
}
