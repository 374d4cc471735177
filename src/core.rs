//! Core domain types and service traits for the nasne plugin
//!
//! This module defines the data the reporter works with (disk records, graph
//! descriptors, metric samples) and the trait contract for talking to the
//! device.

use crate::device::{DeviceError, RecNgList, RecordedTitleList};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Capacity snapshot of one disk attached to the device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DiskRecord {
    /// Identifier assigned by the device
    pub id: u32,
    /// Used capacity in bytes
    pub used: u64,
    /// Free capacity in bytes
    pub free: u64,
    /// Total capacity in bytes
    pub total: u64,
}

/// One cycle's flat metric name to value snapshot.
pub type MetricSample = BTreeMap<String, f64>;

/// Graph definitions keyed by graph key (without the metric key prefix).
pub type GraphDescriptors = BTreeMap<String, GraphDescriptor>;

/// Display unit understood by the agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Integer,
    Bytes,
}

/// How a set of metric keys is grouped and labeled for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphDescriptor {
    pub label: String,
    pub unit: Unit,
    pub metrics: Vec<MetricDescriptor>,
}

/// A single metric within a graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricDescriptor {
    pub name: String,
    pub label: String,
    /// The host should graph the per-interval delta rather than the raw value.
    #[serde(skip)]
    pub diff: bool,
}

impl MetricDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            diff: false,
        }
    }

    pub fn with_diff(mut self) -> Self {
        self.diff = true;
        self
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// The subset of the device HTTP API the reporter needs.
///
/// Every call is blocking and either returns decoded data or a `DeviceError`.
pub trait DeviceApi {
    /// Lists the identifiers of the disks known to the device.
    fn list_disk_ids(&self) -> Result<Vec<u32>, DeviceError>;

    /// Fetches capacity information for one disk.
    fn disk_info(&self, id: u32) -> Result<DiskRecord, DeviceError>;

    /// Lists recorded titles, returning at most `requested_count` items.
    ///
    /// The response always carries the total number of matching titles,
    /// regardless of how many items were returned.
    fn recorded_titles(&self, requested_count: u32) -> Result<RecordedTitleList, DeviceError>;

    /// Lists recordings that failed.
    fn failed_recordings(&self) -> Result<RecNgList, DeviceError>;
}

impl<T: DeviceApi + ?Sized> DeviceApi for &T {
    fn list_disk_ids(&self) -> Result<Vec<u32>, DeviceError> {
        (**self).list_disk_ids()
    }

    fn disk_info(&self, id: u32) -> Result<DiskRecord, DeviceError> {
        (**self).disk_info(id)
    }

    fn recorded_titles(&self, requested_count: u32) -> Result<RecordedTitleList, DeviceError> {
        (**self).recorded_titles(requested_count)
    }

    fn failed_recordings(&self) -> Result<RecNgList, DeviceError> {
        (**self).failed_recordings()
    }
}
