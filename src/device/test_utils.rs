use crate::{
    core::{DeviceApi, DiskRecord},
    device::{DeviceError, RecNgList, RecordedTitleList},
};
use std::cell::RefCell;
use std::collections::HashMap;

/// Calls a `FakeDevice` can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeCall {
    ListDiskIds,
    DiskInfo(u32),
    RecordedTitles,
    FailedRecordings,
}

/// In-memory device for testing.
///
/// Serves a fixed set of disks and counters, counts every call it receives,
/// and returns `DeviceError::Api` for any call registered with `fail_on`.
#[derive(Debug, Default)]
pub struct FakeDevice {
    disks: Vec<DiskRecord>,
    total_matches: u64,
    returned_titles: usize,
    failed_count: u64,
    failures: RefCell<HashMap<FakeCall, i64>>,
    calls: RefCell<HashMap<FakeCall, u32>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disk(mut self, id: u32, used: u64, free: u64, total: u64) -> Self {
        self.disks.push(DiskRecord {
            id,
            used,
            free,
            total,
        });
        self
    }

    /// Sets the title list's `totalMatches` and how many items come back with it.
    pub fn with_recorded(mut self, total_matches: u64, returned_titles: usize) -> Self {
        self.total_matches = total_matches;
        self.returned_titles = returned_titles;
        self
    }

    pub fn with_failed_recordings(mut self, count: u64) -> Self {
        self.failed_count = count;
        self
    }

    /// Makes every subsequent `call` fail with the given errorcode.
    pub fn fail_on(&self, call: FakeCall, code: i64) {
        self.failures.borrow_mut().insert(call, code);
    }

    /// Makes `call` succeed again.
    pub fn recover(&self, call: FakeCall) {
        self.failures.borrow_mut().remove(&call);
    }

    /// Get the number of times a call was made
    pub fn call_count(&self, call: FakeCall) -> u32 {
        self.calls.borrow().get(&call).copied().unwrap_or(0)
    }

    /// Get the number of calls of any kind
    pub fn total_calls(&self) -> u32 {
        self.calls.borrow().values().sum()
    }

    fn record(&self, call: FakeCall, endpoint: &str) -> Result<(), DeviceError> {
        *self.calls.borrow_mut().entry(call).or_insert(0) += 1;
        match self.failures.borrow().get(&call) {
            Some(&code) => Err(DeviceError::Api {
                endpoint: endpoint.to_string(),
                code,
            }),
            None => Ok(()),
        }
    }
}

impl DeviceApi for FakeDevice {
    fn list_disk_ids(&self) -> Result<Vec<u32>, DeviceError> {
        self.record(FakeCall::ListDiskIds, "/status/HDDListGet")?;
        Ok(self.disks.iter().map(|disk| disk.id).collect())
    }

    fn disk_info(&self, id: u32) -> Result<DiskRecord, DeviceError> {
        self.record(FakeCall::DiskInfo(id), "/status/HDDInfoGet")?;
        self.disks
            .iter()
            .find(|disk| disk.id == id)
            .copied()
            .ok_or_else(|| DeviceError::Api {
                endpoint: "/status/HDDInfoGet".to_string(),
                code: -1,
            })
    }

    fn recorded_titles(&self, requested_count: u32) -> Result<RecordedTitleList, DeviceError> {
        self.record(FakeCall::RecordedTitles, "/recorded/titleListGet")?;
        let returned = self.returned_titles.min(requested_count as usize);
        Ok(RecordedTitleList {
            errorcode: 0,
            number_matched: returned as u64,
            total_matches: self.total_matches,
            items: vec![Default::default(); returned],
        })
    }

    fn failed_recordings(&self) -> Result<RecNgList, DeviceError> {
        self.record(FakeCall::FailedRecordings, "/status/recNgListGet")?;
        Ok(RecNgList {
            errorcode: 0,
            number: self.failed_count,
            items: vec![Default::default(); self.failed_count as usize],
        })
    }
}
