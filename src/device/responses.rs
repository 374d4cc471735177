//! Wire types for the device's JSON responses.
//!
//! Every response carries an `errorcode` field; zero means success. Fields the
//! plugin does not use are left out and ignored during decoding.

use crate::core::DiskRecord;
use serde::Deserialize;

/// Implemented by every response so the client can check `errorcode` uniformly.
pub trait ApiResponse {
    fn errorcode(&self) -> i64;
}

/// Response of `/status/HDDListGet`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HddList {
    #[serde(default)]
    pub errorcode: i64,
    #[serde(default)]
    pub number: u32,
    #[serde(rename = "HDD", default)]
    pub hdd: Vec<HddListEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HddListEntry {
    pub id: u32,
    #[serde(default)]
    pub internal_flag: u8,
    #[serde(default)]
    pub mount_status: u8,
    #[serde(default)]
    pub register_flag: u8,
}

/// Response of `/status/HDDInfoGet`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HddInfoResponse {
    #[serde(default)]
    pub errorcode: i64,
    #[serde(rename = "HDD")]
    pub hdd: HddInfo,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HddInfo {
    pub id: u32,
    pub total_volume_size: u64,
    pub free_volume_size: u64,
    pub used_volume_size: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl From<HddInfo> for DiskRecord {
    fn from(info: HddInfo) -> Self {
        DiskRecord {
            id: info.id,
            used: info.used_volume_size,
            free: info.free_volume_size,
            total: info.total_volume_size,
        }
    }
}

/// Response of `/recorded/titleListGet`.
///
/// `total_matches` counts every title matching the query, while `items` only
/// holds the page that was requested.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecordedTitleList {
    #[serde(default)]
    pub errorcode: i64,
    #[serde(default)]
    pub number_matched: u64,
    #[serde(default)]
    pub total_matches: u64,
    #[serde(rename = "item", default)]
    pub items: Vec<RecordedTitle>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct RecordedTitle {
    #[serde(default)]
    pub title: String,
}

/// Response of `/status/recNgListGet`.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct RecNgList {
    #[serde(default)]
    pub errorcode: i64,
    #[serde(default)]
    pub number: u64,
    #[serde(rename = "item", default)]
    pub items: Vec<RecNgItem>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct RecNgItem {
    #[serde(default)]
    pub title: String,
}

impl ApiResponse for HddList {
    fn errorcode(&self) -> i64 {
        self.errorcode
    }
}

impl ApiResponse for HddInfoResponse {
    fn errorcode(&self) -> i64 {
        self.errorcode
    }
}

impl ApiResponse for RecordedTitleList {
    fn errorcode(&self) -> i64 {
        self.errorcode
    }
}

impl ApiResponse for RecNgList {
    fn errorcode(&self) -> i64 {
        self.errorcode
    }
}
