//! A blocking HTTP client for the device's local API.

use crate::config::DeviceConfig;
use crate::core::{DeviceApi, DiskRecord};
use crate::device::responses::{
    ApiResponse, HddInfoResponse, HddList, RecNgList, RecordedTitleList,
};
use crate::device::DeviceError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

const HDD_LIST_PATH: &str = "/status/HDDListGet";
const HDD_INFO_PATH: &str = "/status/HDDInfoGet";
const REC_NG_LIST_PATH: &str = "/status/recNgListGet";
const TITLE_LIST_PATH: &str = "/recorded/titleListGet";

/// Talks to one device over plain HTTP.
///
/// Status endpoints and the recorded-title endpoint are served on different
/// ports, so the client keeps a base URL for each.
#[derive(Debug, Clone)]
pub struct HttpDeviceClient {
    client: reqwest::blocking::Client,
    status_base: String,
    recorded_base: String,
}

impl HttpDeviceClient {
    /// Creates a client for the device at `address` (a host name or IP).
    pub fn new(address: &str, config: &DeviceConfig) -> Result<Self, DeviceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(DeviceError::Client)?;

        Ok(Self {
            client,
            status_base: format!("http://{}:{}", address, config.status_port),
            recorded_base: format!("http://{}:{}", address, config.recorded_port),
        })
    }

    /// Sends a GET request and decodes the JSON body, treating a non-zero
    /// `errorcode` as a failure.
    fn get<T>(&self, base: &str, path: &str, query: &[(&str, String)]) -> Result<T, DeviceError>
    where
        T: DeserializeOwned + ApiResponse,
    {
        let url = format!("{}{}", base, path);
        debug!(url = %url, "Requesting device API");

        let http_err = |source: reqwest::Error| {
            error!(endpoint = path, error = %source, "Device request failed");
            DeviceError::Http {
                endpoint: path.to_string(),
                source,
            }
        };

        let body: T = self
            .client
            .get(&url)
            .query(query)
            .send()
            .and_then(|res| res.error_for_status())
            .and_then(|res| res.json())
            .map_err(http_err)?;

        match body.errorcode() {
            0 => Ok(body),
            code => {
                error!(endpoint = path, code, "Device API returned an error code");
                Err(DeviceError::Api {
                    endpoint: path.to_string(),
                    code,
                })
            }
        }
    }
}

impl DeviceApi for HttpDeviceClient {
    fn list_disk_ids(&self) -> Result<Vec<u32>, DeviceError> {
        let list: HddList = self.get(&self.status_base, HDD_LIST_PATH, &[])?;
        Ok(list.hdd.into_iter().map(|entry| entry.id).collect())
    }

    fn disk_info(&self, id: u32) -> Result<DiskRecord, DeviceError> {
        let response: HddInfoResponse =
            self.get(&self.status_base, HDD_INFO_PATH, &[("id", id.to_string())])?;
        Ok(response.hdd.into())
    }

    fn recorded_titles(&self, requested_count: u32) -> Result<RecordedTitleList, DeviceError> {
        let query = [
            ("searchCriteria", "0".to_string()),
            ("filter", "0".to_string()),
            ("startingIndex", "0".to_string()),
            ("requestedCount", requested_count.to_string()),
            ("sortCriteria", "0".to_string()),
            ("withDescriptionLong", "0".to_string()),
            ("withUserData", "0".to_string()),
        ];
        self.get(&self.recorded_base, TITLE_LIST_PATH, &query)
    }

    fn failed_recordings(&self) -> Result<RecNgList, DeviceError> {
        self.get(&self.status_base, REC_NG_LIST_PATH, &[])
    }
}
