pub mod client;
pub mod responses;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use thiserror::Error;

pub use crate::core::DeviceApi;
pub use client::HttpDeviceClient;
pub use responses::{HddInfo, HddList, RecNgList, RecordedTitleList};

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned errorcode {code}")]
    Api { endpoint: String, code: i64 },
}

impl DeviceError {
    /// The API path that produced this error, when there is one.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            DeviceError::Client(_) => None,
            DeviceError::Http { endpoint, .. } | DeviceError::Api { endpoint, .. } => {
                Some(endpoint)
            }
        }
    }
}
