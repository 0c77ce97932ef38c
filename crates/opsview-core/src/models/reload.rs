use serde::{Deserialize, Serialize};

use super::{number_or_string, optional_number_or_string};

/// Result of `POST /reload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadStatus {
    /// 0 when the server is running normally
    #[serde(deserialize_with = "number_or_string")]
    pub server_status: u64,
    #[serde(default)]
    pub configuration_status: Option<String>,
    /// Average reload duration in seconds
    #[serde(default, deserialize_with = "optional_number_or_string")]
    pub average_duration: Option<u64>,
    /// Epoch seconds of the last configuration update
    #[serde(default, deserialize_with = "optional_number_or_string")]
    pub lastupdated: Option<u64>,
    #[serde(default, deserialize_with = "optional_number_or_string")]
    pub auditlog_entries: Option<u64>,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl ReloadStatus {
    pub fn is_up_to_date(&self) -> bool {
        self.server_status == 0 && self.configuration_status.as_deref() == Some("uptodate")
    }
}
