use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::number_or_string;

/// Timestamp format accepted by the Opsview downtime API
pub const DOWNTIME_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Body of `POST /downtime`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DowntimeRequest {
    pub starttime: String,
    pub endtime: String,
    pub comment: String,
}

impl DowntimeRequest {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, comment: &str) -> Self {
        Self {
            starttime: start.format(DOWNTIME_TIME_FORMAT).to_string(),
            endtime: end.format(DOWNTIME_TIME_FORMAT).to_string(),
            comment: comment.to_string(),
        }
    }
}

/// Server acknowledgement of a downtime creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DowntimeAck {
    pub summary: DowntimeSummary,
    #[serde(default)]
    pub list: DowntimeList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DowntimeSummary {
    #[serde(deserialize_with = "number_or_string", default)]
    pub num_hostgroups: u64,
    #[serde(deserialize_with = "number_or_string", default)]
    pub num_hosts: u64,
    #[serde(deserialize_with = "number_or_string", default)]
    pub num_services: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DowntimeList {
    #[serde(default)]
    pub hostgroups: Vec<HostgroupRef>,
    #[serde(default)]
    pub hosts: Vec<HostRef>,
    #[serde(default)]
    pub services: Vec<ServiceRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostgroupRef {
    #[serde(deserialize_with = "number_or_string")]
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRef {
    #[serde(deserialize_with = "number_or_string")]
    pub id: u64,
    pub hostname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRef {
    #[serde(deserialize_with = "number_or_string")]
    pub id: u64,
    pub hostname: String,
    pub servicename: String,
}

impl DowntimeAck {
    /// Total number of objects put into downtime
    pub fn total_affected(&self) -> u64 {
        self.summary.num_hostgroups + self.summary.num_hosts + self.summary.num_services
    }
}
