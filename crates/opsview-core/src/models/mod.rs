//! Data models for Opsview REST payloads.
//!
//! - `DowntimeRequest`, `DowntimeAck`: creating downtimes and the server's
//!   summary of affected hostgroups/hosts/services
//! - `ReloadStatus`: result of a configuration reload

pub mod downtime;
pub mod reload;

pub use downtime::{
    DowntimeAck, DowntimeList, DowntimeRequest, DowntimeSummary, HostRef, HostgroupRef, ServiceRef,
};
pub use reload::ReloadStatus;

use serde::{Deserialize, Deserializer};

/// Opsview serializes counts and ids as numbers or numeric strings
/// depending on the endpoint.
pub(crate) fn number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

pub(crate) fn optional_number_or_string<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "number_or_string")] u64);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(n)| n))
}
