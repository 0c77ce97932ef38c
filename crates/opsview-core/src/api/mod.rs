//! REST API clients for the Opsview monitoring server.
//!
//! Each supported Opsview API version has its own client implementing
//! `OpsviewApi`. Methods a version does not implement fall back to the
//! trait's default bodies, which fail with `UnsupportedMethod`.
//!
//! The API uses token authentication: `POST /login` returns a token that is
//! sent back in `X-Opsview-Username`/`X-Opsview-Token` headers.

pub mod request;
pub mod v3;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{OpsviewError, Result};
use crate::models::{DowntimeAck, ReloadStatus};

pub use request::{Operation, RequestDescriptor};
pub use v3::OpsviewV3;

#[async_trait]
pub trait OpsviewApi: Send + Sync {
    /// Opsview API version this client speaks.
    fn version(&self) -> u32;

    /// Put hosts matching `host_pattern` (and services matching
    /// `service_pattern`, if given) into downtime between `start` and `end`.
    async fn set_downtime(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _comment: &str,
        _host_pattern: &str,
        _service_pattern: Option<&str>,
    ) -> Result<DowntimeAck> {
        Err(OpsviewError::UnsupportedMethod {
            method: "set_downtime",
            version: self.version(),
        })
    }

    /// Reload the server configuration, now or at `start_time`.
    async fn reload(&self, _start_time: Option<DateTime<Utc>>) -> Result<ReloadStatus> {
        Err(OpsviewError::UnsupportedMethod {
            method: "reload",
            version: self.version(),
        })
    }
}
