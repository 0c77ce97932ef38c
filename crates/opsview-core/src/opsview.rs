//! Version-dispatching entry point.
//!
//! `Opsview` picks the client for a requested API version (the latest when
//! none is given) and forwards calls to it:
//!
//! ```no_run
//! # async fn run() -> opsview_core::Result<()> {
//! use chrono::{Duration, Utc};
//! use opsview_core::Opsview;
//!
//! let opsview = Opsview::new(None)?;
//! let start = Utc::now() + Duration::minutes(5);
//! let ack = opsview
//!     .set_downtime(start, start + Duration::hours(1), "patching", "web%", Some("check_http"))
//!     .await?;
//! println!("{} hosts in downtime", ack.summary.num_hosts);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::api::{OpsviewApi, OpsviewV3};
use crate::auth::Credentials;
use crate::error::{OpsviewError, Result};
use crate::lock::ReloadLock;
use crate::models::{DowntimeAck, ReloadStatus};

/// Latest Opsview API version implemented by this library
pub const LATEST_VERSION: u32 = OpsviewV3::VERSION;

/// Versions `Opsview::new` can instantiate
pub const SUPPORTED_VERSIONS: &[u32] = &[OpsviewV3::VERSION];

pub struct Opsview {
    api: Box<dyn OpsviewApi>,
}

impl Opsview {
    /// Client for `version` (latest if `None`) with credentials loaded from
    /// the environment or `$HOME/.opsview_secret`.
    ///
    /// An unsupported version is reported before credentials are read.
    pub fn new(version: Option<u32>) -> Result<Self> {
        Self::with_reload_lock(version, ReloadLock::default_location())
    }

    /// Like [`Opsview::new`], with an explicit reload lock location.
    pub fn with_reload_lock(version: Option<u32>, reload_lock: ReloadLock) -> Result<Self> {
        let version = Self::check_version(version)?;
        let credentials = Credentials::load()?;
        Self::with_settings(Some(version), credentials, reload_lock)
    }

    /// Client for `version` (latest if `None`) using explicit credentials.
    pub fn with_credentials(version: Option<u32>, credentials: Credentials) -> Result<Self> {
        Self::with_settings(version, credentials, ReloadLock::default_location())
    }

    /// Client for `version` (latest if `None`) with explicit credentials and
    /// reload lock location.
    pub fn with_settings(
        version: Option<u32>,
        credentials: Credentials,
        reload_lock: ReloadLock,
    ) -> Result<Self> {
        let version = Self::check_version(version)?;
        let api: Box<dyn OpsviewApi> = match version {
            OpsviewV3::VERSION => {
                Box::new(OpsviewV3::new(credentials)?.with_reload_lock(reload_lock))
            }
            other => return Err(OpsviewError::UnsupportedVersion(other)),
        };
        debug!(version, "Opsview client created");
        Ok(Self { api })
    }

    /// Wrap a custom client implementation.
    pub fn from_api(api: Box<dyn OpsviewApi>) -> Self {
        Self { api }
    }

    fn check_version(version: Option<u32>) -> Result<u32> {
        let version = version.unwrap_or(LATEST_VERSION);
        if SUPPORTED_VERSIONS.contains(&version) {
            Ok(version)
        } else {
            Err(OpsviewError::UnsupportedVersion(version))
        }
    }

    pub fn version(&self) -> u32 {
        self.api.version()
    }

    /// See [`OpsviewApi::set_downtime`].
    pub async fn set_downtime(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        comment: &str,
        host_pattern: &str,
        service_pattern: Option<&str>,
    ) -> Result<DowntimeAck> {
        self.api
            .set_downtime(start, end, comment, host_pattern, service_pattern)
            .await
    }

    /// See [`OpsviewApi::reload`].
    pub async fn reload(&self, start_time: Option<DateTime<Utc>>) -> Result<ReloadStatus> {
        self.api.reload(start_time).await
    }
}
