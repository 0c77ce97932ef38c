//! Client library for the Opsview monitoring REST API.
//!
//! Authenticates against an Opsview server, sets downtimes on hosts and
//! services matching wildcard patterns, and triggers configuration reloads
//! guarded by a single-flight lock file.
//!
//! Start with [`Opsview`], which selects the client for an API version and
//! forwards calls to it.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod lock;
pub mod models;
pub mod opsview;

pub use api::{OpsviewApi, OpsviewV3};
pub use auth::Credentials;
pub use error::{OpsviewError, Result};
pub use lock::ReloadLock;
pub use models::{DowntimeAck, ReloadStatus};
pub use opsview::{Opsview, LATEST_VERSION, SUPPORTED_VERSIONS};
