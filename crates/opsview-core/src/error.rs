use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpsviewError {
    #[error("Credentials not found: {0}")]
    CredentialsNotFound(String),

    #[error("Opsview properties file not found: {0}")]
    PropertiesFileNotFound(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Opsview API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        detail: Option<String>,
    },

    #[error("Opsview version {0} is not supported by this library")]
    UnsupportedVersion(u32),

    #[error("Method {method} is not supported by Opsview version {version}")]
    UnsupportedMethod { method: &'static str, version: u32 },

    /// `lock_path` is set when the local marker file blocked the reload.
    #[error("A reload is already in progress{}", lock_hint(.lock_path))]
    ReloadInProgress { lock_path: Option<PathBuf> },

    #[error("Scheduled start time {0} is in the past")]
    ScheduleInPast(chrono::DateTime<chrono::Utc>),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "keyring")]
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

pub type Result<T> = std::result::Result<T, OpsviewError>;

fn lock_hint(lock_path: &Option<PathBuf>) -> String {
    lock_path
        .as_deref()
        .map(|path: &Path| {
            format!(
                " (lock marker {}; remove it if no reload is running)",
                path.display()
            )
        })
        .unwrap_or_default()
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error payload as returned by the Opsview REST API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    #[serde(default, deserialize_with = "detail_as_string")]
    detail: Option<String>,
}

// Opsview sends `detail` either as a string or as a structured object.
fn detail_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl OpsviewError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build an `Api` error from a non-success response.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(ApiErrorBody {
                message: Some(message),
                detail,
            }) => OpsviewError::Api {
                status: status.as_u16(),
                message,
                detail,
            },
            _ => OpsviewError::Api {
                status: status.as_u16(),
                message: Self::truncate_body(body),
                detail: None,
            },
        }
    }

    /// Server-provided detail of an API error, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            OpsviewError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
