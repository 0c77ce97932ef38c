//! Client for the Opsview REST API version 3.
//!
//! Provides `OpsviewV3`, which logs in lazily, caches the auth token and
//! implements downtime creation and configuration reloads.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{Credentials, TokenCache};
use crate::error::{OpsviewError, Result};
use crate::lock::ReloadLock;
use crate::models::{DowntimeAck, DowntimeRequest, ReloadStatus};

use super::request::{Operation, RequestDescriptor, HOSTNAME_PARAM, SERVICENAME_PARAM};
use super::OpsviewApi;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
}

/// Opsview API 3.x client.
pub struct OpsviewV3 {
    client: Client,
    credentials: Credentials,
    token: TokenCache,
    reload_lock: ReloadLock,
}

impl OpsviewV3 {
    pub const VERSION: u32 = 3;

    /// Create a client using the default reload lock location.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            credentials,
            token: TokenCache::new(),
            reload_lock: ReloadLock::default_location(),
        })
    }

    /// Use `reload_lock` instead of the default marker file.
    pub fn with_reload_lock(mut self, reload_lock: ReloadLock) -> Self {
        self.reload_lock = reload_lock;
        self
    }

    /// Token obtained on first use; later calls reuse it.
    async fn token(&self) -> Result<String> {
        self.token.get_or_fetch(|| self.login()).await
    }

    async fn login(&self) -> Result<String> {
        let body = LoginRequest {
            username: self.credentials.username(),
            password: self.credentials.password(),
        };
        let descriptor =
            RequestDescriptor::for_operation(Operation::Authentication, self.credentials.host())
                .with_body(&body)?;

        debug!(
            url = %descriptor.url,
            username = %self.credentials.username(),
            "Requesting Opsview token"
        );

        let response = descriptor
            .into_request(&self.client)
            .send()
            .await
            .map_err(|e| {
                OpsviewError::Authentication(format!(
                    "The Opsview authentication API returned an error: {}",
                    e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let reason = OpsviewError::from_status(status, &text);
            warn!(status = status.as_u16(), "Opsview login rejected");
            return Err(OpsviewError::Authentication(reason.to_string()));
        }

        let auth: AuthResponse = response.json().await.map_err(|e| {
            OpsviewError::Authentication(format!("Failed to parse login response: {}", e))
        })?;

        info!(username = %self.credentials.username(), "Authenticated against Opsview");
        Ok(auth.token)
    }

    /// Build a request for `operation`, with auth headers injected for
    /// every operation except login.
    async fn build(&self, operation: Operation) -> Result<RequestDescriptor> {
        let descriptor = RequestDescriptor::for_operation(operation, self.credentials.host());
        if operation.requires_token() {
            let token = self.token().await?;
            descriptor.with_auth(self.credentials.username(), &token)
        } else {
            Ok(descriptor)
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(OpsviewError::from_status(status, &body))
        }
    }

    async fn send<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T> {
        let url = descriptor.url.clone();
        debug!(method = %descriptor.method, url = %url, "Sending Opsview request");

        let response = descriptor.into_request(&self.client).send().await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            OpsviewError::InvalidResponse(format!("Failed to parse response from {}: {}", url, e))
        })
    }

    async fn reload_now(&self) -> Result<ReloadStatus> {
        let _guard = self.reload_lock.try_acquire()?;

        let descriptor = self.build(Operation::Reload).await?;
        match self.send::<ReloadStatus>(descriptor).await {
            Ok(status) => {
                info!(
                    server_status = status.server_status,
                    configuration_status = ?status.configuration_status,
                    "Opsview reload finished"
                );
                Ok(status)
            }
            Err(OpsviewError::Api { status, message, .. })
                if status == StatusCode::CONFLICT.as_u16() =>
            {
                warn!(message = %message, "Opsview reports a reload already running");
                Err(OpsviewError::ReloadInProgress { lock_path: None })
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl OpsviewApi for OpsviewV3 {
    fn version(&self) -> u32 {
        Self::VERSION
    }

    async fn set_downtime(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        comment: &str,
        host_pattern: &str,
        service_pattern: Option<&str>,
    ) -> Result<DowntimeAck> {
        if end <= start {
            return Err(OpsviewError::InvalidArgument(format!(
                "downtime end {} must be after start {}",
                end, start
            )));
        }

        let mut descriptor = self
            .build(Operation::CreateDowntime)
            .await?
            .with_query(HOSTNAME_PARAM, host_pattern);
        if let Some(service) = service_pattern {
            descriptor = descriptor.with_query(SERVICENAME_PARAM, service);
        }
        let descriptor = descriptor.with_body(&DowntimeRequest::new(start, end, comment))?;

        let ack: DowntimeAck = self.send(descriptor).await?;
        info!(
            host_pattern = %host_pattern,
            service_pattern = ?service_pattern,
            hosts = ack.summary.num_hosts,
            services = ack.summary.num_services,
            "Downtime created"
        );
        Ok(ack)
    }

    async fn reload(&self, start_time: Option<DateTime<Utc>>) -> Result<ReloadStatus> {
        if let Some(at) = start_time {
            let delay = (at - Utc::now())
                .to_std()
                .ok()
                .filter(|d| !d.is_zero())
                .ok_or_else(|| {
                    warn!(start_time = %at, "Refusing to schedule a reload in the past");
                    OpsviewError::ScheduleInPast(at)
                })?;

            info!(start_time = %at, delay_secs = delay.as_secs(), "Reload scheduled");
            tokio::time::sleep(delay).await;
        }

        self.reload_now().await
    }
}
