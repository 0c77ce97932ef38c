//! Request descriptors for the Opsview REST endpoints.
//!
//! A `RequestDescriptor` captures method, URL, headers, query and body for
//! one call before it is handed to `reqwest`.

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;

use crate::error::{OpsviewError, Result};

pub const USERNAME_HEADER: &str = "X-Opsview-Username";
pub const TOKEN_HEADER: &str = "X-Opsview-Token";

/// Query parameter filtering downtimes by host name pattern
pub const HOSTNAME_PARAM: &str = "svc.hostname";
/// Query parameter filtering downtimes by service name pattern
pub const SERVICENAME_PARAM: &str = "svc.servicename";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Authentication,
    CreateDowntime,
    Reload,
}

impl Operation {
    pub fn method(&self) -> Method {
        match self {
            Operation::Authentication | Operation::CreateDowntime | Operation::Reload => {
                Method::POST
            }
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Operation::Authentication => "/login",
            Operation::CreateDowntime => "/downtime",
            Operation::Reload => "/reload",
        }
    }

    /// Everything except login needs `X-Opsview-Username`/`X-Opsview-Token`.
    pub fn requires_token(&self) -> bool {
        !matches!(self, Operation::Authentication)
    }
}

#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub operation: Operation,
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestDescriptor {
    /// Start a JSON request for `operation` against the REST base URL `host`.
    pub fn for_operation(operation: Operation, host: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            operation,
            method: operation.method(),
            url: format!("{}{}", host.trim_end_matches('/'), operation.endpoint()),
            headers,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body<B: Serialize>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            OpsviewError::InvalidArgument(format!("Failed to serialize request body: {}", e))
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn with_auth(mut self, username: &str, token: &str) -> Result<Self> {
        self.headers.insert(
            HeaderName::from_static("x-opsview-username"),
            Self::header_value(USERNAME_HEADER, username)?,
        );
        self.headers.insert(
            HeaderName::from_static("x-opsview-token"),
            Self::header_value(TOKEN_HEADER, token)?,
        );
        Ok(self)
    }

    fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
        HeaderValue::from_str(value).map_err(|_| {
            OpsviewError::InvalidArgument(format!(
                "{} contains characters not allowed in a header",
                name
            ))
        })
    }

    /// Whether the auth headers are present.
    pub fn is_authenticated(&self) -> bool {
        self.headers.contains_key(USERNAME_HEADER) && self.headers.contains_key(TOKEN_HEADER)
    }

    pub fn into_request(self, client: &Client) -> RequestBuilder {
        let mut builder = client
            .request(self.method, &self.url)
            .headers(self.headers);
        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        if let Some(body) = self.body {
            builder = builder.json(&body);
        }
        builder
    }
}
