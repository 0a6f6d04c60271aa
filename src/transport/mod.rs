//! Outbound transport abstraction.
//!
//! # Data Flow
//! ```text
//! HealthProbe / Dispatcher
//!     → TransportRequest (method, url, optional JSON body)
//!     → Transport::send (http.rs: hyper-util pooled client)
//!     → TransportResponse (status + raw body) or TransportError
//! ```
//!
//! # Design Decisions
//! - Callers own the deadline: every send is wrapped in `tokio::time::timeout`
//!   by the probe or dispatcher, so a transport that hangs is still bounded
//! - Non-2xx handling is left to callers (probes accept 4xx, dispatch does not)

pub mod http;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use hyper::{Method, StatusCode};
use serde::Serialize;
use thiserror::Error;
use url::Url;

pub use self::http::HttpTransport;

/// A single outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<serde_json::Value>,
}

impl TransportRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            body: None,
        }
    }

    pub fn post_json(url: Url, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            url,
            body: Some(body),
        }
    }
}

/// Raw response as received from a backend.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Errors below the level of backend semantics.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TransportError {
    /// No response within the deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Connection refused, reset, DNS failure, etc.
    #[error("connection error: {0}")]
    Connect(String),

    /// The backend answered with an unacceptable status.
    #[error("backend returned status {0}")]
    Status(u16),

    /// The response body could not be read or decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// "Send request, get response-or-error" capability.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Join a base endpoint and a path without losing the endpoint's own path.
pub fn join_url(base: &Url, path: &str) -> Result<Url, TransportError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| TransportError::InvalidRequest(format!("{joined}: {e}")))
}
