//! HTTP transport on the hyper-util pooled client.

use async_trait::async_trait;
use axum::body::Body;
use hyper::header::{CONTENT_TYPE, USER_AGENT};
use hyper::Request;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// Upper bound for buffered response bodies.
const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

const AGENT: &str = concat!("twinning-core/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client<HttpConnector, Body>,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let builder = Request::builder()
            .method(request.method.clone())
            .uri(request.url.as_str())
            .header(USER_AGENT, AGENT);

        let built = match request.body {
            Some(json) => {
                let bytes = serde_json::to_vec(&json)
                    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(bytes))
            }
            None => builder.body(Body::empty()),
        }
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let response = self
            .client
            .request(built)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let status = response.status();
        let body = axum::body::to_bytes(Body::new(response.into_body()), MAX_RESPONSE_BYTES)
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}
