//! In-process transport for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use hyper::StatusCode;
use url::Url;

use crate::registry::BackendDescriptor;
use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// Descriptor whose host routes to the scripted transport entry `name`.
pub fn descriptor(name: &str, critical: bool) -> BackendDescriptor {
    let endpoint = Url::parse(&format!("http://{name}.twin.test")).unwrap();
    BackendDescriptor::new(name, endpoint, critical)
}

/// How a scripted backend answers.
#[derive(Debug, Clone)]
pub enum Script {
    Healthy,
    Status(u16),
    Json(serde_json::Value),
    Refused,
    Hang,
    Delay(Duration),
}

#[derive(Debug, Default)]
struct Inner {
    scripts: HashMap<String, Script>,
    requests: HashMap<String, Vec<TransportRequest>>,
    in_flight: usize,
    peak_in_flight: usize,
}

/// Counts a request as in flight until dropped, including on cancellation.
struct InFlight(Arc<Mutex<Inner>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.0.lock() {
            inner.in_flight -= 1;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, script: Script) -> Self {
        self.set(name, script);
        self
    }

    pub fn set(&self, name: &str, script: Script) {
        self.inner
            .lock()
            .unwrap()
            .scripts
            .insert(name.to_string(), script);
    }

    pub fn requests_to(&self, name: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .requests
            .get(name)
            .map_or(0, Vec::len)
    }

    pub fn total_requests(&self) -> usize {
        self.inner.lock().unwrap().requests.values().map(Vec::len).sum()
    }

    /// Most requests ever outstanding at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.inner.lock().unwrap().peak_in_flight
    }

    pub fn last_path(&self, name: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .requests
            .get(name)
            .and_then(|r| r.last())
            .map(|r| r.url.path().to_string())
    }

    pub fn last_body(&self, name: &str) -> Option<serde_json::Value> {
        self.inner
            .lock()
            .unwrap()
            .requests
            .get(name)
            .and_then(|r| r.last())
            .and_then(|r| r.body.clone())
    }
}

fn ok(body: &str) -> Result<TransportResponse, TransportError> {
    Ok(TransportResponse {
        status: StatusCode::OK,
        body: Bytes::from(body.to_string()),
    })
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let host = request.url.host_str().unwrap_or_default().to_string();
        let name = host.trim_end_matches(".twin.test").to_string();

        let script = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.entry(name.clone()).or_default().push(request);
            inner.in_flight += 1;
            inner.peak_in_flight = inner.peak_in_flight.max(inner.in_flight);
            inner.scripts.get(&name).cloned().unwrap_or(Script::Refused)
        };
        let _in_flight = InFlight(self.inner.clone());

        match script {
            Script::Healthy => ok(r#"{"status":"healthy"}"#),
            Script::Status(code) => Ok(TransportResponse {
                status: StatusCode::from_u16(code).unwrap(),
                body: Bytes::new(),
            }),
            Script::Json(value) => ok(&value.to_string()),
            Script::Refused => Err(TransportError::Connect(format!("{name}: connection refused"))),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                ok("")
            }
            Script::Delay(delay) => {
                tokio::time::sleep(delay).await;
                ok(r#"{"status":"healthy"}"#)
            }
        }
    }
}
