use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::StatusCode;
use std::future::Future;
use tracing::{debug, warn};

use super::client_pool::ClientPool;
use crate::config::RouteTimeouts;

/// Uniform outcome of an upstream call
///
/// A transport failure carries `error` with status 502 and an empty body. Any
/// response that was received, whatever its status, has `error: None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardResult {
    pub error: Option<String>,
    pub status: u16,
    pub body: Bytes,
}

impl ForwardResult {
    pub fn transport_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            status: StatusCode::BAD_GATEWAY.as_u16(),
            body: Bytes::new(),
        }
    }

    pub fn response(status: u16, body: impl Into<Bytes>) -> Self {
        Self { error: None, status, body: body.into() }
    }

    pub fn is_transport_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Relays a JSON payload to the upstream assistant service
pub trait UpstreamForwarder: Send + Sync + 'static {
    fn forward(
        &self,
        url: &str,
        payload: &serde_json::Value,
        timeouts: RouteTimeouts,
    ) -> impl Future<Output = ForwardResult> + Send;
}

/// Forwarder issuing real HTTP calls through a pooled reqwest client
#[derive(Default)]
pub struct HttpForwarder {
    pool: ClientPool,
}

impl HttpForwarder {
    pub fn new() -> Self {
        Self { pool: ClientPool::new() }
    }
}

impl UpstreamForwarder for HttpForwarder {
    async fn forward(
        &self,
        url: &str,
        payload: &serde_json::Value,
        timeouts: RouteTimeouts,
    ) -> ForwardResult {
        let client = match self.pool.client_for(timeouts.connect()) {
            Ok(client) => client,
            Err(e) => return ForwardResult::transport_error(error_chain(&e)),
        };

        let body = match serde_json::to_vec(payload) {
            Ok(body) => body,
            Err(e) => return ForwardResult::transport_error(format!("Failed to encode payload: {e}")),
        };

        let sent = client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(timeouts.total())
            .body(body)
            .send()
            .await;

        let resp = match sent {
            Ok(resp) => resp,
            Err(e) => {
                let message = error_chain(&e);
                warn!(%url, timeout = e.is_timeout(), error = %message, "upstream call failed");
                return ForwardResult::transport_error(message);
            }
        };

        let status = resp.status().as_u16();
        match resp.bytes().await {
            Ok(bytes) => {
                debug!(%url, status, bytes = bytes.len(), "upstream responded");
                ForwardResult::response(status, bytes)
            }
            Err(e) => {
                let message = error_chain(&e);
                warn!(%url, status, error = %message, "failed to read upstream body");
                ForwardResult::transport_error(message)
            }
        }
    }
}

/// Render an error with its sources, e.g. `error sending request: tcp connect error: Connection refused`
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
