use bytes::Bytes;
use http::{HeaderMap, Method};
use serde_json::Value;
use std::net::SocketAddr;

/// Everything the gateway knows about one inbound request
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub peer: SocketAddr,
    pub body: Bytes,
    /// `body` parsed as JSON; `None` when empty or malformed
    pub json: Option<Value>,
    /// The body exceeded the configured size and was not read in full
    pub oversized: bool,
    /// The body stream failed before it was read in full
    pub truncated: bool,
}

impl GatewayRequest {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        headers: HeaderMap,
        peer: SocketAddr,
        body: Bytes,
    ) -> Self {
        let json = serde_json::from_slice(&body).ok();
        Self {
            method,
            path: path.into(),
            headers,
            peer,
            body,
            json,
            oversized: false,
            truncated: false,
        }
    }

    /// Mark a request whose body was cut off at the size limit
    pub fn into_oversized(mut self) -> Self {
        self.oversized = true;
        self.body = Bytes::new();
        self.json = None;
        self
    }

    /// Mark a request whose body stream errored part way through
    pub fn into_truncated(mut self) -> Self {
        self.truncated = true;
        self.body = Bytes::new();
        self.json = None;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn origin(&self) -> Option<&str> {
        self.header("origin")
    }

    /// The JSON body if it is an object
    pub fn json_object(&self) -> Option<&serde_json::Map<String, Value>> {
        self.json.as_ref().and_then(Value::as_object)
    }
}
