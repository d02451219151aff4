use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::Bytes;
use hyper::Response;
use hyper::StatusCode;
use prometheus::{Encoder, TextEncoder};
use serde_json::json;

use crate::error::{GatewayError, Result};

type RespBody = BoxBody<Bytes, hyper::Error>;

/// Prometheus text exposition of everything in `registry`
pub fn handle_metrics(registry: &prometheus::Registry) -> Result<Response<RespBody>> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    encoder
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| GatewayError::Http(format!("Failed to encode metrics: {e}")))?;

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", encoder.format_type())
        .body(full(Bytes::from(buffer)))
        .map_err(|e| GatewayError::Http(format!("Failed to build response: {e}")))
}

/// Liveness check - always 200 while the process runs
pub fn live_check_response() -> Result<Response<RespBody>> {
    let body = serde_json::to_vec(&json!({"status": "alive"}))
        .map_err(|e| GatewayError::Http(format!("Failed to serialize live response: {e}")))?;

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(full(Bytes::from(body)))
        .map_err(|e| GatewayError::Http(format!("Failed to build live response: {e}")))
}

fn full(bytes: Bytes) -> RespBody {
    Full::new(bytes).map_err(|never| match never {}).boxed()
}
