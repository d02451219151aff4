use bytes::Bytes;
use http::header::{HeaderValue, ALLOW, CONTENT_TYPE, RETRY_AFTER};
use http::{Response, StatusCode};
use serde_json::{json, Value};

use super::rejection::Rejection;

/// Bytes of a non-JSON upstream body echoed back in `raw`
pub const RAW_PREVIEW_BYTES: usize = 500;

pub fn json_response(status: StatusCode, value: &Value) -> Response<Bytes> {
    body_response(status, Bytes::from(value.to_string()))
}

/// Relay an upstream answer, substituting `INVALID_RESPONSE` for a non-JSON body
///
/// Returns the response and whether the body was valid JSON.
pub fn passthrough(status: u16, body: Bytes) -> (Response<Bytes>, bool) {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    if serde_json::from_slice::<serde::de::IgnoredAny>(&body).is_ok() {
        return (body_response(status, body), true);
    }
    let substitute = json!({
        "error": "INVALID_RESPONSE",
        "raw": raw_preview(&body),
    });
    (json_response(status, &substitute), false)
}

/// Leading text of `body`, at most [`RAW_PREVIEW_BYTES`] long and never split mid-character
///
/// Invalid sequences become U+FFFD.
fn raw_preview(body: &[u8]) -> String {
    let mut preview = String::new();
    for chunk in body.utf8_chunks() {
        for c in chunk.valid().chars() {
            if preview.len() + c.len_utf8() > RAW_PREVIEW_BYTES {
                return preview;
            }
            preview.push(c);
        }
        if !chunk.invalid().is_empty() {
            if preview.len() + char::REPLACEMENT_CHARACTER.len_utf8() > RAW_PREVIEW_BYTES {
                return preview;
            }
            preview.push(char::REPLACEMENT_CHARACTER);
        }
    }
    preview
}

pub fn rejection_response(rejection: &Rejection) -> Response<Bytes> {
    let mut body = json!({
        "error": rejection.code(),
        "message": rejection.to_string(),
    });
    if let Some(detail) = rejection.detail() {
        body["detail"] = Value::from(detail);
    }
    let mut resp = json_response(rejection.status(), &body);

    let headers = resp.headers_mut();
    match rejection {
        Rejection::RateLimited { limit, reset_after } => {
            let reset = reset_after.as_secs().max(1);
            headers.insert("x-rate-limit-limit", HeaderValue::from(*limit));
            headers.insert("x-rate-limit-remaining", HeaderValue::from(0u32));
            headers.insert("x-ratelimit-reset", HeaderValue::from(reset));
            headers.insert(RETRY_AFTER, HeaderValue::from(reset));
        }
        Rejection::MethodNotAllowed { allow, .. } => {
            if let Ok(value) = HeaderValue::from_str(allow.as_str()) {
                headers.insert(ALLOW, value);
            }
        }
        _ => {}
    }
    resp
}

fn body_response(status: StatusCode, body: Bytes) -> Response<Bytes> {
    let mut resp = Response::new(body);
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
    resp
}
