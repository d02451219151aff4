use crate::config::SecurityHeaders;
use http::{HeaderName, HeaderValue, Response};

/// Add the configured `security_headers.custom` entries to a gateway response
///
/// Headers the gateway already set (content type, CORS, rate-limit hints,
/// `Allow`) are kept as they are.
pub fn apply_security_headers<T>(response: &mut Response<T>, config: &SecurityHeaders) {
    for header in &config.custom {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(header.name.as_bytes()),
            HeaderValue::from_str(&header.value),
        ) else {
            continue;
        };
        response.headers_mut().entry(name).or_insert(value);
    }
}
