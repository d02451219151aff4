use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, VARY,
};
use http::{HeaderMap, HeaderValue, Response};

pub const ALLOW_HEADERS: &str = "Authorization, Content-Type, X-HeyHi-Key";
pub const ALLOW_METHODS: &str = "POST, GET, OPTIONS";
pub const MAX_AGE_SECS: &str = "600";

/// The request's `Origin` if it is on the allow-list
///
/// Matching is exact and case-sensitive: no wildcards, no subdomain matching.
pub fn allowed_origin<'a>(origin: Option<&'a str>, allowed: &[String]) -> Option<&'a str> {
    let origin = origin.filter(|o| !o.is_empty())?;
    allowed.iter().any(|a| a == origin).then_some(origin)
}

/// Attach CORS headers when `origin` is allowed; otherwise leave the response alone
///
/// The gateway never blocks a disallowed origin itself, browsers enforce the
/// missing headers.
pub fn decorate<T>(origin: Option<&str>, allowed: &[String], response: &mut Response<T>) {
    let Some(origin) = allowed_origin(origin, allowed) else {
        return;
    };
    let Ok(origin_value) = HeaderValue::from_str(origin) else {
        return;
    };
    apply_cors_headers(response.headers_mut(), origin_value);
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(VARY, HeaderValue::from_static("Origin"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
}
