use serde::Deserialize;

/// One extra header sent on every gateway response
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CustomHeader {
    /// Header name (e.g., "X-Content-Type-Options")
    pub name: String,
    /// Header value (e.g., "nosniff")
    pub value: String,
}

/// `[security_headers]`: extra response headers
///
/// Names and values are checked by `validate_config`.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct SecurityHeaders {
    #[serde(default)]
    pub custom: Vec<CustomHeader>,
}
