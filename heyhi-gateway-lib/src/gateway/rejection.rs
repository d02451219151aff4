use http::StatusCode;
use std::time::Duration;
use thiserror::Error;

pub const MESSAGES_REQUIRED: &str = "The \"messages\" field is required";
pub const MESSAGES_NOT_EMPTY: &str = "The \"messages\" array must contain at least one message";
pub const BODY_NOT_OBJECT: &str = "The request body must be a JSON object";
pub const BODY_UNREADABLE: &str = "Failed to read request body";

/// Describes why the gateway answered a request itself
///
/// Rendered as `{error, message}` (plus `detail` for upstream failures).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Too many requests, try again in 1 minute")]
    RateLimited { limit: u32, reset_after: Duration },

    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("Action '{0}' not recognized")]
    UnknownAction(String),

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Error while communicating with the AI service")]
    UpstreamError(String),

    #[error("The AI service could not run the tool")]
    UpstreamFail(String),

    #[error("No route for {0}")]
    NotFound(String),

    #[error("Method {method} not allowed, use {allow}")]
    MethodNotAllowed { method: String, allow: http::Method },
}

impl Rejection {
    /// Machine-readable code sent as `error`
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            Rejection::Unauthorized => "UNAUTHORIZED",
            Rejection::BadRequest(_) => "BAD_REQUEST",
            Rejection::UnknownAction(_) => "UNKNOWN_ACTION",
            Rejection::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Rejection::UpstreamError(_) => "UPSTREAM_ERROR",
            Rejection::UpstreamFail(_) => "UPSTREAM_FAIL",
            Rejection::NotFound(_) => "NOT_FOUND",
            Rejection::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
        }
    }

    /// Transport error behind an upstream failure
    pub fn detail(&self) -> Option<&str> {
        match self {
            Rejection::UpstreamError(detail) | Rejection::UpstreamFail(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Rejection::Unauthorized => StatusCode::UNAUTHORIZED,
            Rejection::BadRequest(_) | Rejection::UnknownAction(_) => StatusCode::BAD_REQUEST,
            Rejection::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Rejection::UpstreamError(_) | Rejection::UpstreamFail(_) => StatusCode::BAD_GATEWAY,
            Rejection::NotFound(_) => StatusCode::NOT_FOUND,
            Rejection::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl From<Rejection> for StatusCode {
    fn from(r: Rejection) -> StatusCode {
        r.status()
    }
}
