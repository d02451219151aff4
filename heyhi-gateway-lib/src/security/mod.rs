pub mod auth;
pub mod cors;
pub mod headers;
pub mod rate_limit;

pub use auth::{authenticate, provided_key, AuthOutcome, AuthPolicy, API_KEY_HEADER};
pub use headers::apply_security_headers;
pub use rate_limit::{client_identity, RateLimitResult, RateLimiter};
