#![forbid(unsafe_code)]

pub mod config;
pub mod diagnostics;
pub mod directory;
pub mod error;
pub mod gateway;
pub mod security;
pub mod telemetry;
pub mod upstream;

pub use config::{load_from_path, Config, ConfigProvider, ConfigSnapshot, ReloadableConfig, StaticConfig};
pub use diagnostics::DiagnosticLogger;
pub use error::{GatewayError, Result};
pub use gateway::{run, GatewayRequest, Rejection, RequestGateway};
pub use security::{RateLimitResult, RateLimiter};
pub use upstream::{ForwardResult, HttpForwarder, UpstreamForwarder};
