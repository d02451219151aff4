use serde::Deserialize;
use std::net::SocketAddr;

use super::access::{AccessConfig, DiagnosticsConfig};
use super::directory::{ContentConfig, UserConfig};
use super::headers::SecurityHeaders;
use super::telemetry::{LoggingConfig, TelemetryConfig};
use super::timeout::TimeoutConfig;
use super::upstream::UpstreamConfig;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Address and port to listen on
    /// Example: "0.0.0.0:8080" or "127.0.0.1:8080"
    pub listen: SocketAddr,
    /// Path prefix under which all gateway routes are mounted
    /// Example: "/heyhi/v1" serves `/heyhi/v1/chat`
    /// Default: "" (routes at the root)
    #[serde(default)]
    pub base_path: String,
    /// Upstream assistant service
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// API key, CORS allow-list and rate limiting
    #[serde(default)]
    pub access: AccessConfig,
    /// Diagnostic event log
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Timeout configuration
    #[serde(default)]
    pub timeout: TimeoutConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Extra headers added to every response
    #[serde(default)]
    pub security_headers: SecurityHeaders,
    /// Content catalog for the tools endpoint
    #[serde(default)]
    pub content: ContentConfig,
    /// Users resolvable by `get_user_info`
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Config {
    /// Configuration with every section at its default, listening on `listen`
    pub fn with_listen(listen: SocketAddr) -> Self {
        Self {
            listen,
            base_path: String::new(),
            upstream: UpstreamConfig::default(),
            access: AccessConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
            logging: LoggingConfig::default(),
            timeout: TimeoutConfig::default(),
            telemetry: TelemetryConfig::default(),
            security_headers: SecurityHeaders::default(),
            content: ContentConfig::default(),
            users: Vec::new(),
        }
    }
}
