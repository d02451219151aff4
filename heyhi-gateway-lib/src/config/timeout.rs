use serde::Deserialize;

/// Server-side timeout configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TimeoutConfig {
    /// Graceful shutdown timeout in seconds
    /// Default: 30
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_secs: u64,
    /// Total connection handling timeout in seconds
    /// Must exceed the longest upstream total timeout, otherwise the
    /// connection is dropped before the upstream answer arrives
    /// Default: 300 seconds (5 minutes)
    #[serde(default = "default_connection_handling_timeout")]
    pub connection_handling_secs: u64,
    /// HTTP/1.1 keep-alive configuration
    #[serde(default)]
    pub keep_alive: KeepAliveConfig,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            shutdown_secs: default_shutdown_timeout(),
            connection_handling_secs: default_connection_handling_timeout(),
            keep_alive: KeepAliveConfig::default(),
        }
    }
}

/// HTTP/1.1 keep-alive configuration
///
/// **HTTP/2**: connections are always persistent with native multiplexing,
/// so this setting only affects HTTP/1.1 connections.
#[derive(Debug, Deserialize, Clone)]
pub struct KeepAliveConfig {
    /// Enable HTTP/1.1 keep-alive (persistent connections)
    /// Default: true
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_connection_handling_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}
