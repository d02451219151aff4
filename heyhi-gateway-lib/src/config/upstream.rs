use serde::Deserialize;
use std::time::Duration;

/// Upstream assistant service configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct UpstreamConfig {
    /// Base URL of the assistant core (absolute http/https URL)
    /// A trailing slash is ignored
    /// Default: "https://hey-hi-assistant-core-onlymatt.onrender.com"
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeouts used by `POST /chat`
    /// Default: 10s connect, 70s total
    #[serde(default = "RouteTimeouts::chat")]
    pub chat: RouteTimeouts,
    /// Timeouts used by `POST /tools/run`
    /// Default: 15s connect, 70s total
    #[serde(default = "RouteTimeouts::tools_run")]
    pub tools_run: RouteTimeouts,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat: RouteTimeouts::chat(),
            tools_run: RouteTimeouts::tools_run(),
        }
    }
}

/// Connect and total timeouts for one upstream call site
///
/// The connect phase and the whole call are bounded independently: a slow
/// DNS/TCP handshake fails after `connect_secs` even if `total_secs` is larger.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RouteTimeouts {
    pub connect_secs: u64,
    pub total_secs: u64,
}

impl RouteTimeouts {
    pub fn chat() -> Self {
        Self { connect_secs: 10, total_secs: 70 }
    }

    pub fn tools_run() -> Self {
        Self { connect_secs: 15, total_secs: 70 }
    }

    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn total(&self) -> Duration {
        Duration::from_secs(self.total_secs)
    }
}

fn default_base_url() -> String {
    "https://hey-hi-assistant-core-onlymatt.onrender.com".to_string()
}
