use serde::Deserialize;

/// Access control configuration: API key, CORS allow-list and rate limiting
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccessConfig {
    /// Shared secret expected in the `X-HeyHi-Key` header
    /// Empty means authentication is not configured: `/chat` becomes public,
    /// `/tools` and `/tools/run` reject every request
    /// Default: ""
    #[serde(default)]
    pub api_key: String,
    /// Comma-separated list of allowed CORS origins (exact match)
    /// Default: "https://onlymatt.ca,https://www.onlymatt.ca"
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
    /// Requests per minute per client and route
    /// Values below 10 are raised to 10
    /// Default: 120
    #[serde(default = "default_rate_limit_per_min")]
    pub rate_limit_per_min: u32,
    /// Use the first `X-Forwarded-For` entry as client identity
    /// Only enable behind a trusted reverse proxy
    /// Default: false
    #[serde(default)]
    pub trust_forwarded_for: bool,
    /// Maximum accepted request body size in bytes
    /// Default: 100000
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            allowed_origins: default_allowed_origins(),
            rate_limit_per_min: default_rate_limit_per_min(),
            trust_forwarded_for: false,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Diagnostic (debug) log configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DiagnosticsConfig {
    /// Append gateway events to the day-bucketed diagnostic log
    /// Default: false
    #[serde(default)]
    pub debug: bool,
    /// Directory holding `heyhi-YYYY-MM-DD.log` files, created on demand
    /// Default: "heyhi-logs"
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { debug: false, log_dir: default_log_dir() }
    }
}

fn default_allowed_origins() -> String {
    "https://onlymatt.ca,https://www.onlymatt.ca".to_string()
}

fn default_rate_limit_per_min() -> u32 {
    120
}

fn default_max_body_bytes() -> usize {
    100_000
}

fn default_log_dir() -> String {
    "heyhi-logs".to_string()
}
