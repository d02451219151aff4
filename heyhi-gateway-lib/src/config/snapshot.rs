use std::fmt;

use super::upstream::RouteTimeouts;
use super::Config;

/// Lowest accepted per-minute rate limit; smaller configured values are raised to it
pub const MIN_RATE_LIMIT_PER_MIN: u32 = 10;

/// Immutable view of the settings one request is handled with
///
/// A request fetches exactly one snapshot and hands it to every stage, so a
/// concurrent reload never mixes old and new values within a request.
#[derive(Clone, PartialEq)]
pub struct ConfigSnapshot {
    /// Upstream base URL without trailing slash
    pub upstream_base_url: String,
    /// Shared secret; empty when authentication is not configured
    pub api_key: String,
    pub allowed_origins: Vec<String>,
    /// Per-minute limit, never below [`MIN_RATE_LIMIT_PER_MIN`]
    pub rate_limit_per_min: u32,
    pub debug: bool,
    pub chat_timeouts: RouteTimeouts,
    pub tools_run_timeouts: RouteTimeouts,
    pub max_body_bytes: usize,
    pub trust_forwarded_for: bool,
}

impl ConfigSnapshot {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            upstream_base_url: normalize_base_url(&cfg.upstream.base_url),
            api_key: cfg.access.api_key.clone(),
            allowed_origins: parse_origins(&cfg.access.allowed_origins),
            rate_limit_per_min: cfg.access.rate_limit_per_min.max(MIN_RATE_LIMIT_PER_MIN),
            debug: cfg.diagnostics.debug,
            chat_timeouts: cfg.upstream.chat,
            tools_run_timeouts: cfg.upstream.tools_run,
            max_body_bytes: cfg.access.max_body_bytes,
            trust_forwarded_for: cfg.access.trust_forwarded_for,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Join an upstream path such as `assistant/chat` onto the base URL
    pub fn upstream_url(&self, path: &str) -> String {
        format!("{}/{}", self.upstream_base_url, path.trim_start_matches('/'))
    }
}

impl fmt::Debug for ConfigSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSnapshot")
            .field("upstream_base_url", &self.upstream_base_url)
            .field("has_api_key", &self.has_api_key())
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit_per_min", &self.rate_limit_per_min)
            .field("debug", &self.debug)
            .field("chat_timeouts", &self.chat_timeouts)
            .field("tools_run_timeouts", &self.tools_run_timeouts)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .finish()
    }
}

/// Split a comma-separated origin list, trimming entries and dropping empties
pub fn parse_origins(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_drops_empty() {
        let origins = parse_origins(" https://a.example , ,https://b.example,,");
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://core.example/"), "https://core.example");
        assert_eq!(normalize_base_url("https://core.example//"), "https://core.example");
        assert_eq!(normalize_base_url("https://core.example"), "https://core.example");
    }

    #[test]
    fn test_rate_limit_floor_and_debug_redaction() {
        let mut cfg = Config::with_listen(([127, 0, 0, 1], 0).into());
        cfg.access.rate_limit_per_min = 3;
        cfg.access.api_key = "s3cret-value".to_string();
        let snap = ConfigSnapshot::from_config(&cfg);

        assert_eq!(snap.rate_limit_per_min, MIN_RATE_LIMIT_PER_MIN);
        assert!(snap.has_api_key());
        assert!(!format!("{snap:?}").contains("s3cret-value"));
        assert_eq!(
            snap.upstream_url("/assistant/chat"),
            "https://hey-hi-assistant-core-onlymatt.onrender.com/assistant/chat"
        );
    }
}
