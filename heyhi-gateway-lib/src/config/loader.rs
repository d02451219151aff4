use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{GatewayError, Result};

pub fn load_from_path<P: AsRef<Path>>(p: P) -> Result<Config> {
    let txt = fs::read_to_string(p)
        .map_err(|e| GatewayError::Config(format!("Failed to read config file: {e}")))?;
    let cfg: Config = toml::from_str(&txt)
        .map_err(|e| GatewayError::Config(format!("Failed to parse config: {e}")))?;

    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> Result<()> {
    let base = cfg.upstream.base_url.trim();
    let uri = base
        .parse::<http::Uri>()
        .map_err(|e| GatewayError::Config(format!("Invalid upstream.base_url '{base}': {e}")))?;
    match uri.scheme_str() {
        Some("http") | Some("https") if uri.host().is_some() => {}
        _ => {
            return Err(GatewayError::Config(format!(
                "upstream.base_url must be an absolute http(s) URL: {base}"
            )))
        }
    }

    for (name, t) in [("chat", &cfg.upstream.chat), ("tools_run", &cfg.upstream.tools_run)] {
        if t.connect_secs == 0 || t.total_secs == 0 {
            return Err(GatewayError::Config(format!(
                "upstream.{name} timeouts must be > 0"
            )));
        }
    }

    let longest_upstream = cfg.upstream.chat.total_secs.max(cfg.upstream.tools_run.total_secs);
    if cfg.timeout.connection_handling_secs <= longest_upstream {
        return Err(GatewayError::Config(format!(
            "timeout.connection_handling_secs ({}) must exceed the longest upstream total timeout ({longest_upstream}s)",
            cfg.timeout.connection_handling_secs
        )));
    }

    for header in &cfg.security_headers.custom {
        if http::HeaderName::from_bytes(header.name.as_bytes()).is_err()
            || http::HeaderValue::from_str(&header.value).is_err()
        {
            return Err(GatewayError::Config(format!(
                "Invalid security_headers.custom entry: {}",
                header.name
            )));
        }
    }

    if !cfg.base_path.is_empty()
        && (!cfg.base_path.starts_with('/') || cfg.base_path.ends_with('/'))
    {
        return Err(GatewayError::Config(format!(
            "base_path must start with '/' and must not end with '/': {}",
            cfg.base_path
        )));
    }

    if cfg.access.max_body_bytes == 0 {
        return Err(GatewayError::Config("access.max_body_bytes must be > 0".into()));
    }

    let mut ids = HashSet::new();
    let mut sessions = HashSet::new();
    for user in &cfg.users {
        if !ids.insert(user.id) {
            return Err(GatewayError::Config(format!("Duplicate user id: {}", user.id)));
        }
        if user.session.trim().is_empty() {
            return Err(GatewayError::Config(format!("User {} has an empty session", user.id)));
        }
        if !sessions.insert(user.session.as_str()) {
            return Err(GatewayError::Config(format!(
                "Duplicate session token for user {}",
                user.id
            )));
        }
    }

    if let Some(path) = &cfg.content.catalog_path {
        if !Path::new(path).exists() {
            return Err(GatewayError::Config(format!("Content catalog not found: {path}")));
        }
    }

    Ok(())
}
