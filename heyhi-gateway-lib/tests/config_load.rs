use std::io::Write;
use tempfile::NamedTempFile;

use heyhi_gateway_lib::config::{
    load_from_path, validate_config, ConfigSnapshot, CustomHeader, RouteTimeouts,
};

mod common;
use common::{test_config, TestResult};

fn write_config(toml: &str) -> TestResult<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(toml.as_bytes())?;
    file.flush()?;
    Ok(file)
}

#[test]
fn loads_minimal_config_with_defaults() -> TestResult {
    let file = write_config(r#"listen = "127.0.0.1:8080""#)?;
    let cfg = load_from_path(file.path())?;

    assert_eq!(cfg.listen.to_string(), "127.0.0.1:8080");
    assert_eq!(cfg.base_path, "");
    assert_eq!(cfg.upstream.base_url, "https://hey-hi-assistant-core-onlymatt.onrender.com");
    assert_eq!(cfg.upstream.chat, RouteTimeouts { connect_secs: 10, total_secs: 70 });
    assert_eq!(cfg.upstream.tools_run, RouteTimeouts { connect_secs: 15, total_secs: 70 });
    assert_eq!(cfg.access.api_key, "");
    assert_eq!(cfg.access.rate_limit_per_min, 120);
    assert_eq!(cfg.access.max_body_bytes, 100_000);
    assert!(!cfg.access.trust_forwarded_for);
    assert!(!cfg.diagnostics.debug);
    assert_eq!(cfg.diagnostics.log_dir, "heyhi-logs");
    assert_eq!(cfg.timeout.shutdown_secs, 30);
    assert!(cfg.telemetry.metrics_port.is_none());
    assert!(cfg.users.is_empty());

    let snap = ConfigSnapshot::from_config(&cfg);
    assert_eq!(snap.allowed_origins, vec!["https://onlymatt.ca", "https://www.onlymatt.ca"]);
    assert!(!snap.has_api_key());
    Ok(())
}

#[test]
fn loads_full_config() -> TestResult {
    let file = write_config(
        r#"
listen = "0.0.0.0:9000"
base_path = "/heyhi/v1"

[upstream]
base_url = "http://core.internal:8000/"
chat = { connect_secs = 2, total_secs = 20 }
tools_run = { connect_secs = 3, total_secs = 30 }

[access]
api_key = "secret"
allowed_origins = " https://a.example ,, https://b.example "
rate_limit_per_min = 4
trust_forwarded_for = true
max_body_bytes = 2048

[diagnostics]
debug = true
log_dir = "/tmp/heyhi"

[telemetry]
metrics_port = 9091

[security_headers]
custom = [{ name = "X-Content-Type-Options", value = "nosniff" }]

[[users]]
id = 7
name = "Matt"
email = "matt@example.com"
roles = ["administrator"]
session = "sess-7"
"#,
    )?;
    let cfg = load_from_path(file.path())?;

    assert_eq!(cfg.base_path, "/heyhi/v1");
    assert_eq!(cfg.telemetry.metrics_port, Some(9091));
    assert_eq!(cfg.security_headers.custom.len(), 1);
    assert_eq!(cfg.users.len(), 1);
    assert_eq!(cfg.users[0].roles, vec!["administrator"]);

    let snap = ConfigSnapshot::from_config(&cfg);
    assert_eq!(snap.upstream_base_url, "http://core.internal:8000");
    assert_eq!(snap.upstream_url("assistant/chat"), "http://core.internal:8000/assistant/chat");
    assert_eq!(snap.allowed_origins, vec!["https://a.example", "https://b.example"]);
    assert_eq!(snap.rate_limit_per_min, 10, "configured 4 is raised to the floor");
    assert_eq!(snap.chat_timeouts.total_secs, 20);
    assert_eq!(snap.tools_run_timeouts.connect_secs, 3);
    assert_eq!(snap.max_body_bytes, 2048);
    assert!(snap.debug);
    assert!(snap.trust_forwarded_for);
    Ok(())
}

#[test]
fn rejects_malformed_toml() -> TestResult {
    let file = write_config("listen = ")?;
    assert!(load_from_path(file.path()).is_err());
    Ok(())
}

#[test]
fn rejects_missing_file() {
    assert!(load_from_path("/definitely/not/here/heyhi.toml").is_err());
}

#[test]
fn validation_errors() {
    let mut cfg = test_config();
    cfg.upstream.base_url = "core.internal/assistant".to_string();
    assert!(validate_config(&cfg).is_err(), "relative upstream URL");

    let mut cfg = test_config();
    cfg.upstream.base_url = "ftp://core.internal".to_string();
    assert!(validate_config(&cfg).is_err(), "non-http scheme");

    let mut cfg = test_config();
    cfg.upstream.chat.total_secs = 0;
    assert!(validate_config(&cfg).is_err(), "zero timeout");

    let mut cfg = test_config();
    cfg.base_path = "heyhi".to_string();
    assert!(validate_config(&cfg).is_err(), "base path without leading slash");

    let mut cfg = test_config();
    cfg.base_path = "/heyhi/".to_string();
    assert!(validate_config(&cfg).is_err(), "base path with trailing slash");

    let mut cfg = test_config();
    cfg.content.catalog_path = Some("/definitely/not/here.json".to_string());
    assert!(validate_config(&cfg).is_err(), "missing catalog");

    assert!(validate_config(&test_config()).is_ok());
}

#[test]
fn connection_timeout_must_outlast_upstream_calls() -> TestResult {
    let mut cfg = test_config();
    cfg.timeout.connection_handling_secs = 30;
    assert!(validate_config(&cfg).is_err(), "70s chat call outlives a 30s connection");

    cfg.timeout.connection_handling_secs = 70;
    assert!(validate_config(&cfg).is_err(), "equal to the longest upstream timeout");

    cfg.upstream.tools_run.total_secs = 90;
    cfg.timeout.connection_handling_secs = 80;
    assert!(validate_config(&cfg).is_err(), "tools_run is the longest");

    cfg.timeout.connection_handling_secs = 91;
    assert!(validate_config(&cfg).is_ok());

    let file = write_config(
        r#"
listen = "127.0.0.1:0"

[timeout]
connection_handling_secs = 30
"#,
    )?;
    assert!(load_from_path(file.path()).is_err());
    Ok(())
}

#[test]
fn rejects_invalid_custom_headers() {
    let mut cfg = test_config();
    cfg.security_headers.custom.push(CustomHeader {
        name: "X Frame".to_string(),
        value: "DENY".to_string(),
    });
    assert!(validate_config(&cfg).is_err(), "space in header name");

    let mut cfg = test_config();
    cfg.security_headers.custom.push(CustomHeader {
        name: "X-Note".to_string(),
        value: "line\nbreak".to_string(),
    });
    assert!(validate_config(&cfg).is_err(), "newline in header value");
}

#[test]
fn rejects_duplicate_users() -> TestResult {
    let file = write_config(
        r#"
listen = "127.0.0.1:0"

[[users]]
id = 1
name = "A"
session = "same"

[[users]]
id = 2
name = "B"
session = "same"
"#,
    )?;
    assert!(load_from_path(file.path()).is_err());
    Ok(())
}
