use std::sync::Arc;
use std::time::Duration;

use heyhi_gateway_lib::config::{watch_config_file, ConfigProvider, ReloadableConfig};
use heyhi_gateway_lib::load_from_path;

mod common;
use common::TestResult;

const INITIAL: &str = r#"
listen = "127.0.0.1:0"

[upstream]
base_url = "http://127.0.0.1:9000"

[access]
api_key = "first-key-0123456789"
rate_limit_per_min = 30
"#;

const UPDATED: &str = r#"
listen = "127.0.0.1:0"

[upstream]
base_url = "http://127.0.0.1:9001/"

[access]
api_key = "second-key-0123456789"
rate_limit_per_min = 120
"#;

#[test]
fn reload_from_replaces_snapshot() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("heyhi.toml");
    std::fs::write(&path, INITIAL)?;

    let provider = ReloadableConfig::new(&load_from_path(&path)?);
    let before = provider.snapshot();
    assert_eq!(before.rate_limit_per_min, 30);

    std::fs::write(&path, UPDATED)?;
    provider.reload_from(&path)?;

    let after = provider.snapshot();
    assert_eq!(after.rate_limit_per_min, 120);
    assert_eq!(after.upstream_base_url, "http://127.0.0.1:9001");
    // A snapshot taken before the reload is unaffected.
    assert_eq!(before.rate_limit_per_min, 30);
    Ok(())
}

#[test]
fn broken_reload_keeps_previous_snapshot() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("heyhi.toml");
    std::fs::write(&path, INITIAL)?;

    let provider = ReloadableConfig::new(&load_from_path(&path)?);
    std::fs::write(&path, "listen = [not toml")?;

    assert!(provider.reload_from(&path).is_err());
    assert_eq!(provider.snapshot().rate_limit_per_min, 30);
    Ok(())
}

#[tokio::test]
async fn watcher_picks_up_file_changes() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("heyhi.toml");
    std::fs::write(&path, INITIAL)?;

    let provider = Arc::new(ReloadableConfig::new(&load_from_path(&path)?));
    let _watcher = watch_config_file(&path, provider.clone())?;

    tokio::time::sleep(Duration::from_millis(100)).await;
    tokio::fs::write(&path, UPDATED).await?;

    let mut reloaded = false;
    for _ in 0..50 {
        if provider.snapshot().rate_limit_per_min == 120 {
            reloaded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(reloaded, "config change was not picked up");
    Ok(())
}
