use arc_swap::ArcSwap;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::snapshot::ConfigSnapshot;
use super::{load_from_path, Config};
use crate::error::{GatewayError, Result};

/// Source of the configuration snapshot a request is handled with
pub trait ConfigProvider: Send + Sync {
    fn snapshot(&self) -> Arc<ConfigSnapshot>;
}

/// Provider that always hands out the same snapshot
#[derive(Debug, Clone)]
pub struct StaticConfig {
    snapshot: Arc<ConfigSnapshot>,
}

impl StaticConfig {
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self { snapshot: Arc::new(snapshot) }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(ConfigSnapshot::from_config(cfg))
    }
}

impl ConfigProvider for StaticConfig {
    fn snapshot(&self) -> Arc<ConfigSnapshot> {
        Arc::clone(&self.snapshot)
    }
}

/// Provider whose snapshot can be replaced at runtime
///
/// Readers never block: each request loads the current `Arc` and keeps it
/// for its whole lifetime, writers swap in a new one.
pub struct ReloadableConfig {
    current: ArcSwap<ConfigSnapshot>,
}

impl ReloadableConfig {
    pub fn new(cfg: &Config) -> Self {
        Self { current: ArcSwap::from_pointee(ConfigSnapshot::from_config(cfg)) }
    }

    /// Replace the snapshot served to subsequent requests
    pub fn store(&self, cfg: &Config) {
        self.current.store(Arc::new(ConfigSnapshot::from_config(cfg)));
    }

    /// Load, validate and store the configuration at `path`
    ///
    /// On error the previous snapshot stays in place.
    pub fn reload_from(&self, path: &Path) -> Result<()> {
        let cfg = load_from_path(path)?;
        self.store(&cfg);
        Ok(())
    }
}

impl ConfigProvider for ReloadableConfig {
    fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }
}

/// Keeps the file watcher and the reload task alive
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Reload `provider` whenever the file at `path` changes
///
/// Only the per-request settings are hot-reloaded; `listen`, `base_path`,
/// telemetry and the content catalog need a restart.
pub fn watch_config_file(path: &Path, provider: Arc<ReloadableConfig>) -> Result<ConfigWatcher> {
    let path = path.to_path_buf();
    let file_name = path.file_name().map(|n| n.to_os_string());
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (tx, mut rx) = mpsc::channel::<()>(16);
    // Editors often replace the file, so watch the directory and filter by name.
    let mut watcher =
        notify::recommended_watcher(move |res: std::result::Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        return;
                    }
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config {
                        let _ = tx.try_send(());
                    }
                }
                Err(e) => warn!(error = %e, "config watch error"),
            }
        })
        .map_err(|e| GatewayError::Watch(e.to_string()))?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| GatewayError::Watch(e.to_string()))?;

    let task = tokio::spawn(async move {
        while rx.recv().await.is_some() {
            // Coalesce the burst of events a single save produces.
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            while rx.try_recv().is_ok() {}

            match provider.reload_from(&path) {
                Ok(()) => info!(path = %path.display(), "configuration reloaded"),
                Err(e) => warn!(path = %path.display(), error = %e, "configuration reload rejected"),
            }
        }
        debug!("config watcher stopped");
    });

    Ok(ConfigWatcher { _watcher: watcher, task })
}
