//! Line-delimited diagnostic event log.
//!
//! When debug is enabled every terminal gateway response appends one line to
//! `<log_dir>/heyhi-YYYY-MM-DD.log` (UTC day):
//!
//! ```text
//! 2025-03-14T09:26:53+00:00 chat_request {"message_count":2,"model":"default","session_id":null}
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DiagnosticLogger {
    log_dir: PathBuf,
}

impl DiagnosticLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self { log_dir: log_dir.into() }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// File the events of `at` are appended to
    pub fn file_for(&self, at: DateTime<Utc>) -> PathBuf {
        self.log_dir.join(format!("heyhi-{}.log", at.format("%Y-%m-%d")))
    }

    /// Append one event; a no-op unless `enabled`
    ///
    /// Failures never reach the caller.
    pub async fn record(&self, enabled: bool, event: &str, payload: &Value) {
        if !enabled {
            return;
        }
        let now = Utc::now();
        let line = format_line(now, event, payload);
        if let Err(e) = self.append(now, &line).await {
            debug!(event, dir = %self.log_dir.display(), error = %e, "diagnostic log write failed");
        }
    }

    async fn append(&self, now: DateTime<Utc>, line: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.log_dir).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_for(now))
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

/// `<rfc3339> <event> <compact json>\n`, non-ASCII kept as is
pub fn format_line(at: DateTime<Utc>, event: &str, payload: &Value) -> String {
    format!("{} {event} {payload}\n", at.to_rfc3339_opts(SecondsFormat::Secs, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_format_line() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).single();
        let at = at.unwrap_or_else(|| panic!("valid timestamp"));
        let line = format_line(at, "tools_request", &json!({"action": "café"}));
        assert_eq!(line, "2025-03-14T09:26:53+00:00 tools_request {\"action\":\"café\"}\n");
    }

    #[test]
    fn test_file_is_bucketed_by_day() {
        let logger = DiagnosticLogger::new("/var/log/heyhi");
        let at = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).single();
        let at = at.unwrap_or_else(|| panic!("valid timestamp"));
        assert_eq!(logger.file_for(at), PathBuf::from("/var/log/heyhi/heyhi-2025-12-31.log"));
    }
}
