mod access;
mod directory;
mod headers;
mod loader;
mod provider;
mod snapshot;
mod telemetry;
mod timeout;
mod types;
mod upstream;

pub use access::{AccessConfig, DiagnosticsConfig};
pub use directory::{ContentConfig, UserConfig};
pub use headers::{CustomHeader, SecurityHeaders};
pub use loader::{load_from_path, validate_config};
pub use provider::{watch_config_file, ConfigProvider, ConfigWatcher, ReloadableConfig, StaticConfig};
pub use snapshot::{normalize_base_url, parse_origins, ConfigSnapshot, MIN_RATE_LIMIT_PER_MIN};
pub use telemetry::{LoggingConfig, TelemetryConfig};
pub use timeout::{KeepAliveConfig, TimeoutConfig};
pub use types::Config;
pub use upstream::{RouteTimeouts, UpstreamConfig};
