pub mod metrics;
pub mod metrics_handler;
pub mod server;
pub mod tracing;

pub use metrics::{init_metrics, Metrics};
pub use metrics_handler::{handle_metrics, live_check_response};
pub use server::{serve_observability, start_observability_server};
pub use tracing::init_tracing;
