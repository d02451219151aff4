#![forbid(unsafe_code)]

use clap::Parser;
use heyhi_gateway_lib::config::load_from_path;
use heyhi_gateway_lib::telemetry::init_tracing;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Hey-Hi assistant gateway")]
struct Cli {
    /// Path to configuration TOML file
    #[arg(short, long, value_name = "FILE", env = "HEYHI_CONFIG", default_value = "heyhi.toml")]
    config: PathBuf,

    /// Reload per-request settings when the configuration file changes
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match load_from_path(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("failed to load configuration from {}: {err}", cli.config.display());
            std::process::exit(1);
        }
    };

    if let Err(err) = init_tracing(&cfg.logging, &cfg.telemetry.otel_log_level) {
        eprintln!("failed to initialize tracing: {err}");
        std::process::exit(1);
    }

    info!(
        listen = ?cfg.listen,
        base_path = %cfg.base_path,
        upstream = %cfg.upstream.base_url,
        users = cfg.users.len(),
        "configuration loaded"
    );

    let watch_path = cli.watch.then(|| cli.config.clone());
    if let Err(err) = heyhi_gateway_lib::run(Arc::new(cfg), watch_path).await {
        error!(%err, "gateway exited with error");
        std::process::exit(1);
    }
}
