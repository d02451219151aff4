use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info, warn};

use super::handler::RequestGateway;
use crate::config::{watch_config_file, Config, ConfigProvider, ReloadableConfig, TimeoutConfig};
use crate::error::{GatewayError, Result};
use crate::telemetry::{init_metrics, start_observability_server, Metrics};
use crate::upstream::{HttpForwarder, UpstreamForwarder};

type RespBody = BoxBody<Bytes, hyper::Error>;

/// Decrements the active connection count when the connection task ends
struct ConnectionGuard {
    counter: Arc<AtomicUsize>,
    metrics: Option<Arc<Metrics>>,
}

impl ConnectionGuard {
    fn new(counter: Arc<AtomicUsize>, metrics: Option<Arc<Metrics>>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        if let Some(m) = &metrics {
            m.connections_total.add(1, &[]);
            m.connections_active.add(1, &[]);
        }
        Self { counter, metrics }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::Relaxed);
        if let Some(m) = &self.metrics {
            m.connections_active.add(-1, &[]);
        }
    }
}

/// Register SIGTERM/SIGINT handlers; the returned future resolves on the first signal
pub fn shutdown_signal() -> Result<impl Future<Output = ()> + Send> {
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).map_err(|e| {
        GatewayError::Io(std::io::Error::other(format!("Failed to setup SIGTERM handler: {e}")))
    })?;
    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).map_err(|e| {
        GatewayError::Io(std::io::Error::other(format!("Failed to setup SIGINT handler: {e}")))
    })?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
            _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
        }
    })
}

/// Run the gateway described by `config` until SIGTERM/SIGINT
///
/// With `config_path` set, edits to that file are applied to subsequent
/// requests without a restart.
pub async fn run(config: Arc<Config>, config_path: Option<PathBuf>) -> Result<()> {
    let provider = Arc::new(ReloadableConfig::new(&config));
    let _watcher = match &config_path {
        Some(path) => Some(watch_config_file(path, Arc::clone(&provider))?),
        None => None,
    };

    let (metrics, registry) = match config.telemetry.metrics_port {
        Some(_) => {
            let (metrics, registry) = init_metrics().map_err(|e| {
                GatewayError::Config(format!("Failed to initialize metrics: {e}"))
            })?;
            (Some(metrics), Some(registry))
        }
        None => (None, None),
    };

    let gateway = RequestGateway::from_config(
        &config,
        Arc::clone(&provider) as Arc<dyn ConfigProvider>,
        HttpForwarder::new(),
    )?
    .with_metrics(metrics.clone());
    let gateway = Arc::new(gateway);

    let listener = TcpListener::bind(config.listen).await?;
    let signal = shutdown_signal()?;
    let (stop_tx, stop_rx) = watch::channel(false);

    if let (Some(port), Some(registry)) = (config.telemetry.metrics_port, registry) {
        let mut stop_rx = stop_rx.clone();
        tokio::spawn(async move {
            let stop = async move {
                let _ = stop_rx.wait_for(|stopped| *stopped).await;
            };
            if let Err(e) = start_observability_server(port, registry, stop).await {
                warn!(error = %e, "Observability server failed");
            }
        });
    }

    let shutdown = async move {
        signal.await;
        let _ = stop_tx.send(true);
    };
    serve(listener, gateway, &config.timeout, metrics, shutdown).await
}

/// Accept connections on `listener` until `shutdown` resolves, then drain
///
/// Expired rate-limit buckets are swept once per window while serving.
pub async fn serve<F: UpstreamForwarder>(
    listener: TcpListener,
    gateway: Arc<RequestGateway<F>>,
    timeouts: &TimeoutConfig,
    metrics: Option<Arc<Metrics>>,
    shutdown: impl Future<Output = ()> + Send,
) -> Result<()> {
    let mut builder = ConnBuilder::new(TokioExecutor::new());
    builder.http1().keep_alive(timeouts.keep_alive.enabled);
    let connection_timeout = Duration::from_secs(timeouts.connection_handling_secs);
    let active_connections = Arc::new(AtomicUsize::new(0));

    let limiter = Arc::clone(gateway.limiter());
    let sweeper = tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        interval.tick().await;
        loop {
            interval.tick().await;
            let purged = limiter.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = limiter.len(), "purged expired rate buckets");
            }
        }
    });

    if let Ok(addr) = listener.local_addr() {
        info!(?addr, "heyhi gateway listening (h1/h2)");
    }

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "accept error");
                        continue;
                    }
                };

                let guard = ConnectionGuard::new(Arc::clone(&active_connections), metrics.clone());
                let builder = builder.clone();
                let gateway = Arc::clone(&gateway);

                tokio::spawn(async move {
                    let _guard = guard;
                    let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let gateway = Arc::clone(&gateway);
                        async move {
                            let resp = gateway.serve(req, peer).await;
                            Ok::<_, hyper::Error>(into_boxed(resp))
                        }
                    });

                    let conn = builder.serve_connection(TokioIo::new(stream), svc);
                    match tokio::time::timeout(connection_timeout, conn).await {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => warn!(?peer, error = %e, "serve_connection error"),
                        Err(_) => warn!(?peer, "connection handling timeout"),
                    }
                });
            }
        }
    }

    sweeper.abort();
    drain(&active_connections, Duration::from_secs(timeouts.shutdown_secs)).await;
    info!("Gateway server stopped");
    Ok(())
}

async fn drain(active_connections: &AtomicUsize, shutdown_timeout: Duration) {
    info!("Waiting for active connections to finish (timeout: {}s)", shutdown_timeout.as_secs());
    let start = Instant::now();
    loop {
        let active = active_connections.load(Ordering::Relaxed);
        if active == 0 {
            info!("All connections closed, shutdown complete");
            return;
        }
        if start.elapsed() >= shutdown_timeout {
            warn!(active_connections = active, "Shutdown timeout reached, {} connections still active", active);
            return;
        }
        sleep(Duration::from_millis(100)).await;
    }
}

fn into_boxed(resp: Response<Bytes>) -> Response<RespBody> {
    resp.map(|body| Full::new(body).map_err(|never| match never {}).boxed())
}
