use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use prometheus::Registry;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::metrics_handler::{handle_metrics, live_check_response};
use crate::error::Result;

type RespBody = BoxBody<Bytes, hyper::Error>;

/// Bind the observability port and serve it until `shutdown` resolves
///
/// - `/metrics` - Prometheus metrics
/// - `/live` - Liveness check
pub async fn start_observability_server(
    port: u16,
    registry: Registry,
    shutdown: impl Future<Output = ()> + Send,
) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(?addr, "Observability server started");
    serve_observability(listener, registry, shutdown).await
}

/// Serve observability requests on an already bound listener
pub async fn serve_observability(
    listener: TcpListener,
    registry: Registry,
    shutdown: impl Future<Output = ()> + Send,
) -> Result<()> {
    let registry = Arc::new(registry);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "Observability server: accept error");
                        continue;
                    }
                };

                let registry = registry.clone();
                tokio::spawn(async move {
                    let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let registry = registry.clone();
                        async move { Ok::<_, hyper::Error>(route(req.uri().path(), &registry)) }
                    });

                    let builder = ConnBuilder::new(TokioExecutor::new());
                    if let Err(e) = builder.serve_connection(TokioIo::new(stream), svc).await {
                        warn!(?peer, error = %e, "Observability server: serve_connection error");
                    }
                });
            }
        }
    }

    info!("Observability server stopped");
    Ok(())
}

fn route(path: &str, registry: &Registry) -> Response<RespBody> {
    let result = match path {
        "/metrics" => handle_metrics(registry),
        "/live" => live_check_response(),
        _ => return plain(StatusCode::NOT_FOUND, "Not Found"),
    };
    result.unwrap_or_else(|e| {
        warn!(error = %e, path, "Observability server: handler failed");
        plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    })
}

fn plain(status: StatusCode, text: &'static str) -> Response<RespBody> {
    let body = Full::new(Bytes::from_static(text.as_bytes()))
        .map_err(|never| match never {})
        .boxed();
    let mut resp = Response::new(body);
    *resp.status_mut() = status;
    resp
}
