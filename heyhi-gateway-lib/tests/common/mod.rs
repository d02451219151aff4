//! Shared helpers for gateway integration tests
#![allow(dead_code)]

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use heyhi_gateway_lib::config::{Config, RouteTimeouts, StaticConfig};
use heyhi_gateway_lib::{ForwardResult, GatewayRequest, RequestGateway, UpstreamForwarder};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub const API_KEY: &str = "k3y-for-tests-0123456789";
pub const ALLOWED_ORIGIN: &str = "https://onlymatt.ca";

pub fn peer() -> SocketAddr {
    SocketAddr::from(([203, 0, 113, 7], 40000))
}

/// Defaults plus a configured API key
pub fn test_config() -> Config {
    let mut cfg = Config::with_listen(SocketAddr::from(([127, 0, 0, 1], 0)));
    cfg.access.api_key = API_KEY.to_string();
    cfg
}

/// One call seen by [`StubForwarder`]
#[derive(Debug, Clone)]
pub struct ForwardCall {
    pub url: String,
    pub payload: Value,
    pub timeouts: RouteTimeouts,
}

/// Forwarder that records calls and answers with a fixed result
#[derive(Clone)]
pub struct StubForwarder {
    calls: Arc<Mutex<Vec<ForwardCall>>>,
    reply: Arc<Mutex<ForwardResult>>,
}

impl StubForwarder {
    pub fn replying(reply: ForwardResult) -> Self {
        Self { calls: Arc::new(Mutex::new(Vec::new())), reply: Arc::new(Mutex::new(reply)) }
    }

    pub fn ok_json(status: u16, body: &str) -> Self {
        Self::replying(ForwardResult::response(status, body.to_string()))
    }

    pub fn calls(&self) -> Vec<ForwardCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl UpstreamForwarder for StubForwarder {
    async fn forward(&self, url: &str, payload: &Value, timeouts: RouteTimeouts) -> ForwardResult {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(ForwardCall {
            url: url.to_string(),
            payload: payload.clone(),
            timeouts,
        });
        self.reply.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

pub fn gateway(cfg: &Config, forwarder: StubForwarder) -> RequestGateway<StubForwarder> {
    RequestGateway::new(Arc::new(StaticConfig::from_config(cfg)), forwarder)
        .with_base_path(&cfg.base_path)
}

pub fn request(method: Method, path: &str, body: &str) -> GatewayRequest {
    GatewayRequest::new(method, path, HeaderMap::new(), peer(), Bytes::from(body.to_string()))
}

pub fn with_header(mut req: GatewayRequest, name: &'static str, value: &str) -> GatewayRequest {
    let value = HeaderValue::from_str(value)
        .unwrap_or_else(|e| panic!("invalid header value {value:?}: {e}"));
    req.headers.insert(name, value);
    req
}

pub fn authed(req: GatewayRequest) -> GatewayRequest {
    with_header(req, "x-heyhi-key", API_KEY)
}

pub fn body_json(resp: &Response<Bytes>) -> TestResult<Value> {
    Ok(serde_json::from_slice(resp.body())?)
}

/// Stub upstream server; `handler` maps the request body to `(status, body)`
pub struct StubUpstream {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicUsize>,
    task: tokio::task::JoinHandle<()>,
}

impl StubUpstream {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for StubUpstream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn spawn_upstream<H>(handler: H) -> TestResult<StubUpstream>
where
    H: Fn(&str, Bytes) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let hits = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(handler);

    let task_hits = Arc::clone(&hits);
    let task = tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                continue;
            };
            let handler = Arc::clone(&handler);
            let hits = Arc::clone(&task_hits);
            tokio::spawn(async move {
                let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                    let handler = Arc::clone(&handler);
                    let hits = Arc::clone(&hits);
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        let path = req.uri().path().to_string();
                        let body = req.into_body().collect().await?.to_bytes();
                        let (status, reply) = handler(&path, body);
                        let mut resp = hyper::Response::new(Full::new(Bytes::from(reply)));
                        *resp.status_mut() = http::StatusCode::from_u16(status)
                            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
                        Ok::<_, hyper::Error>(resp)
                    }
                });
                let _ = ConnBuilder::new(TokioExecutor::new())
                    .serve_connection(TokioIo::new(stream), svc)
                    .await;
            });
        }
    });

    Ok(StubUpstream { addr, hits, task })
}

/// A local port with nothing listening on it
pub async fn closed_port() -> TestResult<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}
