use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::context::GatewayRequest;
use super::rejection::{
    Rejection, BODY_NOT_OBJECT, BODY_UNREADABLE, MESSAGES_NOT_EMPTY, MESSAGES_REQUIRED,
};
use super::response::{json_response, passthrough, rejection_response};
use super::route::{resolve, Resolution, Route};
use super::tools::ToolAction;
use crate::config::{Config, ConfigProvider, ConfigSnapshot, RouteTimeouts, SecurityHeaders};
use crate::diagnostics::DiagnosticLogger;
use crate::directory::{
    ContentCatalog, ContentRepository, IdentityProvider, SessionDirectory,
};
use crate::error::Result;
use crate::security::{
    apply_security_headers, authenticate, client_identity, cors, provided_key, AuthPolicy,
    RateLimitResult, RateLimiter,
};
use crate::telemetry::metrics::values;
use crate::telemetry::Metrics;
use crate::upstream::{ForwardResult, UpstreamForwarder};

const CHAT_UPSTREAM_PATH: &str = "assistant/chat";
const TOOLS_RUN_UPSTREAM_PATH: &str = "assistant/tools/run";

/// Per-request pipeline: rate limit, auth, validation, then the route itself
///
/// Every response, including rejections, is CORS-decorated against the
/// request's snapshot and recorded by the diagnostic logger.
pub struct RequestGateway<F> {
    config: Arc<dyn ConfigProvider>,
    limiter: Arc<RateLimiter>,
    forwarder: F,
    content: Arc<dyn ContentRepository>,
    identity: Arc<dyn IdentityProvider>,
    diagnostics: DiagnosticLogger,
    metrics: Option<Arc<Metrics>>,
    security_headers: SecurityHeaders,
    base_path: String,
}

impl<F: UpstreamForwarder> RequestGateway<F> {
    /// Gateway at the root path with no content, no known users and logs in `heyhi-logs`
    pub fn new(config: Arc<dyn ConfigProvider>, forwarder: F) -> Self {
        Self {
            config,
            limiter: Arc::new(RateLimiter::new()),
            forwarder,
            content: Arc::new(ContentCatalog::empty()),
            identity: Arc::new(SessionDirectory::default()),
            diagnostics: DiagnosticLogger::new("heyhi-logs"),
            metrics: None,
            security_headers: SecurityHeaders::default(),
            base_path: String::new(),
        }
    }

    /// Wire the collaborators declared in `cfg`
    ///
    /// Per-request settings still come from `provider`, so they follow reloads.
    pub fn from_config(cfg: &Config, provider: Arc<dyn ConfigProvider>, forwarder: F) -> Result<Self> {
        let content = match &cfg.content.catalog_path {
            Some(path) => ContentCatalog::load(Path::new(path))?,
            None => ContentCatalog::empty(),
        };
        Ok(Self::new(provider, forwarder)
            .with_content(Arc::new(content))
            .with_identity(Arc::new(SessionDirectory::new(&cfg.users)))
            .with_diagnostics(DiagnosticLogger::new(&cfg.diagnostics.log_dir))
            .with_security_headers(cfg.security_headers.clone())
            .with_base_path(&cfg.base_path))
    }

    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_content(mut self, content: Arc<dyn ContentRepository>) -> Self {
        self.content = content;
        self
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: DiagnosticLogger) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_metrics(mut self, metrics: Option<Arc<Metrics>>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_security_headers(mut self, headers: SecurityHeaders) -> Self {
        self.security_headers = headers;
        self
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = base_path.trim_end_matches('/').to_string();
        self
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }

    /// Read the body of an HTTP request, capped at the snapshot's size limit, and handle it
    pub async fn serve<B>(&self, req: Request<B>, peer: SocketAddr) -> Response<Bytes>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let snapshot = self.config.snapshot();
        let (parts, body) = req.into_parts();
        let (mut oversized, mut truncated) = (false, false);
        let bytes = match Limited::new(body, snapshot.max_body_bytes).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                oversized = true;
                Bytes::new()
            }
            Err(e) => {
                debug!(?peer, error = %e, "failed to read request body");
                truncated = true;
                Bytes::new()
            }
        };

        let mut request =
            GatewayRequest::new(parts.method, parts.uri.path(), parts.headers, peer, bytes);
        if oversized {
            request = request.into_oversized();
        } else if truncated {
            request = request.into_truncated();
        }
        self.handle_with(&snapshot, request).await
    }

    /// Handle a fully read request against the current snapshot
    pub async fn handle(&self, req: GatewayRequest) -> Response<Bytes> {
        let snapshot = self.config.snapshot();
        self.handle_with(&snapshot, req).await
    }

    async fn handle_with(&self, snap: &ConfigSnapshot, req: GatewayRequest) -> Response<Bytes> {
        let start = Instant::now();
        let resolution = resolve(&self.base_path, &req.method, &req.path);
        let client = client_identity(req.peer, &req.headers, snap.trust_forwarded_for);

        let mut resp = match resolution {
            Resolution::Preflight => {
                let resp = json_response(StatusCode::OK, &json!({"ok": true}));
                self.record_response(snap, &req, "preflight", resp.status()).await;
                resp
            }
            Resolution::NotFound => {
                let rejection = Rejection::NotFound(req.path.clone());
                self.reject(snap, None, &client, rejection).await
            }
            Resolution::MethodNotAllowed(route) => {
                let rejection = Rejection::MethodNotAllowed {
                    method: req.method.to_string(),
                    allow: route.method(),
                };
                self.reject(snap, Some(route), &client, rejection).await
            }
            Resolution::Endpoint(route) => match self.run(snap, &req, route, &client).await {
                Ok(resp) => resp,
                Err(rejection) => self.reject(snap, Some(route), &client, rejection).await,
            },
        };

        cors::decorate(req.origin(), &snap.allowed_origins, &mut resp);
        apply_security_headers(&mut resp, &self.security_headers);

        if let Some(m) = &self.metrics {
            let route = match resolution {
                Resolution::Endpoint(r) | Resolution::MethodNotAllowed(r) => r.name(),
                Resolution::Preflight => "preflight",
                Resolution::NotFound => "unknown",
            };
            m.record_request(
                req.method.as_str(),
                route,
                resp.status().as_u16(),
                start.elapsed().as_secs_f64(),
            );
        }
        resp
    }

    async fn run(
        &self,
        snap: &ConfigSnapshot,
        req: &GatewayRequest,
        route: Route,
        client: &str,
    ) -> std::result::Result<Response<Bytes>, Rejection> {
        self.admit(snap, req, route, client)?;
        match route {
            Route::Health => {
                let resp = self.health();
                self.record_response(snap, req, route.name(), resp.status()).await;
                Ok(resp)
            }
            Route::Diag => {
                let resp = self.diag(snap);
                self.record_response(snap, req, route.name(), resp.status()).await;
                Ok(resp)
            }
            Route::Chat => self.chat(snap, req).await,
            Route::Tools => self.tools(snap, req).await,
            Route::ToolsRun => self.tools_run(snap, req).await,
        }
    }

    /// Rate limit, then authentication, then body size and integrity
    fn admit(
        &self,
        snap: &ConfigSnapshot,
        req: &GatewayRequest,
        route: Route,
        client: &str,
    ) -> std::result::Result<(), Rejection> {
        if route.is_rate_limited() {
            let bucket_route = format!("{}{}", self.base_path, route.path());
            match self.limiter.check(client, &bucket_route, snap.rate_limit_per_min) {
                RateLimitResult::Limited { limit, reset_after } => {
                    debug!(client, route = route.name(), limit, "rate limit exceeded");
                    if let Some(m) = &self.metrics {
                        m.record_rate_limit_rejected(route.name());
                    }
                    return Err(Rejection::RateLimited { limit, reset_after });
                }
                RateLimitResult::Allowed { .. } => {
                    if let Some(m) = &self.metrics {
                        m.record_rate_limit_allowed(route.name());
                    }
                }
            }
        }

        let policy = route.auth_policy();
        if policy != AuthPolicy::Public {
            let outcome = authenticate(provided_key(&req.headers), &snap.api_key);
            if !policy.admits(outcome) {
                debug!(client, route = route.name(), ?outcome, "authentication failed");
                if let Some(m) = &self.metrics {
                    m.record_auth_failure(route.name());
                }
                return Err(Rejection::Unauthorized);
            }
        }

        if req.oversized {
            return Err(Rejection::PayloadTooLarge { limit: snap.max_body_bytes });
        }
        if req.truncated {
            return Err(Rejection::BadRequest(BODY_UNREADABLE));
        }
        Ok(())
    }

    fn health(&self) -> Response<Bytes> {
        json_response(
            StatusCode::OK,
            &json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}),
        )
    }

    fn diag(&self, snap: &ConfigSnapshot) -> Response<Bytes> {
        json_response(
            StatusCode::OK,
            &json!({
                "status": "ok",
                "core_ai_base": snap.upstream_base_url,
                "has_api_key": snap.has_api_key(),
                "allowed_origins": snap.allowed_origins,
                "rate_limit_per_min": snap.rate_limit_per_min,
                "debug": snap.debug,
            }),
        )
    }

    async fn chat(
        &self,
        snap: &ConfigSnapshot,
        req: &GatewayRequest,
    ) -> std::result::Result<Response<Bytes>, Rejection> {
        let body = req.json_object().ok_or(Rejection::BadRequest(MESSAGES_REQUIRED))?;
        let messages = match body.get("messages") {
            None | Some(Value::Null) => return Err(Rejection::BadRequest(MESSAGES_REQUIRED)),
            Some(Value::Array(messages)) if !messages.is_empty() => messages,
            Some(_) => return Err(Rejection::BadRequest(MESSAGES_NOT_EMPTY)),
        };

        self.diagnostics
            .record(
                snap.debug,
                "chat_request",
                &json!({
                    "message_count": messages.len(),
                    "model": body.get("model").cloned().unwrap_or_else(|| json!("default")),
                    "session_id": body.get("session_id").cloned().unwrap_or(Value::Null),
                }),
            )
            .await;

        let url = snap.upstream_url(CHAT_UPSTREAM_PATH);
        let payload = Value::Object(body.clone());
        let result = self.call_upstream(Route::Chat, &url, &payload, snap.chat_timeouts).await;
        if let Some(error) = result.error {
            return Err(Rejection::UpstreamError(error));
        }

        self.diagnostics
            .record(
                snap.debug,
                "chat_response",
                &json!({"status": result.status, "body_length": result.body.len()}),
            )
            .await;
        Ok(self.relay(Route::Chat, result.status, result.body))
    }

    async fn tools(
        &self,
        snap: &ConfigSnapshot,
        req: &GatewayRequest,
    ) -> std::result::Result<Response<Bytes>, Rejection> {
        let body = req.json_object().ok_or(Rejection::BadRequest(BODY_NOT_OBJECT))?;
        let action_name = body.get("action").and_then(Value::as_str).unwrap_or_default();
        self.diagnostics
            .record(snap.debug, "tools_request", &json!({"action": action_name}))
            .await;

        let action = ToolAction::parse(body)?;
        let caller = match action {
            ToolAction::GetUserInfo => self.identity.current_user(req),
            _ => None,
        };
        let result = action.execute(self.content.as_ref(), caller);

        let resp = json_response(StatusCode::OK, &json!({"action": action.name(), "result": result}));
        self.record_response(snap, req, "tools", resp.status()).await;
        Ok(resp)
    }

    async fn tools_run(
        &self,
        snap: &ConfigSnapshot,
        req: &GatewayRequest,
    ) -> std::result::Result<Response<Bytes>, Rejection> {
        let payload = match &req.json {
            Some(value @ Value::Object(_)) => value.clone(),
            _ => Value::Object(serde_json::Map::new()),
        };

        let url = snap.upstream_url(TOOLS_RUN_UPSTREAM_PATH);
        let result =
            self.call_upstream(Route::ToolsRun, &url, &payload, snap.tools_run_timeouts).await;
        if let Some(error) = result.error {
            return Err(Rejection::UpstreamFail(error));
        }

        self.diagnostics
            .record(
                snap.debug,
                "tools_ok",
                &json!({"status": result.status, "bytes": result.body.len()}),
            )
            .await;
        Ok(self.relay(Route::ToolsRun, result.status, result.body))
    }

    async fn call_upstream(
        &self,
        route: Route,
        url: &str,
        payload: &Value,
        timeouts: RouteTimeouts,
    ) -> ForwardResult {
        let start = Instant::now();
        let result = self.forwarder.forward(url, payload, timeouts).await;
        if let Some(m) = &self.metrics {
            if result.is_transport_error() {
                m.record_upstream_error(route.name(), values::ERROR_TRANSPORT);
            } else {
                m.record_upstream_response(route.name(), result.status, start.elapsed().as_secs_f64());
            }
        }
        result
    }

    fn relay(&self, route: Route, status: u16, body: Bytes) -> Response<Bytes> {
        let (resp, valid) = passthrough(status, body);
        if !valid {
            warn!(route = route.name(), status, "upstream returned a non-JSON body");
            if let Some(m) = &self.metrics {
                m.record_upstream_error(route.name(), values::ERROR_INVALID_RESPONSE);
            }
        }
        resp
    }

    async fn reject(
        &self,
        snap: &ConfigSnapshot,
        route: Option<Route>,
        client: &str,
        rejection: Rejection,
    ) -> Response<Bytes> {
        let prefix = route.map(Route::name).unwrap_or("request");
        let (event, payload) = match &rejection {
            Rejection::RateLimited { .. } => (format!("{prefix}_rate_limit"), json!({"ip": client})),
            Rejection::Unauthorized => (format!("{prefix}_auth_fail"), json!({"ip": client})),
            Rejection::UpstreamError(error) => (
                "chat_upstream_error".to_string(),
                json!({"error": error, "url": snap.upstream_url(CHAT_UPSTREAM_PATH)}),
            ),
            Rejection::UpstreamFail(error) => (
                "tools_error".to_string(),
                json!({"error": error, "status": StatusCode::BAD_GATEWAY.as_u16(), "body": ""}),
            ),
            other => (
                format!("{prefix}_{}", other.code().to_ascii_lowercase()),
                json!({"error": other.code(), "message": other.to_string()}),
            ),
        };
        self.diagnostics.record(snap.debug, &event, &payload).await;
        rejection_response(&rejection)
    }

    async fn record_response(
        &self,
        snap: &ConfigSnapshot,
        req: &GatewayRequest,
        event: &str,
        status: StatusCode,
    ) {
        self.diagnostics
            .record(
                snap.debug,
                &format!("{event}_response"),
                &json!({"method": req.method.as_str(), "path": req.path, "status": status.as_u16()}),
            )
            .await;
    }
}
