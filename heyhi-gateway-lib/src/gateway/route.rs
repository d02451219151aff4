use http::Method;

use crate::security::AuthPolicy;

/// Endpoints served under the base path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Health,
    Diag,
    Chat,
    Tools,
    ToolsRun,
}

impl Route {
    pub const ALL: [Route; 5] =
        [Route::Health, Route::Diag, Route::Chat, Route::Tools, Route::ToolsRun];

    /// Path relative to the base path
    pub fn path(self) -> &'static str {
        match self {
            Route::Health => "/health",
            Route::Diag => "/diag",
            Route::Chat => "/chat",
            Route::Tools => "/tools",
            Route::ToolsRun => "/tools/run",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Route::Health | Route::Diag => Method::GET,
            Route::Chat | Route::Tools | Route::ToolsRun => Method::POST,
        }
    }

    /// Label used in metrics and as prefix of diagnostic event names
    pub fn name(self) -> &'static str {
        match self {
            Route::Health => "health",
            Route::Diag => "diag",
            Route::Chat => "chat",
            Route::Tools => "tools",
            Route::ToolsRun => "tools_run",
        }
    }

    pub fn auth_policy(self) -> AuthPolicy {
        match self {
            Route::Health | Route::Diag => AuthPolicy::Public,
            Route::Chat => AuthPolicy::IfConfigured,
            Route::Tools | Route::ToolsRun => AuthPolicy::Required,
        }
    }

    pub fn is_rate_limited(self) -> bool {
        matches!(self, Route::Chat | Route::Tools | Route::ToolsRun)
    }
}

/// What an inbound method and path map to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Preflight,
    Endpoint(Route),
    MethodNotAllowed(Route),
    NotFound,
}

/// Map `method` + `path` onto a route mounted under `base_path`
///
/// `OPTIONS` is answered as a preflight on any path. One trailing slash is
/// tolerated.
pub fn resolve(base_path: &str, method: &Method, path: &str) -> Resolution {
    if method == Method::OPTIONS {
        return Resolution::Preflight;
    }
    let Some(relative) = path.strip_prefix(base_path) else {
        return Resolution::NotFound;
    };
    let relative = match relative.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => relative,
    };
    match Route::ALL.into_iter().find(|r| r.path() == relative) {
        Some(route) if route.method() == method => Resolution::Endpoint(route),
        Some(route) => Resolution::MethodNotAllowed(route),
        None => Resolution::NotFound,
    }
}
