//! The request gateway: routing, admission and the HTTP server around it.

mod context;
mod handler;
mod rejection;
mod response;
mod route;
mod server;
mod tools;

pub use context::GatewayRequest;
pub use handler::RequestGateway;
pub use rejection::Rejection;
pub use response::RAW_PREVIEW_BYTES;
pub use route::{resolve, Resolution, Route};
pub use server::{run, serve, shutdown_signal};
pub use tools::{ToolAction, DEFAULT_POSTS_LIMIT, MAX_POSTS_LIMIT, SEARCH_LIMIT};
