mod client_pool;
mod forwarder;

pub use client_pool::ClientPool;
pub use forwarder::{ForwardResult, HttpForwarder, UpstreamForwarder};
