use thiserror::Error;

/// Errors that can occur while configuring or running the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Content catalog error: {0}")]
    Catalog(String),

    #[error("Config watcher error: {0}")]
    Watch(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
