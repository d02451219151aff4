use ahash::AHashMap;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, warn};

/// Shared reqwest clients for upstream calls
///
/// reqwest fixes the connect timeout per client, while routes pick their own
/// connect timeout. The pool keeps one client per distinct connect timeout so
/// each route still reuses pooled connections.
pub struct ClientPool {
    clients: RwLock<AHashMap<Duration, reqwest::Client>>,
    user_agent: String,
}

impl Default for ClientPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientPool {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(AHashMap::new()),
            user_agent: format!("heyhi-gateway/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Client whose connect phase is bounded by `connect_timeout`
    pub fn client_for(&self, connect_timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
        match self.clients.read() {
            Ok(clients) => {
                if let Some(client) = clients.get(&connect_timeout) {
                    return Ok(client.clone());
                }
            }
            Err(_) => warn!("client pool lock poisoned"),
        }

        let client = self.build_client(connect_timeout)?;
        match self.clients.write() {
            Ok(mut clients) => {
                let pooled = clients.entry(connect_timeout).or_insert_with(|| {
                    debug!(?connect_timeout, "created upstream client");
                    client
                });
                Ok(pooled.clone())
            }
            Err(_) => {
                warn!("client pool lock poisoned, using unpooled client");
                Ok(client)
            }
        }
    }

    fn build_client(&self, connect_timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(self.user_agent.clone())
            .build()
    }

    pub fn len(&self) -> usize {
        self.clients.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
