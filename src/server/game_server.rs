//! TCP accept loop
//!
//! Owns the listener, the shared registry, and the account store. Each
//! accepted socket gets its own connection id, outbox channel, and spawned
//! [`ConnectionHandler`] task.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::{CaroError, Result};
use crate::server::connection::ClientConnection;
use crate::server::handler::ConnectionHandler;
use crate::server::registry::Registry;
use crate::store::AccountStore;
use crate::ServerConfig;

pub struct GameServer {
    config: ServerConfig,
    registry: Arc<Registry>,
    store: Arc<dyn AccountStore>,
    listener: Option<TcpListener>,
    next_conn_id: AtomicU64,
}

impl GameServer {
    pub fn new(config: ServerConfig, store: Arc<dyn AccountStore>) -> Self {
        Self {
            config,
            registry: Arc::new(Registry::new()),
            store,
            listener: None,
            next_conn_id: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn store(&self) -> Arc<dyn AccountStore> {
        self.store.clone()
    }

    /// Bind the listener and report the bound address. Useful ahead of
    /// [`run`](Self::run) when the configured port is 0.
    pub async fn bind(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        let addr = listener.local_addr()?;
        info!("Listening on {}", addr);
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Accept connections until the task is aborted.
    pub async fn run(mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind().await?;
        }
        let listener = self
            .listener
            .take()
            .ok_or_else(|| CaroError::internal("listener missing after bind"))?;

        loop {
            let (stream, addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    continue;
                }
            };

            if self.registry.connection_count() >= self.config.max_connections {
                warn!(
                    "Connection limit {} reached, dropping {}",
                    self.config.max_connections, addr
                );
                continue;
            }

            let id = self.next_conn_id.fetch_add(1, Ordering::SeqCst);
            let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
            let conn = Arc::new(ClientConnection::new(id, addr, outbox_tx));
            self.registry.register(conn.clone());
            info!("Connection {} accepted from {}", id, addr);

            let handler = ConnectionHandler::new(
                conn,
                self.registry.clone(),
                self.store.clone(),
                self.config.max_line_length,
            );
            tokio::spawn(handler.run(stream, outbox_rx));
        }
    }
}
