//! Per-connection read and write loops
//!
//! Each accepted socket gets one [`ConnectionHandler`]. The read half feeds
//! a line codec and dispatches complete lines; the write half drains the
//! connection's outbox so replies and relayed events leave in queue order.
//! Either side ending tears the connection down exactly once.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::protocol::{frame_line, LineCodec, ServerReply};
use crate::server::connection::ClientConnection;
use crate::server::dispatcher::Dispatcher;
use crate::server::registry::Registry;
use crate::store::AccountStore;

const READ_BUFFER_SIZE: usize = 4096;

pub struct ConnectionHandler {
    conn: Arc<ClientConnection>,
    registry: Arc<Registry>,
    store: Arc<dyn AccountStore>,
    max_line_length: usize,
}

impl ConnectionHandler {
    pub fn new(
        conn: Arc<ClientConnection>,
        registry: Arc<Registry>,
        store: Arc<dyn AccountStore>,
        max_line_length: usize,
    ) -> Self {
        Self {
            conn,
            registry,
            store,
            max_line_length,
        }
    }

    /// Drive the connection until the peer disconnects or the outbox is
    /// closed, then run teardown.
    pub async fn run(self, stream: TcpStream, outbox_rx: mpsc::UnboundedReceiver<String>) {
        let (read_half, write_half) = stream.into_split();

        self.conn.write(&ServerReply::ServerSendId(self.conn.id()));

        let writer = tokio::spawn(write_loop(write_half, outbox_rx));
        let receive = self.receive_loop(read_half);

        tokio::select! {
            _ = receive => {
                debug!("Connection {}: read side finished", self.conn.id());
            }
            _ = writer => {
                debug!("Connection {}: write side finished", self.conn.id());
            }
        }

        self.teardown();
    }

    async fn receive_loop(&self, mut read_half: tokio::net::tcp::OwnedReadHalf) {
        let dispatcher = Dispatcher::new(
            self.conn.clone(),
            self.registry.clone(),
            self.store.clone(),
        );
        let mut codec = LineCodec::with_max_length(self.max_line_length);
        let mut buf = [0u8; READ_BUFFER_SIZE];

        loop {
            match read_half.read(&mut buf).await {
                Ok(0) => {
                    debug!("Connection {}: peer closed", self.conn.id());
                    return;
                }
                Ok(n) => {
                    codec.feed(&buf[..n]);
                    loop {
                        match codec.decode_next() {
                            Ok(Some(line)) => dispatcher.dispatch(&line),
                            Ok(None) => break,
                            Err(e) => {
                                warn!(
                                    "Connection {}: protocol error, disconnecting: {}",
                                    self.conn.id(),
                                    e
                                );
                                return;
                            }
                        }
                    }
                }
                Err(e) => {
                    debug!("Connection {}: read error: {}", self.conn.id(), e);
                    return;
                }
            }
        }
    }

    /// Release every shared resource this connection holds. Safe to reach
    /// from both loop exits; only the first call does the work.
    fn teardown(&self) {
        if !self.conn.begin_close() {
            return;
        }
        info!("Connection {} closing", self.conn.id());

        if let Some(account) = self.conn.take_account() {
            if let Err(e) = self.store.set_offline(account.id) {
                warn!("Failed to mark account {} offline: {}", account.id, e);
            }
            self.registry.broadcast_except(
                self.conn.id(),
                &ServerReply::ChatServer(format!("{} is offline", account.nickname)),
            );
        }

        if let Some(room) = self.conn.take_room() {
            if let Some(opponent) = room.opponent_of(self.conn.id()) {
                // The room is destroyed, so the opponent is detached too
                opponent.take_room();
                opponent.write(&ServerReply::CompetitorLeft);
            }
            room.remove_occupant(self.conn.id());
            self.registry.remove_room(room.id());
        }

        self.conn.close_outbox();
        self.registry.deregister(self.conn.id());
    }
}

/// Drain queued lines onto the socket. Ends when the outbox closes or a
/// write fails; each line is framed and written whole, preserving queue
/// order.
async fn write_loop(
    mut write_half: tokio::net::tcp::OwnedWriteHalf,
    mut outbox_rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(line) = outbox_rx.recv().await {
        if let Err(e) = write_half.write_all(&frame_line(&line)).await {
            debug!("Write failed, dropping connection: {}", e);
            return;
        }
    }
    let _ = write_half.shutdown().await;
}
