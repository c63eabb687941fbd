//! Shared per-connection state
//!
//! One [`ClientConnection`] exists per accepted network connection. It is
//! exclusively owned by its receive loop and referenced (not owned) by the
//! registry and by the room it has joined. All outbound traffic goes through
//! the connection's outbox channel, drained by a single writer task, so
//! framed writes never interleave and per-connection order is preserved.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::debug;

use crate::protocol::ServerReply;
use crate::server::room::Room;
use crate::{Account, ConnectionId};

/// Handle to one live client connection.
pub struct ClientConnection {
    id: ConnectionId,
    addr: SocketAddr,
    /// Outbox sender; taken on close so the writer task drains and exits
    outbox: Mutex<Option<mpsc::UnboundedSender<String>>>,
    /// Resolved account, absent until successful login
    account: Mutex<Option<Account>>,
    /// Room membership, absent until create/join
    room: Mutex<Option<Arc<Room>>>,
    /// Teardown latch
    closed: AtomicBool,
}

impl ClientConnection {
    pub fn new(
        id: ConnectionId,
        addr: SocketAddr,
        outbox: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            id,
            addr,
            outbox: Mutex::new(Some(outbox)),
            account: Mutex::new(None),
            room: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Process-unique identifier assigned at accept time.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Peer network address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Queue a reply for transmission.
    ///
    /// Delivery failure means the peer is gone; the connection's own
    /// receive loop notices and runs teardown, so failures are swallowed
    /// here rather than surfaced to the caller.
    pub fn write(&self, reply: &ServerReply) {
        self.write_line(reply.encode());
    }

    /// Queue a raw line for transmission.
    pub fn write_line(&self, line: String) {
        let outbox = self.outbox.lock().expect("outbox lock poisoned");
        if let Some(sender) = outbox.as_ref() {
            if sender.send(line).is_err() {
                debug!("Connection {} outbox closed, dropping write", self.id);
            }
        }
    }

    /// Close the outbox; the writer task drains pending lines and exits,
    /// dropping the socket write half.
    pub fn close_outbox(&self) {
        self.outbox.lock().expect("outbox lock poisoned").take();
    }

    /// Resolved account, if logged in.
    pub fn account(&self) -> Option<Account> {
        self.account.lock().expect("account lock poisoned").clone()
    }

    pub fn set_account(&self, account: Account) {
        *self.account.lock().expect("account lock poisoned") = Some(account);
    }

    pub fn take_account(&self) -> Option<Account> {
        self.account.lock().expect("account lock poisoned").take()
    }

    /// Current room, if any.
    pub fn room(&self) -> Option<Arc<Room>> {
        self.room.lock().expect("room lock poisoned").clone()
    }

    pub fn set_room(&self, room: Arc<Room>) {
        *self.room.lock().expect("room lock poisoned") = Some(room);
    }

    pub fn take_room(&self) -> Option<Arc<Room>> {
        self.room.lock().expect("room lock poisoned").take()
    }

    /// Latch the closed flag. Returns true on the first call only, so
    /// teardown runs exactly once.
    pub fn begin_close(&self) -> bool {
        !self.closed.swap(true, Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .field("closed", &self.is_closed())
            .finish()
    }
}
