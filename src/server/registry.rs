//! Shared registry of live connections and open rooms
//!
//! One mutex guards both tables so every cross-connection operation,
//! room-id allocation included, observes a consistent snapshot. The lock
//! is never held across an await point: broadcasts snapshot the recipient
//! list under the lock and queue writes through each connection's outbox,
//! which never blocks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::protocol::{RoomSummary, ServerReply};
use crate::server::connection::ClientConnection;
use crate::server::room::Room;
use crate::{ConnectionId, RoomId};

const FIRST_ROOM_ID: RoomId = 100;

struct RegistryInner {
    connections: HashMap<ConnectionId, Arc<ClientConnection>>,
    rooms: Vec<Arc<Room>>,
    next_room_id: RoomId,
}

/// Server-wide connection and room tables.
pub struct Registry {
    inner: Mutex<RegistryInner>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                connections: HashMap::new(),
                rooms: Vec::new(),
                next_room_id: FIRST_ROOM_ID,
            }),
        }
    }

    pub fn register(&self, connection: Arc<ClientConnection>) {
        let mut inner = self.lock();
        inner.connections.insert(connection.id(), connection);
    }

    pub fn deregister(&self, id: ConnectionId) {
        let mut inner = self.lock();
        inner.connections.remove(&id);
    }

    pub fn connection_count(&self) -> usize {
        self.lock().connections.len()
    }

    /// Allocate a fresh room id and open the room with its host seated.
    /// Allocation and insertion happen under one lock acquisition, so ids
    /// are unique and strictly increasing.
    pub fn create_room(&self, host: Arc<ClientConnection>, password: String) -> Arc<Room> {
        let mut inner = self.lock();
        let id = inner.next_room_id;
        inner.next_room_id += 1;
        let room = Arc::new(Room::new(id, password, host));
        inner.rooms.push(room.clone());
        info!("Room {} opened ({} rooms total)", id, inner.rooms.len());
        room
    }

    pub fn find_room(&self, id: RoomId) -> Option<Arc<Room>> {
        self.lock().rooms.iter().find(|r| r.id() == id).cloned()
    }

    /// Drop a room from the table. Removing an already-removed id is a
    /// no-op, which keeps concurrent teardown paths simple.
    pub fn remove_room(&self, id: RoomId) {
        let mut inner = self.lock();
        let before = inner.rooms.len();
        inner.rooms.retain(|r| r.id() != id);
        if inner.rooms.len() < before {
            debug!("Room {} removed ({} rooms left)", id, inner.rooms.len());
        }
    }

    /// Queue a reply to every connection except the sender.
    pub fn broadcast_except(&self, sender: ConnectionId, reply: &ServerReply) {
        let recipients: Vec<Arc<ClientConnection>> = {
            let inner = self.lock();
            inner
                .connections
                .values()
                .filter(|c| c.id() != sender)
                .cloned()
                .collect()
        };
        for connection in recipients {
            connection.write(reply);
        }
    }

    /// Summaries of all listable rooms, in creation order. Rooms whose
    /// host slot is empty or unauthenticated are skipped.
    pub fn list_room_summaries(&self) -> Vec<RoomSummary> {
        let rooms: Vec<Arc<Room>> = self.lock().rooms.clone();
        rooms.iter().filter_map(|r| r.summary()).collect()
    }

    /// Close every connection's outbox, which ends each writer task and in
    /// turn each handler. Used for shutdown.
    pub fn close_all(&self) {
        let connections: Vec<Arc<ClientConnection>> = {
            let inner = self.lock();
            inner.connections.values().cloned().collect()
        };
        info!("Closing {} connections", connections.len());
        for connection in connections {
            connection.close_outbox();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegistryInner> {
        self.inner.lock().expect("registry lock poisoned")
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
