//! Two-slot room pairing exactly one match session
//!
//! A room owns references to at most two connections: slot 1 is the host
//! (the creator, who moves first in a fresh game), slot 2 the joiner. The
//! room relays events between its occupants and applies score settlement
//! through the account store. It has no turn state of its own; whose move
//! it is follows from the alternating move relay.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::protocol::{RoomSummary, ServerReply};
use crate::server::connection::ClientConnection;
use crate::store::AccountStore;
use crate::{ConnectionId, RoomId};

#[derive(Default)]
struct Slots {
    host: Option<Arc<ClientConnection>>,
    guest: Option<Arc<ClientConnection>>,
}

/// Ephemeral pairing of at most two connections.
pub struct Room {
    id: RoomId,
    /// Empty string means no password gate
    password: String,
    slots: Mutex<Slots>,
    /// Settlement latch: set once per game, re-armed by start-game, so a
    /// racing second win/lose/draw report cannot double-apply counters
    settled: AtomicBool,
}

impl Room {
    pub fn new(id: RoomId, password: String, host: Arc<ClientConnection>) -> Self {
        debug!("Room {} created by connection {}", id, host.id());
        Self {
            id,
            password,
            slots: Mutex::new(Slots {
                host: Some(host),
                guest: None,
            }),
            settled: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }

    /// An open room accepts any password; a gated room requires equality.
    pub fn check_password(&self, candidate: &str) -> bool {
        self.password.is_empty() || self.password == candidate
    }

    /// Seat a second occupant. Fails when slot 2 is already populated.
    pub fn add_occupant(&self, connection: Arc<ClientConnection>) -> bool {
        let mut slots = self.lock();
        if slots.guest.is_some() {
            return false;
        }
        slots.guest = Some(connection);
        true
    }

    pub fn is_full(&self) -> bool {
        self.lock().guest.is_some()
    }

    pub fn occupant_count(&self) -> u8 {
        if self.is_full() {
            2
        } else {
            1
        }
    }

    pub fn host(&self) -> Option<Arc<ClientConnection>> {
        self.lock().host.clone()
    }

    pub fn guest(&self) -> Option<Arc<ClientConnection>> {
        self.lock().guest.clone()
    }

    /// Clear whichever slot matches. The caller decides whether the emptied
    /// room should be discarded from the registry.
    pub fn remove_occupant(&self, id: ConnectionId) {
        let mut slots = self.lock();
        if slots.host.as_ref().is_some_and(|c| c.id() == id) {
            slots.host = None;
        } else if slots.guest.as_ref().is_some_and(|c| c.id() == id) {
            slots.guest = None;
        }
    }

    /// The other occupant, or absent when the room has one occupant or the
    /// id matches neither slot.
    pub fn opponent_of(&self, id: ConnectionId) -> Option<Arc<ClientConnection>> {
        let slots = self.lock();
        if slots.host.as_ref().is_some_and(|c| c.id() == id) {
            slots.guest.clone()
        } else if slots.guest.as_ref().is_some_and(|c| c.id() == id) {
            slots.host.clone()
        } else {
            None
        }
    }

    /// Write to both occupants; one occupant's failure never blocks the
    /// other (queued writes cannot fail synchronously).
    pub fn broadcast(&self, reply: &ServerReply) {
        let (host, guest) = {
            let slots = self.lock();
            (slots.host.clone(), slots.guest.clone())
        };
        if let Some(host) = host {
            host.write(reply);
        }
        if let Some(guest) = guest {
            guest.write(reply);
        }
    }

    /// Flip both occupants' accounts to playing.
    pub fn mark_playing(&self, store: &dyn AccountStore) {
        for id in self.occupant_account_ids() {
            if let Err(e) = store.set_playing(id) {
                warn!("Room {}: failed to mark account {} playing: {}", self.id, id, e);
            }
        }
    }

    /// Flip both occupants' accounts back to not playing.
    pub fn mark_not_playing(&self, store: &dyn AccountStore) {
        for id in self.occupant_account_ids() {
            if let Err(e) = store.set_not_playing(id) {
                warn!(
                    "Room {}: failed to mark account {} not playing: {}",
                    self.id, id, e
                );
            }
        }
    }

    /// Re-arm the settlement latch for a fresh game.
    pub fn arm_settlement(&self) {
        self.settled.store(false, Ordering::SeqCst);
    }

    /// Apply score settlement exactly once per game: games-played for both
    /// occupants, a win for the winner's account or draws for both when
    /// `winner` is absent, then both flipped to not playing.
    ///
    /// Returns false when this game is already settled; the caller must
    /// then drop the event entirely.
    pub fn record_game_completion(
        &self,
        store: &dyn AccountStore,
        winner: Option<ConnectionId>,
    ) -> bool {
        if self.settled.swap(true, Ordering::SeqCst) {
            debug!("Room {}: duplicate settlement dropped", self.id);
            return false;
        }

        let (host, guest) = {
            let slots = self.lock();
            (slots.host.clone(), slots.guest.clone())
        };

        for conn in [&host, &guest].into_iter().flatten() {
            if let Some(account) = conn.account() {
                if let Err(e) = store.add_game(account.id) {
                    warn!("Room {}: failed to count game for {}: {}", self.id, account.id, e);
                }
                match winner {
                    Some(winner_id) if winner_id == conn.id() => {
                        if let Err(e) = store.add_win(account.id) {
                            warn!(
                                "Room {}: failed to count win for {}: {}",
                                self.id, account.id, e
                            );
                        }
                    }
                    Some(_) => {}
                    None => {
                        if let Err(e) = store.add_draw(account.id) {
                            warn!(
                                "Room {}: failed to count draw for {}: {}",
                                self.id, account.id, e
                            );
                        }
                    }
                }
            }
        }

        self.mark_not_playing(store);
        true
    }

    /// Snapshot for room-listing replies; absent while the host slot is
    /// empty or the host has no resolved account.
    pub fn summary(&self) -> Option<RoomSummary> {
        let host = self.host()?;
        let account = host.account()?;
        Some(RoomSummary {
            id: self.id,
            occupants: self.occupant_count(),
            host_nickname: account.nickname,
            has_password: self.has_password(),
        })
    }

    fn occupant_account_ids(&self) -> Vec<crate::AccountId> {
        let slots = self.lock();
        [&slots.host, &slots.guest]
            .into_iter()
            .flatten()
            .filter_map(|c| c.account().map(|a| a.id))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slots> {
        self.slots.lock().expect("room slots lock poisoned")
    }
}

impl std::fmt::Debug for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room")
            .field("id", &self.id)
            .field("occupants", &self.occupant_count())
            .field("has_password", &self.has_password())
            .finish()
    }
}
