//! Line-protocol game server for two-player Caro matches
//!
//! This library provides the session/room coordination server for a networked
//! Caro (five-in-a-row) game: it authenticates players, pairs them into
//! two-slot rooms, and relays moves and score events between exactly two
//! connected peers over a comma-delimited, newline-terminated text protocol.

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod store;

pub use client::{GameClient, GameClientConfig};
pub use error::{CaroError, Result};
pub use server::GameServer;
pub use store::{AccountStore, MemoryStore};

use serde::{Deserialize, Serialize};

/// Process-unique connection identifier, assigned at accept time.
pub type ConnectionId = u64;

/// Persisted account identifier.
pub type AccountId = u64;

/// Room identifier, allocated by the registry starting at 100.
pub type RoomId = u64;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Server listen address
    pub bind_addr: String,
    /// Maximum number of concurrent connections
    pub max_connections: usize,
    /// Maximum length of a single protocol line in bytes
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:7777".to_string(),
            max_connections: 100,
            max_line_length: 8 * 1024,
        }
    }
}

/// A persisted player identity, distinct from any single connection.
///
/// The nine public fields travel on the wire in `login-success` and
/// `return-get-rank-charts` as a comma-separated group, in declaration order.
/// `rank` is computed (players with strictly more wins, plus one), never
/// stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub password: String,
    pub nickname: String,
    pub avatar: String,
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
    pub rank: u32,
}

impl Account {
    /// Serialize to the nine-field wire layout.
    pub fn to_wire(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}",
            self.id,
            self.username,
            self.password,
            self.nickname,
            self.avatar,
            self.games,
            self.wins,
            self.draws,
            self.rank
        )
    }

    /// Parse from a slice of comma-split fields.
    ///
    /// A missing or malformed field sequence is a decode failure (`None`),
    /// never a panic.
    pub fn from_fields(fields: &[&str]) -> Option<Self> {
        if fields.len() < 9 {
            return None;
        }
        Some(Self {
            id: fields[0].parse().ok()?,
            username: fields[1].to_string(),
            password: fields[2].to_string(),
            nickname: fields[3].to_string(),
            avatar: fields[4].to_string(),
            games: fields[5].parse().ok()?,
            wins: fields[6].parse().ok()?,
            draws: fields[7].parse().ok()?,
            rank: fields[8].parse().ok()?,
        })
    }

    /// Parse from a full wire line fragment (nine comma-separated fields).
    pub fn from_wire(data: &str) -> Option<Self> {
        let fields: Vec<&str> = data.split(',').collect();
        Self::from_fields(&fields)
    }
}
