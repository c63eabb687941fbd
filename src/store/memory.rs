//! In-memory account store with optional JSON snapshot persistence
//!
//! The default [`AccountStore`] implementation: player records, the friend
//! graph, and the ban list live in a single mutex-guarded map. A snapshot can
//! be loaded from and saved to a JSON file so the standalone binary keeps
//! accounts across restarts; status flags are session state and reset on load.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CaroError, Result};
use crate::protocol::FriendEntry;
use crate::store::{AccountStatus, AccountStore};
use crate::{Account, AccountId};

/// Persisted shape of one player record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Record {
    id: AccountId,
    username: String,
    password: String,
    nickname: String,
    avatar: String,
    games: u32,
    wins: u32,
    draws: u32,
    #[serde(skip)]
    online: bool,
    #[serde(skip)]
    playing: bool,
}

impl Record {
    fn to_account(&self, rank: u32) -> Account {
        Account {
            id: self.id,
            username: self.username.clone(),
            password: self.password.clone(),
            nickname: self.nickname.clone(),
            avatar: self.avatar.clone(),
            games: self.games,
            wins: self.wins,
            draws: self.draws,
            rank,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Inner {
    accounts: HashMap<AccountId, Record>,
    /// Friend pairs stored with the smaller id first
    friends: Vec<(AccountId, AccountId)>,
    banned: Vec<AccountId>,
    next_id: AccountId,
}

impl Inner {
    /// Rank = number of accounts with strictly more wins, plus one.
    fn rank_of(&self, id: AccountId) -> u32 {
        let wins = self.accounts.get(&id).map(|r| r.wins).unwrap_or(0);
        self.accounts.values().filter(|r| r.wins > wins).count() as u32 + 1
    }

    fn record_mut(&mut self, id: AccountId) -> Result<&mut Record> {
        self.accounts
            .get_mut(&id)
            .ok_or_else(|| CaroError::store(format!("no account with id {}", id)))
    }
}

/// Mutex-guarded in-memory account store.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
        }
    }

    /// Load a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let inner: Inner = serde_json::from_slice(&data)?;
        info!(
            "Loaded {} accounts from {}",
            inner.accounts.len(),
            path.as_ref().display()
        );
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    /// Save a snapshot to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let inner = self.lock();
        let data = serde_json::to_vec_pretty(&*inner)?;
        std::fs::write(path.as_ref(), data)?;
        Ok(())
    }

    /// Record a friend relationship between two accounts.
    pub fn add_friend(&self, a: AccountId, b: AccountId) {
        let pair = (a.min(b), a.max(b));
        let mut inner = self.lock();
        if !inner.friends.contains(&pair) {
            inner.friends.push(pair);
        }
    }

    /// Put an account on the ban list.
    pub fn ban(&self, id: AccountId) {
        let mut inner = self.lock();
        if !inner.banned.contains(&id) {
            inner.banned.push(id);
        }
    }

    /// Look up an account by username, with status flags.
    pub fn get(&self, username: &str) -> Option<AccountStatus> {
        let inner = self.lock();
        let record = inner.accounts.values().find(|r| r.username == username)?;
        Some(AccountStatus {
            account: record.to_account(inner.rank_of(record.id)),
            online: record.online,
            playing: record.playing,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("account store lock poisoned")
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountStore for MemoryStore {
    fn verify(&self, username: &str, password: &str) -> Result<Option<AccountStatus>> {
        let inner = self.lock();
        let record = inner
            .accounts
            .values()
            .find(|r| r.username == username && r.password == password);
        Ok(record.map(|r| AccountStatus {
            account: r.to_account(inner.rank_of(r.id)),
            online: r.online,
            playing: r.playing,
        }))
    }

    fn create(
        &self,
        username: &str,
        password: &str,
        nickname: &str,
        avatar: &str,
    ) -> Result<Option<Account>> {
        let mut inner = self.lock();
        if inner.accounts.values().any(|r| r.username == username) {
            return Ok(None);
        }
        let id = inner.next_id;
        inner.next_id += 1;
        let record = Record {
            id,
            username: username.to_string(),
            password: password.to_string(),
            nickname: nickname.to_string(),
            avatar: avatar.to_string(),
            games: 0,
            wins: 0,
            draws: 0,
            online: false,
            playing: false,
        };
        inner.accounts.insert(id, record);
        let rank = inner.rank_of(id);
        Ok(Some(inner.accounts[&id].to_account(rank)))
    }

    fn username_taken(&self, username: &str) -> Result<bool> {
        Ok(self.lock().accounts.values().any(|r| r.username == username))
    }

    fn is_banned(&self, id: AccountId) -> Result<bool> {
        Ok(self.lock().banned.contains(&id))
    }

    fn set_online(&self, id: AccountId) -> Result<()> {
        self.lock().record_mut(id)?.online = true;
        Ok(())
    }

    fn set_offline(&self, id: AccountId) -> Result<()> {
        let mut inner = self.lock();
        let record = inner.record_mut(id)?;
        record.online = false;
        record.playing = false;
        Ok(())
    }

    fn set_playing(&self, id: AccountId) -> Result<()> {
        self.lock().record_mut(id)?.playing = true;
        Ok(())
    }

    fn set_not_playing(&self, id: AccountId) -> Result<()> {
        self.lock().record_mut(id)?.playing = false;
        Ok(())
    }

    fn add_game(&self, id: AccountId) -> Result<()> {
        self.lock().record_mut(id)?.games += 1;
        Ok(())
    }

    fn add_win(&self, id: AccountId) -> Result<()> {
        self.lock().record_mut(id)?.wins += 1;
        Ok(())
    }

    fn add_draw(&self, id: AccountId) -> Result<()> {
        self.lock().record_mut(id)?.draws += 1;
        Ok(())
    }

    fn rank_charts(&self) -> Result<Vec<Account>> {
        let inner = self.lock();
        let mut records: Vec<&Record> = inner.accounts.values().collect();
        records.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.id.cmp(&b.id)));
        Ok(records
            .iter()
            .enumerate()
            .map(|(i, r)| r.to_account(i as u32 + 1))
            .collect())
    }

    fn friends_of(&self, id: AccountId) -> Result<Vec<FriendEntry>> {
        let inner = self.lock();
        let mut entries = Vec::new();
        for &(a, b) in &inner.friends {
            let friend_id = match (a == id, b == id) {
                (true, _) => b,
                (_, true) => a,
                _ => continue,
            };
            if let Some(record) = inner.accounts.get(&friend_id) {
                entries.push(FriendEntry {
                    id: record.id,
                    nickname: record.nickname.clone(),
                    online: record.online,
                    playing: record.playing,
                });
            }
        }
        Ok(entries)
    }

    fn are_friends(&self, a: AccountId, b: AccountId) -> Result<bool> {
        let pair = (a.min(b), a.max(b));
        Ok(self.lock().friends.contains(&pair))
    }
}
