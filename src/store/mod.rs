//! Account store seam
//!
//! The server reaches persisted player state only through the [`AccountStore`]
//! trait: a narrow CRUD-plus-status-flags interface. Each call is one atomic
//! round trip; sequences of calls are not globally atomic across connections
//! (two near-simultaneous logins for the same account can both briefly pass
//! the online check — a documented limitation of the protocol, not fixed
//! here). Store failures fail closed: the dispatcher answers negatively or
//! not at all, and never mutates in-memory session state on a failed call.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::protocol::FriendEntry;
use crate::{Account, AccountId};

/// An account together with its live status flags.
///
/// The flags are session state, not part of the nine-field wire layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountStatus {
    pub account: Account,
    pub online: bool,
    pub playing: bool,
}

/// CRUD and status-flag operations over persisted player records.
pub trait AccountStore: Send + Sync {
    /// Look up an account by credentials. Equality comparison on the stored
    /// opaque credential; `None` means unknown username/password pair.
    fn verify(&self, username: &str, password: &str) -> Result<Option<AccountStatus>>;

    /// Create a new account. Returns `None` when the username is taken.
    fn create(
        &self,
        username: &str,
        password: &str,
        nickname: &str,
        avatar: &str,
    ) -> Result<Option<Account>>;

    /// Check whether a username already exists.
    fn username_taken(&self, username: &str) -> Result<bool>;

    /// Check whether an account is on the ban list.
    fn is_banned(&self, id: AccountId) -> Result<bool>;

    /// Flip the online flag on.
    fn set_online(&self, id: AccountId) -> Result<()>;

    /// Flip the online flag off; also clears the playing flag.
    fn set_offline(&self, id: AccountId) -> Result<()>;

    /// Flip the playing flag on.
    fn set_playing(&self, id: AccountId) -> Result<()>;

    /// Flip the playing flag off.
    fn set_not_playing(&self, id: AccountId) -> Result<()>;

    /// Increment the games-played counter.
    fn add_game(&self, id: AccountId) -> Result<()>;

    /// Increment the win counter.
    fn add_win(&self, id: AccountId) -> Result<()>;

    /// Increment the draw counter.
    fn add_draw(&self, id: AccountId) -> Result<()>;

    /// All accounts ordered by wins descending, rank = position (1-based).
    fn rank_charts(&self) -> Result<Vec<Account>>;

    /// Friend list for an account, with live status flags.
    fn friends_of(&self, id: AccountId) -> Result<Vec<FriendEntry>>;

    /// Check whether two accounts are friends.
    fn are_friends(&self, a: AccountId, b: AccountId) -> Result<bool>;
}
