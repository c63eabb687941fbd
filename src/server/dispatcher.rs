//! Per-connection command dispatch
//!
//! Each connection handler parses incoming lines and hands them here. The
//! dispatcher is synchronous: every handler runs to completion without
//! awaiting, queuing outbound traffic through connection outboxes. Lines
//! that fail to parse are ignored, as are commands whose preconditions (a
//! logged-in account, a joined room) do not hold.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::protocol::{ClientCommand, ServerReply};
use crate::server::connection::ClientConnection;
use crate::server::registry::Registry;
use crate::store::AccountStore;
use crate::AccountId;

pub struct Dispatcher {
    conn: Arc<ClientConnection>,
    registry: Arc<Registry>,
    store: Arc<dyn AccountStore>,
}

impl Dispatcher {
    pub fn new(
        conn: Arc<ClientConnection>,
        registry: Arc<Registry>,
        store: Arc<dyn AccountStore>,
    ) -> Self {
        Self {
            conn,
            registry,
            store,
        }
    }

    /// Handle one line from the client.
    pub fn dispatch(&self, line: &str) {
        let Some(command) = ClientCommand::parse(line) else {
            debug!(
                "Connection {}: ignoring unparseable line {:?}",
                self.conn.id(),
                line
            );
            return;
        };

        match command {
            ClientCommand::Verify { username, password } => self.on_verify(&username, &password),
            ClientCommand::Register {
                username,
                password,
                nickname,
                avatar,
            } => self.on_register(&username, &password, &nickname, &avatar),
            ClientCommand::Offline => self.on_offline(),
            ClientCommand::ViewFriendList => self.on_view_friend_list(),
            ClientCommand::GetRankCharts => self.on_get_rank_charts(),
            ClientCommand::CheckFriend { friend_id } => self.on_check_friend(friend_id),
            ClientCommand::GetListRoom => self.on_get_list_room(),
            ClientCommand::CreateRoom { password } => self.on_create_room(password),
            ClientCommand::JoinRoom { room_id, password } => self.on_join_room(room_id, &password),
            ClientCommand::LeaveRoom => self.on_leave_room(),
            ClientCommand::StartGame => self.on_start_game(),
            ClientCommand::UserMove { row, col } => self.on_user_move(row, col),
            ClientCommand::Win => self.on_win(),
            ClientCommand::Lose => self.on_lose(),
            ClientCommand::DrawRequest => self.on_draw_request(),
            ClientCommand::DrawAccept => self.on_draw_accept(),
            ClientCommand::SendMessage { text } => self.on_send_message(text),
        }
    }

    fn on_verify(&self, username: &str, password: &str) {
        let status = match self.store.verify(username, password) {
            Ok(status) => status,
            Err(e) => {
                warn!("Credential lookup failed for {:?}: {}", username, e);
                None
            }
        };
        let Some(status) = status else {
            self.conn.write(&ServerReply::WrongUser {
                username: username.to_string(),
                password: password.to_string(),
            });
            return;
        };

        // The ban verdict outranks the duplicate-login one
        match self.store.is_banned(status.account.id) {
            Ok(true) => {
                self.conn.write(&ServerReply::BannedUser {
                    username: username.to_string(),
                    password: password.to_string(),
                });
                return;
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Ban lookup failed for account {}: {}", status.account.id, e);
                self.conn.write(&ServerReply::WrongUser {
                    username: username.to_string(),
                    password: password.to_string(),
                });
                return;
            }
        }
        if status.online {
            self.conn.write(&ServerReply::DuplicateLogin {
                username: username.to_string(),
                password: password.to_string(),
            });
            return;
        }

        self.complete_login(status.account);
    }

    fn on_register(&self, username: &str, password: &str, nickname: &str, avatar: &str) {
        match self.store.create(username, password, nickname, avatar) {
            Ok(Some(account)) => self.complete_login(account),
            Ok(None) => self.conn.write(&ServerReply::DuplicateUsername),
            Err(e) => {
                warn!("Registration failed for {:?}: {}", username, e);
                self.conn.write(&ServerReply::DuplicateUsername);
            }
        }
    }

    fn complete_login(&self, account: crate::Account) {
        if let Err(e) = self.store.set_online(account.id) {
            warn!("Failed to mark account {} online: {}", account.id, e);
        }
        self.conn.set_account(account.clone());
        self.conn.write(&ServerReply::LoginSuccess(account.clone()));
        self.registry.broadcast_except(
            self.conn.id(),
            &ServerReply::ChatServer(format!("{} is online", account.nickname)),
        );
        debug!(
            "Connection {}: logged in as account {}",
            self.conn.id(),
            account.id
        );
    }

    fn on_offline(&self) {
        let Some(account) = self.conn.take_account() else {
            return;
        };
        if let Err(e) = self.store.set_offline(account.id) {
            warn!("Failed to mark account {} offline: {}", account.id, e);
        }
        self.registry.broadcast_except(
            self.conn.id(),
            &ServerReply::ChatServer(format!("{} is offline", account.nickname)),
        );
    }

    fn on_view_friend_list(&self) {
        let Some(account) = self.conn.account() else {
            return;
        };
        let friends = self.store.friends_of(account.id).unwrap_or_else(|e| {
            warn!("Friend lookup failed for account {}: {}", account.id, e);
            Vec::new()
        });
        self.conn.write(&ServerReply::FriendList(friends));
    }

    fn on_get_rank_charts(&self) {
        let charts = self.store.rank_charts().unwrap_or_else(|e| {
            warn!("Rank chart lookup failed: {}", e);
            Vec::new()
        });
        self.conn.write(&ServerReply::RankCharts(charts));
    }

    fn on_check_friend(&self, friend_id: AccountId) {
        let Some(account) = self.conn.account() else {
            return;
        };
        let is_friend = self
            .store
            .are_friends(account.id, friend_id)
            .unwrap_or_else(|e| {
                warn!("Friend check failed for account {}: {}", account.id, e);
                false
            });
        self.conn.write(&ServerReply::CheckFriendResponse(is_friend));
    }

    fn on_get_list_room(&self) {
        self.conn
            .write(&ServerReply::RoomList(self.registry.list_room_summaries()));
    }

    fn on_create_room(&self, password: String) {
        if self.conn.account().is_none() {
            return;
        }
        // A connection holds at most one room; opening another leaves the
        // current one first
        self.detach_from_room();
        let room = self.registry.create_room(self.conn.clone(), password);
        self.conn.set_room(room.clone());
        self.conn.write(&ServerReply::CreateRoomSuccess(room.id()));
        if let Some(summary) = room.summary() {
            self.registry
                .broadcast_except(self.conn.id(), &ServerReply::NewRoom(summary));
        }
    }

    fn on_join_room(&self, room_id: crate::RoomId, password: &str) {
        let Some(account) = self.conn.account() else {
            return;
        };
        self.detach_from_room();
        let Some(room) = self.registry.find_room(room_id) else {
            self.conn.write(&ServerReply::RoomNotFound);
            return;
        };
        if room.is_full() {
            self.conn.write(&ServerReply::RoomFully);
            return;
        }
        if !room.check_password(password) {
            self.conn.write(&ServerReply::RoomWrongPassword);
            return;
        }
        // The full check above raced another joiner
        if !room.add_occupant(self.conn.clone()) {
            self.conn.write(&ServerReply::RoomFully);
            return;
        }

        let host_account = room.host().and_then(|h| h.account());
        let (Some(host), Some(host_account)) = (room.host(), host_account) else {
            room.remove_occupant(self.conn.id());
            self.conn.write(&ServerReply::RoomNotFound);
            return;
        };

        self.conn.set_room(room.clone());
        self.conn.write(&ServerReply::GoToRoom {
            room_id: room.id(),
            competitor_addr: host.addr().ip(),
            is_host: false,
            competitor: host_account,
        });
        host.write(&ServerReply::GoToRoom {
            room_id: room.id(),
            competitor_addr: self.conn.addr().ip(),
            is_host: true,
            competitor: account,
        });
    }

    fn on_leave_room(&self) {
        self.detach_from_room();
    }

    /// Departure path shared by leave-room, create-room, and join-room: the
    /// room is destroyed and both occupants are detached, so a late score
    /// event from the stayer finds no room.
    fn detach_from_room(&self) {
        let Some(room) = self.conn.take_room() else {
            return;
        };
        if let Some(opponent) = room.opponent_of(self.conn.id()) {
            opponent.take_room();
            opponent.write(&ServerReply::CompetitorLeft);
        }
        room.remove_occupant(self.conn.id());
        self.registry.remove_room(room.id());
    }

    fn on_start_game(&self) {
        let Some(room) = self.conn.room() else {
            return;
        };
        if !room.is_full() {
            return;
        }
        room.arm_settlement();
        room.mark_playing(self.store.as_ref());
        room.broadcast(&ServerReply::StartGame);
    }

    fn on_user_move(&self, row: u32, col: u32) {
        let Some(room) = self.conn.room() else {
            return;
        };
        if let Some(opponent) = room.opponent_of(self.conn.id()) {
            opponent.write(&ServerReply::CompetitorMove { row, col });
        }
    }

    fn on_win(&self) {
        let Some(room) = self.conn.room() else {
            return;
        };
        if !room.record_game_completion(self.store.as_ref(), Some(self.conn.id())) {
            return;
        }
        if let Some(opponent) = room.opponent_of(self.conn.id()) {
            opponent.write(&ServerReply::YouLose);
        }
    }

    fn on_lose(&self) {
        let Some(room) = self.conn.room() else {
            return;
        };
        let Some(opponent) = room.opponent_of(self.conn.id()) else {
            return;
        };
        if room.record_game_completion(self.store.as_ref(), Some(opponent.id())) {
            opponent.write(&ServerReply::YouWin);
        }
    }

    fn on_draw_request(&self) {
        let Some(room) = self.conn.room() else {
            return;
        };
        if let Some(opponent) = room.opponent_of(self.conn.id()) {
            opponent.write(&ServerReply::DrawRequest);
        }
    }

    fn on_draw_accept(&self) {
        let Some(room) = self.conn.room() else {
            return;
        };
        if !room.record_game_completion(self.store.as_ref(), None) {
            return;
        }
        if let Some(opponent) = room.opponent_of(self.conn.id()) {
            opponent.write(&ServerReply::DrawAccept);
        }
    }

    fn on_send_message(&self, text: String) {
        let Some(room) = self.conn.room() else {
            return;
        };
        if let Some(opponent) = room.opponent_of(self.conn.id()) {
            opponent.write(&ServerReply::ReceiveMessage(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tokio::sync::mpsc;

    struct TestClient {
        dispatcher: Dispatcher,
        rx: mpsc::UnboundedReceiver<String>,
    }

    impl TestClient {
        fn send(&self, line: &str) {
            self.dispatcher.dispatch(line);
        }

        fn recv(&mut self) -> String {
            self.rx.try_recv().expect("expected a queued reply")
        }

        fn assert_silent(&mut self) {
            assert!(self.rx.try_recv().is_err(), "expected no queued reply");
        }
    }

    struct Harness {
        registry: Arc<Registry>,
        store: Arc<MemoryStore>,
        next_id: u64,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                registry: Arc::new(Registry::new()),
                store: Arc::new(MemoryStore::new()),
                next_id: 0,
            }
        }

        fn client(&mut self) -> TestClient {
            let id = self.next_id;
            self.next_id += 1;
            let (tx, rx) = mpsc::unbounded_channel();
            let conn = Arc::new(ClientConnection::new(
                id,
                format!("127.0.0.{}:4000", id + 1).parse().unwrap(),
                tx,
            ));
            self.registry.register(conn.clone());
            let dispatcher = Dispatcher::new(
                conn,
                self.registry.clone(),
                self.store.clone() as Arc<dyn AccountStore>,
            );
            TestClient { dispatcher, rx }
        }

        fn logged_in(&mut self, username: &str) -> TestClient {
            let mut client = self.client();
            client.send(&format!("register,{},pw,{},avatar1", username, username));
            let reply = client.recv();
            assert!(reply.starts_with("login-success,"), "got {:?}", reply);
            client
        }
    }

    #[test]
    fn test_verify_unknown_user() {
        let mut h = Harness::new();
        let mut a = h.client();
        a.send("client-verify,ghost,pw");
        assert_eq!(a.recv(), "wrong-user,ghost,pw");
    }

    #[test]
    fn test_verify_success_broadcasts_presence() {
        let mut h = Harness::new();
        h.store.create("alice", "pw", "Alice", "avatar1").unwrap();
        let mut a = h.client();
        let mut b = h.client();

        a.send("client-verify,alice,pw");
        let reply = a.recv();
        assert!(reply.starts_with("login-success,"), "got {:?}", reply);
        assert_eq!(b.recv(), "chat-server,Alice is online");
        // The logging-in connection never sees its own presence line
        a.assert_silent();
    }

    #[test]
    fn test_verify_duplicate_login_rejected() {
        let mut h = Harness::new();
        let mut a = h.logged_in("alice");
        let mut b = h.client();
        drop(a.rx.try_recv());

        b.send("client-verify,alice,pw");
        assert_eq!(b.recv(), "dupplicate-login,alice,pw");
        a.assert_silent();
    }

    #[test]
    fn test_verify_banned_outranks_duplicate() {
        let mut h = Harness::new();
        let account = h.store.create("eve", "pw", "Eve", "a").unwrap().unwrap();
        h.store.ban(account.id);
        h.store.set_online(account.id).unwrap();
        let mut a = h.client();

        a.send("client-verify,eve,pw");
        assert_eq!(a.recv(), "banned-user,eve,pw");
    }

    #[test]
    fn test_register_duplicate_username() {
        let mut h = Harness::new();
        let _a = h.logged_in("alice");
        let mut b = h.client();
        b.send("register,alice,other,Other,avatar2");
        assert_eq!(b.recv(), "duplicate-username,");
    }

    #[test]
    fn test_offline_broadcasts_and_clears_account() {
        let mut h = Harness::new();
        let mut a = h.logged_in("alice");
        let mut b = h.logged_in("bob");
        drop(a.rx.try_recv());

        a.send("offline");
        assert_eq!(b.recv(), "chat-server,alice is offline");
        assert!(!h.store.get("alice").unwrap().online);
        // A second offline is a no-op
        a.send("offline");
        b.assert_silent();
    }

    #[test]
    fn test_room_commands_require_login() {
        let mut h = Harness::new();
        let mut a = h.client();
        a.send("create-room,");
        a.assert_silent();
        a.send("join-room,100");
        a.assert_silent();
        a.send("view-friend-list");
        a.assert_silent();
    }

    #[test]
    fn test_create_room_announces_to_others() {
        let mut h = Harness::new();
        let mut a = h.logged_in("alice");
        let mut b = h.logged_in("bob");
        drop(a.rx.try_recv());

        a.send("create-room,");
        assert_eq!(a.recv(), "create-room-success,100");
        assert_eq!(b.recv(), "new-room,100,1,alice,0");
    }

    #[test]
    fn test_join_room_delivers_go_to_room_both_ways() {
        let mut h = Harness::new();
        let mut a = h.logged_in("alice");
        let mut b = h.logged_in("bob");
        drop(a.rx.try_recv());
        a.send("create-room,secret");
        drop(a.rx.try_recv());
        drop(b.rx.try_recv());

        b.send("join-room,100,secret");
        let to_joiner = b.recv();
        let to_host = a.recv();
        // Joiner sees the host's address and account with the host flag off
        assert!(to_joiner.starts_with("go-to-room,100,127.0.0.1,0,"), "got {:?}", to_joiner);
        assert!(to_joiner.contains(",alice,"), "got {:?}", to_joiner);
        // Host sees the joiner with the host flag on
        assert!(to_host.starts_with("go-to-room,100,127.0.0.2,1,"), "got {:?}", to_host);
        assert!(to_host.contains(",bob,"), "got {:?}", to_host);
    }

    #[test]
    fn test_join_room_rejections() {
        let mut h = Harness::new();
        let mut a = h.logged_in("alice");
        let mut b = h.logged_in("bob");
        let mut c = h.logged_in("carol");
        a.send("create-room,secret");
        while a.rx.try_recv().is_ok() {}
        while b.rx.try_recv().is_ok() {}
        while c.rx.try_recv().is_ok() {}

        b.send("join-room,999");
        assert_eq!(b.rx.try_recv().unwrap(), "room-not-found,");

        b.send("join-room,100,wrong");
        assert_eq!(b.rx.try_recv().unwrap(), "room-wrong-password,");

        b.send("join-room,100,secret");
        assert!(b.rx.try_recv().unwrap().starts_with("go-to-room,"));

        c.send("join-room,100,secret");
        assert_eq!(c.rx.try_recv().unwrap(), "room-fully,");
    }

    #[test]
    fn test_room_list_snapshot() {
        let mut h = Harness::new();
        let mut a = h.logged_in("alice");
        a.send("create-room,pw");
        drop(a.rx.try_recv());

        a.send("get-list-room");
        assert_eq!(a.recv(), "room-list,100,1,alice,1");
    }

    fn paired_room(h: &mut Harness) -> (TestClient, TestClient) {
        let mut a = h.logged_in("alice");
        let mut b = h.logged_in("bob");
        a.send("create-room,");
        b.send("join-room,100");
        while a.rx.try_recv().is_ok() {}
        while b.rx.try_recv().is_ok() {}
        (a, b)
    }

    #[test]
    fn test_start_game_needs_full_room() {
        let mut h = Harness::new();
        let mut a = h.logged_in("alice");
        a.send("create-room,");
        drop(a.rx.try_recv());

        a.send("start-game");
        a.assert_silent();
    }

    #[test]
    fn test_start_game_marks_playing_and_broadcasts() {
        let mut h = Harness::new();
        let (mut a, mut b) = paired_room(&mut h);

        a.send("start-game");
        assert_eq!(a.recv(), "start-game,");
        assert_eq!(b.recv(), "start-game,");
        assert!(h.store.get("alice").unwrap().playing);
        assert!(h.store.get("bob").unwrap().playing);
    }

    #[test]
    fn test_user_move_relays_to_opponent_only() {
        let mut h = Harness::new();
        let (mut a, mut b) = paired_room(&mut h);
        let mut c = h.logged_in("carol");
        drop(a.rx.try_recv());
        drop(b.rx.try_recv());

        a.send("start-game");
        drop(a.rx.try_recv());
        drop(b.rx.try_recv());
        a.send("user-move,3,7");
        assert_eq!(b.recv(), "competitor-move,3,7");
        a.assert_silent();
        c.assert_silent();
    }

    #[test]
    fn test_win_settles_once_and_notifies_loser() {
        let mut h = Harness::new();
        let (mut a, mut b) = paired_room(&mut h);
        a.send("start-game");
        drop(a.rx.try_recv());
        drop(b.rx.try_recv());

        a.send("win");
        assert_eq!(b.recv(), "you-lose,");
        // The loser's own concession arrives late and is dropped whole
        b.send("lose");
        a.assert_silent();

        let alice = h.store.get("alice").unwrap().account;
        let bob = h.store.get("bob").unwrap().account;
        assert_eq!((alice.games, alice.wins), (1, 1));
        assert_eq!((bob.games, bob.wins), (1, 0));
        assert!(!h.store.get("alice").unwrap().playing);
    }

    #[test]
    fn test_lose_credits_opponent() {
        let mut h = Harness::new();
        let (mut a, mut b) = paired_room(&mut h);
        a.send("start-game");
        drop(a.rx.try_recv());
        drop(b.rx.try_recv());

        b.send("lose");
        assert_eq!(a.recv(), "you-win,");
        let alice = h.store.get("alice").unwrap().account;
        assert_eq!((alice.games, alice.wins), (1, 1));
    }

    #[test]
    fn test_rematch_settles_again() {
        let mut h = Harness::new();
        let (mut a, mut b) = paired_room(&mut h);
        a.send("start-game");
        a.send("win");
        while a.rx.try_recv().is_ok() {}
        while b.rx.try_recv().is_ok() {}

        a.send("start-game");
        drop(a.rx.try_recv());
        drop(b.rx.try_recv());
        b.send("win");
        assert_eq!(a.recv(), "you-lose,");

        let alice = h.store.get("alice").unwrap().account;
        let bob = h.store.get("bob").unwrap().account;
        assert_eq!((alice.games, alice.wins), (2, 1));
        assert_eq!((bob.games, bob.wins), (2, 1));
    }

    #[test]
    fn test_draw_flow() {
        let mut h = Harness::new();
        let (mut a, mut b) = paired_room(&mut h);
        a.send("start-game");
        drop(a.rx.try_recv());
        drop(b.rx.try_recv());

        a.send("draw-request");
        assert_eq!(b.recv(), "draw-request,");
        b.send("draw-accept");
        assert_eq!(a.recv(), "draw-accept,");

        let alice = h.store.get("alice").unwrap().account;
        let bob = h.store.get("bob").unwrap().account;
        assert_eq!((alice.games, alice.draws), (1, 1));
        assert_eq!((bob.games, bob.draws), (1, 1));
        assert_eq!(alice.wins, 0);
    }

    #[test]
    fn test_leave_room_notifies_and_unlists() {
        let mut h = Harness::new();
        let (mut a, mut b) = paired_room(&mut h);

        b.send("leave-room");
        assert_eq!(a.recv(), "competitor-left,");
        a.send("get-list-room");
        assert_eq!(a.recv(), "room-list");
        // Leaving again is a no-op
        b.send("leave-room");
        a.assert_silent();
    }

    #[test]
    fn test_win_after_opponent_left_is_ignored() {
        let mut h = Harness::new();
        let (mut a, mut b) = paired_room(&mut h);
        a.send("start-game");
        drop(a.rx.try_recv());
        drop(b.rx.try_recv());

        b.send("leave-room");
        assert_eq!(a.recv(), "competitor-left,");

        // The stayer is detached too: a late score claim settles nothing
        a.send("win");
        a.assert_silent();
        let alice = h.store.get("alice").unwrap().account;
        let bob = h.store.get("bob").unwrap().account;
        assert_eq!((alice.games, alice.wins), (0, 0));
        assert_eq!((bob.games, bob.wins), (0, 0));
    }

    #[test]
    fn test_create_room_twice_replaces_first() {
        let mut h = Harness::new();
        let mut a = h.logged_in("alice");
        a.send("create-room,");
        assert_eq!(a.recv(), "create-room-success,100");
        a.send("create-room,");
        assert_eq!(a.recv(), "create-room-success,101");

        // Only the latest room is discoverable
        a.send("get-list-room");
        assert_eq!(a.recv(), "room-list,101,1,alice,0");

        // The first room is gone for joiners too
        let mut b = h.logged_in("bob");
        b.send("join-room,100");
        assert_eq!(b.recv(), "room-not-found,");

        while a.rx.try_recv().is_ok() {}
        a.send("leave-room");
        a.send("get-list-room");
        assert_eq!(a.recv(), "room-list");
    }

    #[test]
    fn test_join_room_detaches_previous_room() {
        let mut h = Harness::new();
        let mut a = h.logged_in("alice");
        let mut b = h.logged_in("bob");
        a.send("create-room,");
        b.send("create-room,");
        while a.rx.try_recv().is_ok() {}
        while b.rx.try_recv().is_ok() {}

        // Joining bob's room abandons alice's own
        a.send("join-room,101");
        assert!(a.recv().starts_with("go-to-room,101,"));
        assert!(b.recv().starts_with("go-to-room,101,"));

        a.send("get-list-room");
        assert_eq!(a.recv(), "room-list,101,2,bob,0");
    }

    #[test]
    fn test_send_message_preserves_commas() {
        let mut h = Harness::new();
        let (a, mut b) = paired_room(&mut h);

        a.send("send-message,gg, well played");
        assert_eq!(b.recv(), "receive-message,gg, well played");
    }

    #[test]
    fn test_friend_queries() {
        let mut h = Harness::new();
        let mut a = h.logged_in("alice");
        let mut b = h.logged_in("bob");
        drop(a.rx.try_recv());
        let alice_id = h.store.get("alice").unwrap().account.id;
        let bob_id = h.store.get("bob").unwrap().account.id;
        h.store.add_friend(alice_id, bob_id);

        a.send(&format!("check-friend,{}", bob_id));
        assert_eq!(a.recv(), "check-friend-response,1");
        a.send("check-friend,99");
        assert_eq!(a.recv(), "check-friend-response,0");

        a.send("view-friend-list");
        assert_eq!(a.recv(), format!("friend-list,{},bob,1,0", bob_id));

        b.send("view-friend-list");
        assert_eq!(b.recv(), format!("friend-list,{},alice,1,0", alice_id));
    }

    #[test]
    fn test_rank_charts_ordering() {
        let mut h = Harness::new();
        let mut a = h.logged_in("alice");
        let bob = h.store.create("bob", "pw", "bob", "a").unwrap().unwrap();
        h.store.add_game(bob.id).unwrap();
        h.store.add_win(bob.id).unwrap();

        a.send("get-rank-charts");
        let reply = a.recv();
        assert!(reply.starts_with("return-get-rank-charts,"), "got {:?}", reply);
        // Bob has the only win and leads the chart
        let fields: Vec<&str> = reply.split(',').collect();
        assert_eq!(fields[2], "bob");
        assert_eq!(fields[11], "alice");
    }

    #[test]
    fn test_unknown_command_ignored() {
        let mut h = Harness::new();
        let mut a = h.client();
        a.send("frobnicate,1,2");
        a.assert_silent();
        a.send("");
        a.assert_silent();
    }
}
