//! Typed command set for the text protocol
//!
//! Every message is one line: comma-separated fields, the first being the
//! command name. [`ClientCommand`] covers client-to-server traffic and
//! [`ServerReply`] the server-to-client side. Replies that carry no arguments
//! keep a trailing comma so every encoded reply has at least two fields,
//! which existing clients rely on when splitting.

use crate::{Account, AccountId, ConnectionId, RoomId};
use std::net::IpAddr;

/// One entry of a `room-list` or `new-room` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub id: RoomId,
    pub occupants: u8,
    pub host_nickname: String,
    pub has_password: bool,
}

impl RoomSummary {
    fn encode_fields(&self) -> String {
        format!(
            "{},{},{},{}",
            self.id,
            self.occupants,
            self.host_nickname,
            if self.has_password { 1 } else { 0 }
        )
    }
}

/// One entry of a `friend-list` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendEntry {
    pub id: AccountId,
    pub nickname: String,
    pub online: bool,
    pub playing: bool,
}

impl FriendEntry {
    fn encode_fields(&self) -> String {
        format!(
            "{},{},{},{}",
            self.id,
            self.nickname,
            if self.online { 1 } else { 0 },
            if self.playing { 1 } else { 0 }
        )
    }
}

/// Client-to-server commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Login with credentials
    Verify { username: String, password: String },
    /// Create an account and log in immediately
    Register {
        username: String,
        password: String,
        nickname: String,
        avatar: String,
    },
    /// Explicit logout
    Offline,
    /// Request the friend list
    ViewFriendList,
    /// Request the rank charts
    GetRankCharts,
    /// Ask whether an account is a friend
    CheckFriend { friend_id: AccountId },
    /// Request the discoverable room list
    GetListRoom,
    /// Create a room, optionally password-gated (empty = open)
    CreateRoom { password: String },
    /// Join an existing room
    JoinRoom { room_id: RoomId, password: String },
    /// Leave the current room
    LeaveRoom,
    /// Start a game in a full room
    StartGame,
    /// Place a stone
    UserMove { row: u32, col: u32 },
    /// Sender claims victory
    Win,
    /// Sender concedes (e.g. on turn timeout)
    Lose,
    /// Propose a draw to the opponent
    DrawRequest,
    /// Accept the opponent's draw proposal
    DrawAccept,
    /// In-room chat; the text may contain commas
    SendMessage { text: String },
}

impl ClientCommand {
    /// Parse one line into a command.
    ///
    /// Unknown commands and malformed arguments yield `None`; the caller
    /// ignores them (protocol errors get no reply).
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split(',');
        let command = parts.next()?;
        let args: Vec<&str> = parts.collect();
        let arg = |i: usize| args.get(i).copied().unwrap_or("");

        match command {
            "client-verify" => Some(Self::Verify {
                username: arg(0).to_string(),
                password: arg(1).to_string(),
            }),
            "register" => Some(Self::Register {
                username: arg(0).to_string(),
                password: arg(1).to_string(),
                nickname: arg(2).to_string(),
                avatar: if arg(3).is_empty() {
                    "avatar1".to_string()
                } else {
                    arg(3).to_string()
                },
            }),
            "offline" => Some(Self::Offline),
            "view-friend-list" => Some(Self::ViewFriendList),
            "get-rank-charts" => Some(Self::GetRankCharts),
            "check-friend" => Some(Self::CheckFriend {
                friend_id: arg(0).parse().ok()?,
            }),
            "get-list-room" => Some(Self::GetListRoom),
            "create-room" => Some(Self::CreateRoom {
                password: arg(0).to_string(),
            }),
            "join-room" => Some(Self::JoinRoom {
                room_id: arg(0).parse().ok()?,
                password: arg(1).to_string(),
            }),
            "leave-room" => Some(Self::LeaveRoom),
            "start-game" => Some(Self::StartGame),
            "user-move" => Some(Self::UserMove {
                row: arg(0).parse().ok()?,
                col: arg(1).parse().ok()?,
            }),
            "win" => Some(Self::Win),
            "lose" => Some(Self::Lose),
            "draw-request" => Some(Self::DrawRequest),
            "draw-accept" => Some(Self::DrawAccept),
            // The free-text remainder is one field, commas included
            "send-message" => Some(Self::SendMessage {
                text: line.split_once(',').map(|(_, rest)| rest)?.to_string(),
            }),
            _ => None,
        }
    }

    /// Encode to the canonical wire line (no delimiter).
    pub fn encode(&self) -> String {
        match self {
            Self::Verify { username, password } => {
                format!("client-verify,{},{}", username, password)
            }
            Self::Register {
                username,
                password,
                nickname,
                avatar,
            } => format!("register,{},{},{},{}", username, password, nickname, avatar),
            Self::Offline => "offline".to_string(),
            Self::ViewFriendList => "view-friend-list".to_string(),
            Self::GetRankCharts => "get-rank-charts".to_string(),
            Self::CheckFriend { friend_id } => format!("check-friend,{}", friend_id),
            Self::GetListRoom => "get-list-room".to_string(),
            Self::CreateRoom { password } => format!("create-room,{}", password),
            Self::JoinRoom { room_id, password } => {
                format!("join-room,{},{}", room_id, password)
            }
            Self::LeaveRoom => "leave-room".to_string(),
            Self::StartGame => "start-game".to_string(),
            Self::UserMove { row, col } => format!("user-move,{},{}", row, col),
            Self::Win => "win".to_string(),
            Self::Lose => "lose".to_string(),
            Self::DrawRequest => "draw-request".to_string(),
            Self::DrawAccept => "draw-accept".to_string(),
            Self::SendMessage { text } => format!("send-message,{}", text),
        }
    }
}

/// Server-to-client replies and relayed events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerReply {
    /// First message on every connection
    ServerSendId(ConnectionId),
    /// Successful login, carrying the nine-field account
    LoginSuccess(Account),
    /// Unknown credentials, echoed back
    WrongUser { username: String, password: String },
    /// Account already online elsewhere
    DuplicateLogin { username: String, password: String },
    /// Account is banned
    BannedUser { username: String, password: String },
    /// Registration rejected: username taken
    DuplicateUsername,
    /// Presence notification broadcast to everyone else
    ChatServer(String),
    /// Snapshot of discoverable rooms
    RoomList(Vec<RoomSummary>),
    /// A new room appeared
    NewRoom(RoomSummary),
    /// Room created for the requester
    CreateRoomSuccess(RoomId),
    /// Both occupants enter the match screen
    GoToRoom {
        room_id: RoomId,
        competitor_addr: IpAddr,
        is_host: bool,
        competitor: Account,
    },
    RoomFully,
    RoomNotFound,
    RoomWrongPassword,
    FriendList(Vec<FriendEntry>),
    RankCharts(Vec<Account>),
    CheckFriendResponse(bool),
    StartGame,
    CompetitorMove { row: u32, col: u32 },
    YouWin,
    YouLose,
    DrawRequest,
    DrawAccept,
    CompetitorLeft,
    ReceiveMessage(String),
}

impl ServerReply {
    /// Encode to the wire line (no delimiter).
    pub fn encode(&self) -> String {
        match self {
            Self::ServerSendId(id) => format!("server-send-id,{}", id),
            Self::LoginSuccess(account) => format!("login-success,{}", account.to_wire()),
            Self::WrongUser { username, password } => {
                format!("wrong-user,{},{}", username, password)
            }
            // Command name kept as the deployed clients expect it
            Self::DuplicateLogin { username, password } => {
                format!("dupplicate-login,{},{}", username, password)
            }
            Self::BannedUser { username, password } => {
                format!("banned-user,{},{}", username, password)
            }
            Self::DuplicateUsername => "duplicate-username,".to_string(),
            Self::ChatServer(text) => format!("chat-server,{}", text),
            Self::RoomList(rooms) => {
                let mut line = String::from("room-list");
                for room in rooms {
                    line.push(',');
                    line.push_str(&room.encode_fields());
                }
                line
            }
            Self::NewRoom(room) => format!("new-room,{}", room.encode_fields()),
            Self::CreateRoomSuccess(id) => format!("create-room-success,{}", id),
            Self::GoToRoom {
                room_id,
                competitor_addr,
                is_host,
                competitor,
            } => format!(
                "go-to-room,{},{},{},{}",
                room_id,
                competitor_addr,
                if *is_host { 1 } else { 0 },
                competitor.to_wire()
            ),
            Self::RoomFully => "room-fully,".to_string(),
            Self::RoomNotFound => "room-not-found,".to_string(),
            Self::RoomWrongPassword => "room-wrong-password,".to_string(),
            Self::FriendList(friends) => {
                let mut line = String::from("friend-list");
                for friend in friends {
                    line.push(',');
                    line.push_str(&friend.encode_fields());
                }
                line
            }
            Self::RankCharts(accounts) => {
                let mut line = String::from("return-get-rank-charts");
                for account in accounts {
                    line.push(',');
                    line.push_str(&account.to_wire());
                }
                line
            }
            Self::CheckFriendResponse(is_friend) => {
                format!("check-friend-response,{}", if *is_friend { 1 } else { 0 })
            }
            Self::StartGame => "start-game,".to_string(),
            Self::CompetitorMove { row, col } => format!("competitor-move,{},{}", row, col),
            Self::YouWin => "you-win,".to_string(),
            Self::YouLose => "you-lose,".to_string(),
            Self::DrawRequest => "draw-request,".to_string(),
            Self::DrawAccept => "draw-accept,".to_string(),
            Self::CompetitorLeft => "competitor-left,".to_string(),
            Self::ReceiveMessage(text) => format!("receive-message,{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: u64, nickname: &str, wins: u32) -> Account {
        Account {
            id,
            username: format!("user{}", id),
            password: "pw".to_string(),
            nickname: nickname.to_string(),
            avatar: "avatar1".to_string(),
            games: wins + 1,
            wins,
            draws: 0,
            rank: 1,
        }
    }

    #[test]
    fn test_parse_verify() {
        assert_eq!(
            ClientCommand::parse("client-verify,alice,secret"),
            Some(ClientCommand::Verify {
                username: "alice".to_string(),
                password: "secret".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_register_defaults_avatar() {
        assert_eq!(
            ClientCommand::parse("register,bob,pw,Bobby"),
            Some(ClientCommand::Register {
                username: "bob".to_string(),
                password: "pw".to_string(),
                nickname: "Bobby".to_string(),
                avatar: "avatar1".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_join_room() {
        assert_eq!(
            ClientCommand::parse("join-room,101,abc"),
            Some(ClientCommand::JoinRoom {
                room_id: 101,
                password: "abc".to_string(),
            })
        );
        // Empty password allowed
        assert_eq!(
            ClientCommand::parse("join-room,101"),
            Some(ClientCommand::JoinRoom {
                room_id: 101,
                password: String::new(),
            })
        );
        // Non-numeric room id is a protocol error
        assert_eq!(ClientCommand::parse("join-room,abc,pw"), None);
    }

    #[test]
    fn test_parse_user_move() {
        assert_eq!(
            ClientCommand::parse("user-move,3,7"),
            Some(ClientCommand::UserMove { row: 3, col: 7 })
        );
        assert_eq!(ClientCommand::parse("user-move,3"), None);
    }

    #[test]
    fn test_parse_send_message_preserves_commas() {
        assert_eq!(
            ClientCommand::parse("send-message,hello, world, again"),
            Some(ClientCommand::SendMessage {
                text: "hello, world, again".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_no_arg_commands_tolerate_trailing_comma() {
        assert_eq!(ClientCommand::parse("win"), Some(ClientCommand::Win));
        assert_eq!(ClientCommand::parse("win,"), Some(ClientCommand::Win));
        assert_eq!(ClientCommand::parse("offline"), Some(ClientCommand::Offline));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(ClientCommand::parse("frobnicate,1,2"), None);
        assert_eq!(ClientCommand::parse(""), None);
    }

    #[test]
    fn test_command_encode_parse_roundtrip() {
        let commands = [
            ClientCommand::Verify {
                username: "alice".to_string(),
                password: "secret".to_string(),
            },
            ClientCommand::CreateRoom {
                password: "abc".to_string(),
            },
            ClientCommand::JoinRoom {
                room_id: 105,
                password: String::new(),
            },
            ClientCommand::UserMove { row: 9, col: 4 },
            ClientCommand::DrawAccept,
        ];
        for command in commands {
            assert_eq!(ClientCommand::parse(&command.encode()), Some(command));
        }
    }

    #[test]
    fn test_encode_login_success() {
        let reply = ServerReply::LoginSuccess(account(7, "Alice", 8));
        assert_eq!(
            reply.encode(),
            "login-success,7,user7,pw,Alice,avatar1,9,8,0,1"
        );
    }

    #[test]
    fn test_encode_room_list_groups() {
        let reply = ServerReply::RoomList(vec![
            RoomSummary {
                id: 100,
                occupants: 1,
                host_nickname: "Alice".to_string(),
                has_password: true,
            },
            RoomSummary {
                id: 101,
                occupants: 2,
                host_nickname: "Bob".to_string(),
                has_password: false,
            },
        ]);
        assert_eq!(reply.encode(), "room-list,100,1,Alice,1,101,2,Bob,0");
    }

    #[test]
    fn test_encode_empty_room_list() {
        assert_eq!(ServerReply::RoomList(vec![]).encode(), "room-list");
    }

    #[test]
    fn test_encode_go_to_room() {
        let reply = ServerReply::GoToRoom {
            room_id: 100,
            competitor_addr: "127.0.0.1".parse().unwrap(),
            is_host: false,
            competitor: account(3, "Carol", 2),
        };
        assert_eq!(
            reply.encode(),
            "go-to-room,100,127.0.0.1,0,3,user3,pw,Carol,avatar1,3,2,0,1"
        );
    }

    #[test]
    fn test_encode_no_arg_replies_keep_trailing_comma() {
        assert_eq!(ServerReply::RoomFully.encode(), "room-fully,");
        assert_eq!(ServerReply::CompetitorLeft.encode(), "competitor-left,");
        assert_eq!(ServerReply::YouLose.encode(), "you-lose,");
    }

    #[test]
    fn test_encode_friend_list() {
        let reply = ServerReply::FriendList(vec![FriendEntry {
            id: 4,
            nickname: "Dave".to_string(),
            online: true,
            playing: false,
        }]);
        assert_eq!(reply.encode(), "friend-list,4,Dave,1,0");
    }

    #[test]
    fn test_encode_rank_charts() {
        let reply = ServerReply::RankCharts(vec![account(1, "Alice", 5), account(2, "Bob", 3)]);
        assert_eq!(
            reply.encode(),
            "return-get-rank-charts,1,user1,pw,Alice,avatar1,6,5,0,1,2,user2,pw,Bob,avatar1,4,3,0,1"
        );
    }
}
