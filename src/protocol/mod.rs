//! Protocol layer for the game server
//!
//! This module provides:
//! - Newline framing over raw stream reads
//! - Typed client command and server reply definitions
//! - Encoding to and parsing from the comma-separated wire form

pub mod line;
pub mod messages;

// Re-export commonly used types
pub use line::{frame_line, LineCodec, MAX_LINE_LENGTH};
pub use messages::{ClientCommand, FriendEntry, RoomSummary, ServerReply};
