//! Server side: accept loop, connection state, rooms, and command dispatch

pub mod connection;
pub mod dispatcher;
pub mod game_server;
pub mod handler;
pub mod registry;
pub mod room;

pub use connection::ClientConnection;
pub use dispatcher::Dispatcher;
pub use game_server::GameServer;
pub use handler::ConnectionHandler;
pub use registry::Registry;
pub use room::Room;
