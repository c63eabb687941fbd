//! Basic Usage Example for the Caro Game Server
//!
//! Starts a server on an ephemeral port, registers two players, plays a
//! short match between them, and prints the resulting rank chart.
//!
//! Run with: cargo run --example basic_usage

use std::sync::Arc;

use caro::store::AccountStore;
use caro::{
    protocol::ClientCommand, GameClient, GameClientConfig, GameServer, MemoryStore, ServerConfig,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Caro Game Server - Basic Usage Example");
    info!("======================================");

    // Start an in-process server on an ephemeral port
    let store = Arc::new(MemoryStore::new());
    let config = ServerConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        ..ServerConfig::default()
    };
    let mut server = GameServer::new(config, store.clone() as Arc<dyn AccountStore>);
    let addr = server.bind().await?;
    tokio::spawn(server.run());
    info!("Server listening on {}", addr);

    // Two players register and log in
    let mut alice = connect_and_register(addr.to_string(), "alice", "Alice").await?;
    let mut bob = connect_and_register(addr.to_string(), "bob", "Bob").await?;

    // Alice opens a room; Bob discovers and joins it
    alice
        .send(&ClientCommand::CreateRoom {
            password: String::new(),
        })
        .await?;
    let created = alice.wait_for("create-room-success").await?;
    let room_id: u64 = created.split(',').nth(1).unwrap().parse()?;
    info!("Alice opened room {}", room_id);

    bob.send(&ClientCommand::GetListRoom).await?;
    info!("Room list: {}", bob.wait_for("room-list").await?);

    bob.send(&ClientCommand::JoinRoom {
        room_id,
        password: String::new(),
    })
    .await?;
    bob.wait_for("go-to-room").await?;
    alice.wait_for("go-to-room").await?;
    info!("Bob joined room {}", room_id);

    // Play a short game: the host starts, a few moves go back and forth,
    // then Alice claims the win
    alice.send(&ClientCommand::StartGame).await?;
    alice.wait_for("start-game").await?;
    bob.wait_for("start-game").await?;

    alice.send(&ClientCommand::UserMove { row: 7, col: 7 }).await?;
    info!("Bob sees: {}", bob.wait_for("competitor-move").await?);
    bob.send(&ClientCommand::UserMove { row: 8, col: 8 }).await?;
    info!("Alice sees: {}", alice.wait_for("competitor-move").await?);

    alice.send(&ClientCommand::Win).await?;
    info!("Bob sees: {}", bob.wait_for("you-lose").await?);

    // The rank chart now reflects the finished game
    alice.send(&ClientCommand::GetRankCharts).await?;
    info!("Rank chart: {}", alice.wait_for("return-get-rank-charts").await?);

    info!("Example completed!");
    Ok(())
}

async fn connect_and_register(
    server_addr: String,
    username: &str,
    nickname: &str,
) -> Result<GameClient, Box<dyn std::error::Error>> {
    let mut client = GameClient::connect(GameClientConfig {
        server_addr,
        ..GameClientConfig::default()
    })
    .await?;
    let greeting = client.wait_for("server-send-id").await?;
    info!("{} connected: {}", nickname, greeting);

    client
        .send(&ClientCommand::Register {
            username: username.to_string(),
            password: "pw".to_string(),
            nickname: nickname.to_string(),
            avatar: "avatar1".to_string(),
        })
        .await?;
    client.wait_for("login-success").await?;
    info!("{} logged in", nickname);
    Ok(client)
}
