//! Caro game server
//!
//! Coordinates two-player Caro matches: login and registration, room
//! discovery, move relay, and score keeping over a newline-delimited text
//! protocol.
//!
//! Usage:
//!   cargo run -- server                    # Run on the default port
//!   cargo run -- server --port 7777        # Run on a specific port

use std::env;
use std::sync::Arc;

use caro::store::AccountStore;
use caro::{GameServer, MemoryStore, ServerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    match args[1].as_str() {
        "server" => {
            run_server(&args).await?;
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
        }
    }

    Ok(())
}

fn print_usage() {
    println!("Caro - Two-Player Game Session Server");
    println!();
    println!("USAGE:");
    println!("    cargo run -- server [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    server              Start the game session server");
    println!("    help                Show this help message");
    println!();
    println!("OPTIONS:");
    println!("    --port <PORT>       Port to listen on (default: 7777)");
    println!("    --max-conn <NUM>    Maximum connections (default: 100)");
    println!("    --accounts <FILE>   JSON account snapshot to load and save");
    println!();
    println!("PROTOCOL:");
    println!("    Plain TCP, one message per line, comma-separated fields.");
    println!("    Clients log in, browse rooms, and play matches; the server");
    println!("    relays moves between the two occupants of each room and");
    println!("    records wins, draws, and games played.");
    println!();
    println!("EXAMPLES:");
    println!("    cargo run -- server");
    println!("    cargo run -- server --port 5000 --accounts accounts.json");
    println!("    RUST_LOG=debug cargo run -- server");
}

fn parse_port(args: &[String]) -> u16 {
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            if let Ok(port) = args[i + 1].parse() {
                return port;
            }
        }
    }
    7777 // default port
}

fn parse_max_connections(args: &[String]) -> usize {
    for i in 0..args.len() {
        if args[i] == "--max-conn" && i + 1 < args.len() {
            if let Ok(max) = args[i + 1].parse() {
                return max;
            }
        }
    }
    100 // default
}

fn parse_accounts_path(args: &[String]) -> Option<String> {
    for i in 0..args.len() {
        if args[i] == "--accounts" && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

async fn run_server(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let port = parse_port(args);
    let max_connections = parse_max_connections(args);
    let accounts_path = parse_accounts_path(args);

    let store = Arc::new(match &accounts_path {
        Some(path) if std::path::Path::new(path).exists() => MemoryStore::load(path)?,
        Some(path) => {
            info!("Account snapshot {} not found, starting empty", path);
            MemoryStore::new()
        }
        None => MemoryStore::new(),
    });

    let config = ServerConfig {
        bind_addr: format!("0.0.0.0:{}", port),
        max_connections,
        ..Default::default()
    };

    info!("Starting Caro game server");
    info!("Configuration:");
    info!("  - Bind address: {}", config.bind_addr);
    info!("  - Max connections: {}", config.max_connections);

    let mut server = GameServer::new(config, store.clone() as Arc<dyn AccountStore>);
    server.bind().await?;
    let registry = server.registry();

    let server_task = tokio::spawn(server.run());

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    registry.close_all();
    server_task.abort();

    if let Some(path) = accounts_path {
        if let Err(e) = store.save(&path) {
            error!("Failed to save account snapshot to {}: {}", path, e);
        } else {
            info!("Saved account snapshot to {}", path);
        }
    }

    Ok(())
}
