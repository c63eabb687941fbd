//! Line-protocol client
//!
//! Thin client used by the bundled demo and the end-to-end tests. A
//! background task reads the socket and decodes lines into a channel;
//! callers either drain that channel with [`GameClient::recv`] or skip
//! ahead to a specific reply with [`GameClient::wait_for`].

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{CaroError, Result};
use crate::protocol::{frame_line, ClientCommand, LineCodec};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct GameClientConfig {
    pub server_addr: String,
    pub connect_timeout_secs: u64,
}

impl Default for GameClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:7777".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

pub struct GameClient {
    write_half: tokio::net::tcp::OwnedWriteHalf,
    lines: mpsc::UnboundedReceiver<String>,
}

impl GameClient {
    pub async fn connect(config: GameClientConfig) -> Result<Self> {
        let connect = TcpStream::connect(&config.server_addr);
        let stream = tokio::time::timeout(
            Duration::from_secs(config.connect_timeout_secs),
            connect,
        )
        .await
        .map_err(|_| CaroError::timeout(format!("connecting to {}", config.server_addr)))??;

        let (read_half, write_half) = stream.into_split();
        let (line_tx, line_rx) = mpsc::unbounded_channel();
        tokio::spawn(read_loop(read_half, line_tx));

        Ok(Self {
            write_half,
            lines: line_rx,
        })
    }

    pub async fn send(&mut self, command: &ClientCommand) -> Result<()> {
        self.send_raw(&command.encode()).await
    }

    pub async fn send_raw(&mut self, line: &str) -> Result<()> {
        self.write_half.write_all(&frame_line(line)).await?;
        Ok(())
    }

    /// Next line from the server, or `None` once the connection closes.
    pub async fn recv(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    /// Skip ahead to the next line carrying the given command, discarding
    /// everything before it (presence and room broadcasts, typically).
    pub async fn wait_for(&mut self, command: &str) -> Result<String> {
        loop {
            let line = tokio::time::timeout(WAIT_TIMEOUT, self.lines.recv())
                .await
                .map_err(|_| CaroError::timeout(format!("waiting for {:?}", command)))?
                .ok_or_else(|| CaroError::connection("server closed the connection"))?;
            if line == command || line.starts_with(&format!("{},", command)) {
                return Ok(line);
            }
            debug!("Skipping {:?} while waiting for {:?}", line, command);
        }
    }
}

async fn read_loop(
    mut read_half: tokio::net::tcp::OwnedReadHalf,
    line_tx: mpsc::UnboundedSender<String>,
) {
    let mut codec = LineCodec::new();
    let mut buf = [0u8; 4096];
    loop {
        match read_half.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => {
                codec.feed(&buf[..n]);
                loop {
                    match codec.decode_next() {
                        Ok(Some(line)) => {
                            if line_tx.send(line).is_err() {
                                return;
                            }
                        }
                        Ok(None) => break,
                        Err(e) => {
                            debug!("Dropping connection on protocol error: {}", e);
                            return;
                        }
                    }
                }
            }
        }
    }
}
