//! Error handling for the game server

use std::fmt;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, CaroError>;

/// Game server error types
#[derive(Debug, Clone)]
pub enum CaroError {
    /// Network-related errors
    Network(String),
    /// Protocol errors (malformed or oversized lines)
    Protocol(String),
    /// Connection errors
    Connection(String),
    /// Account store errors
    Store(String),
    /// Timeout error
    Timeout(String),
    /// Server internal error
    Internal(String),
}

impl CaroError {
    /// Get error code for this error type
    pub fn code(&self) -> u32 {
        match self {
            CaroError::Network(_) => 1000,
            CaroError::Protocol(_) => 1001,
            CaroError::Connection(_) => 1002,
            CaroError::Store(_) => 1003,
            CaroError::Timeout(_) => 1004,
            CaroError::Internal(_) => 1005,
        }
    }

    /// Get human-readable error message
    pub fn message(&self) -> &str {
        match self {
            CaroError::Network(msg) => msg,
            CaroError::Protocol(msg) => msg,
            CaroError::Connection(msg) => msg,
            CaroError::Store(msg) => msg,
            CaroError::Timeout(msg) => msg,
            CaroError::Internal(msg) => msg,
        }
    }

    /// Create a network error
    pub fn network<T: Into<String>>(msg: T) -> Self {
        CaroError::Network(msg.into())
    }

    /// Create a protocol error
    pub fn protocol<T: Into<String>>(msg: T) -> Self {
        CaroError::Protocol(msg.into())
    }

    /// Create a connection error
    pub fn connection<T: Into<String>>(msg: T) -> Self {
        CaroError::Connection(msg.into())
    }

    /// Create an account store error
    pub fn store<T: Into<String>>(msg: T) -> Self {
        CaroError::Store(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        CaroError::Timeout(msg.into())
    }

    /// Create an internal error
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        CaroError::Internal(msg.into())
    }
}

impl fmt::Display for CaroError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaroError::Network(msg) => write!(f, "Network error: {}", msg),
            CaroError::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            CaroError::Connection(msg) => write!(f, "Connection error: {}", msg),
            CaroError::Store(msg) => write!(f, "Account store error: {}", msg),
            CaroError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            CaroError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CaroError {}

impl From<std::io::Error> for CaroError {
    fn from(err: std::io::Error) -> Self {
        CaroError::Network(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for CaroError {
    fn from(err: serde_json::Error) -> Self {
        CaroError::Store(format!("JSON error: {}", err))
    }
}
