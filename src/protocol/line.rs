//! Incremental newline framing for the text protocol
//!
//! Each message is UTF-8 text terminated by a single line feed. The codec
//! accumulates raw reads and hands out complete lines, keeping any trailing
//! partial line buffered for the next read.

use bytes::{Buf, BytesMut};

use crate::error::{CaroError, Result};

/// Default maximum length of a single line in bytes.
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

/// Streaming line decoder over a growable buffer.
#[derive(Debug)]
pub struct LineCodec {
    buffer: BytesMut,
    max_line_length: usize,
}

impl LineCodec {
    /// Create a new codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    /// Create a new codec with a specific line limit.
    pub fn with_max_length(max_line_length: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            max_line_length,
        }
    }

    /// Feed raw bytes into the codec.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to extract the next complete line.
    ///
    /// Returns `Ok(Some(line))` with the delimiter stripped, `Ok(None)` when
    /// more data is needed, and a protocol error when the buffered partial
    /// line exceeds the configured limit or is not valid UTF-8.
    pub fn decode_next(&mut self) -> Result<Option<String>> {
        match self.buffer.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                if pos > self.max_line_length {
                    return Err(CaroError::protocol(format!(
                        "line too long: {} bytes (max: {})",
                        pos, self.max_line_length
                    )));
                }
                let line = self.buffer.split_to(pos);
                self.buffer.advance(1); // delimiter
                let mut text = String::from_utf8(line.to_vec())
                    .map_err(|e| CaroError::protocol(format!("invalid UTF-8: {}", e)))?;
                if text.ends_with('\r') {
                    text.pop();
                }
                Ok(Some(text))
            }
            None => {
                if self.buffer.len() > self.max_line_length {
                    return Err(CaroError::protocol(format!(
                        "unterminated line exceeds {} bytes",
                        self.max_line_length
                    )));
                }
                Ok(None)
            }
        }
    }

    /// Get the number of buffered bytes not yet decoded.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame a message for transmission by appending the line delimiter.
pub fn frame_line(message: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 1);
    out.extend_from_slice(message.as_bytes());
    out.push(b'\n');
    out
}
