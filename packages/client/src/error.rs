//! Error types for the chat client.

use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the server failed
    #[error("connection error: {0}")]
    Connection(#[from] LinesCodecError),

    #[error("gave up after {attempts} connection attempt(s)")]
    ReconnectExhausted { attempts: u32 },
}
